pub trait FloatExt: Copy {
    /// Equality within [`crate::EPSILON`].
    fn approximately_eq(self, other: Self) -> bool;

    /// Equality within a caller-supplied absolute tolerance.
    fn approximately_eq_within(self, other: Self, tolerance: Self) -> bool;
}

impl FloatExt for f32 {
    fn approximately_eq(self, other: Self) -> bool {
        self.approximately_eq_within(other, crate::EPSILON as f32)
    }

    fn approximately_eq_within(self, other: Self, tolerance: Self) -> bool {
        (self - other).abs() < tolerance
    }
}

impl FloatExt for f64 {
    fn approximately_eq(self, other: Self) -> bool {
        self.approximately_eq_within(other, crate::EPSILON)
    }

    fn approximately_eq_within(self, other: Self, tolerance: Self) -> bool {
        (self - other).abs() < tolerance
    }
}
