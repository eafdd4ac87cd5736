//! Axis-aligned bounding box over real-valued positions.

use glam::DVec2;

/// Axis-aligned bounding box with inclusive bounds.
///
/// A point is inside if `min.x <= x <= max.x` and `min.y <= y <= max.y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds {
    #[inline]
    pub const fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// Empty box with inverted bounds, for accumulation via [`Bounds::include`].
    #[inline]
    pub const fn empty() -> Self {
        Self {
            min: DVec2::splat(f64::INFINITY),
            max: DVec2::splat(f64::NEG_INFINITY),
        }
    }

    /// Bounds of `points`, or `None` if there are none.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a DVec2>) -> Option<Self> {
        let mut bounds = Self::empty();
        for p in points {
            bounds.include(*p);
        }
        (!bounds.is_empty()).then_some(bounds)
    }

    #[inline]
    pub fn include(&mut self, p: DVec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    #[inline]
    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Grow each side by `fraction` of the larger extent, at least `min_margin`.
    pub fn padded(&self, fraction: f64, min_margin: f64) -> Self {
        let margin = (self.size().max_element() * fraction).max(min_margin);
        Self {
            min: self.min - DVec2::splat(margin),
            max: self.max + DVec2::splat(margin),
        }
    }
}
