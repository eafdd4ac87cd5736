pub mod file_format;
pub mod float_ext;
pub mod log_setup;
pub mod test_utils;

pub use file_format::{SerdeFormat, SerdeFormatError, deserialize, serialize};
pub use float_ext::FloatExt;

pub const EPSILON: f64 = 1e-6;
