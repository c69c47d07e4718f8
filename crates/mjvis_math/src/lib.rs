// Re-export glam for convenience
pub use glam::*;

// mjvis math types
mod quat;
mod text;

pub use quat::WxyzQuat;
pub use text::{parse_floats, parse_vec3, parse_vec4, parse_wxyz, VectorParseError};
