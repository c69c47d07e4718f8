// Whitespace-separated number lists, the encoding MJCF uses for every
// vector-valued attribute ("0 0 1", "1 0 0 0", ...).

use glam::{Vec3, Vec4};
use thiserror::Error;

use crate::WxyzQuat;

/// Errors from parsing a numeric attribute string.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VectorParseError {
    #[error("invalid number `{0}`")]
    InvalidNumber(String),

    #[error("expected {expected} values, got {found}")]
    TooFew { expected: usize, found: usize },
}

/// Parse every whitespace-separated number in `s`.
pub fn parse_floats(s: &str) -> Result<Vec<f32>, VectorParseError> {
    s.split_whitespace()
        .map(|p| {
            p.parse::<f32>()
                .map_err(|_| VectorParseError::InvalidNumber(p.to_string()))
        })
        .collect()
}

fn parse_at_least(s: &str, expected: usize) -> Result<Vec<f32>, VectorParseError> {
    let values = parse_floats(s)?;
    if values.len() < expected {
        return Err(VectorParseError::TooFew {
            expected,
            found: values.len(),
        });
    }
    Ok(values)
}

/// Parse the first three values of `s`.
pub fn parse_vec3(s: &str) -> Result<Vec3, VectorParseError> {
    let v = parse_at_least(s, 3)?;
    Ok(Vec3::new(v[0], v[1], v[2]))
}

/// Parse the first four values of `s`.
pub fn parse_vec4(s: &str) -> Result<Vec4, VectorParseError> {
    let v = parse_at_least(s, 4)?;
    Ok(Vec4::new(v[0], v[1], v[2], v[3]))
}

/// Parse a scalar-first quaternion, keeping the document's component order.
pub fn parse_wxyz(s: &str) -> Result<WxyzQuat, VectorParseError> {
    let v = parse_at_least(s, 4)?;
    Ok(WxyzQuat::new(v[0], v[1], v[2], v[3]))
}
