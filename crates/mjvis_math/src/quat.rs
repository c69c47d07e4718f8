//! Scalar-first quaternion as written in MJCF documents.
//!
//! MJCF stores rotations as `w x y z`, glam stores `x y z w`. Keeping the
//! document order in its own type means a component record never silently
//! swaps axes; conversion to [`Quat`] is always an explicit call.

use glam::Quat;
use serde::{Deserialize, Serialize};

/// A rotation in `(w, x, y, z)` order, component 0 being the real part.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WxyzQuat(pub [f32; 4]);

impl WxyzQuat {
    /// The identity rotation `(1, 0, 0, 0)`.
    pub const IDENTITY: Self = Self([1.0, 0.0, 0.0, 0.0]);

    pub fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self([w, x, y, z])
    }

    pub fn w(&self) -> f32 {
        self.0[0]
    }

    pub fn x(&self) -> f32 {
        self.0[1]
    }

    pub fn y(&self) -> f32 {
        self.0[2]
    }

    pub fn z(&self) -> f32 {
        self.0[3]
    }

    /// The four components in document order.
    pub fn to_array(self) -> [f32; 4] {
        self.0
    }

    /// Convert to a normalized glam quaternion.
    ///
    /// MJCF does not require unit quaternions; a zero quaternion maps to identity.
    pub fn to_quat(self) -> Quat {
        let q = Quat::from_xyzw(self.x(), self.y(), self.z(), self.w());
        if q.length_squared() <= f32::EPSILON {
            Quat::IDENTITY
        } else {
            q.normalize()
        }
    }

    pub fn from_quat(q: Quat) -> Self {
        Self([q.w, q.x, q.y, q.z])
    }
}

impl Default for WxyzQuat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f32; 4]> for WxyzQuat {
    fn from(value: [f32; 4]) -> Self {
        Self(value)
    }
}
