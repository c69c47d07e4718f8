//! Surface materials for visual objects.

use std::path::PathBuf;
use std::sync::Arc;

use mjvis_math::{Vec3, Vec4};

use crate::texture::Texture;

/// Base colour of a geom that binds neither colour nor texture.
pub const DEFAULT_BASE_COLOR: Vec4 = Vec4::new(0.5, 0.5, 0.5, 1.0);

/// Appearance of one visual object.
///
/// The effective albedo is the diffuse texture (when loaded) tinted by
/// `base_color`.
#[derive(Clone, Debug)]
pub struct SurfaceMaterial {
    /// Name of the bound texture, empty for flat colours
    pub name: String,

    /// Linear RGBA
    pub base_color: Vec4,

    /// Decoded diffuse image
    pub diffuse_texture: Option<Arc<Texture>>,

    /// Image file the diffuse texture comes from, even if not loaded
    pub texture_path: Option<PathBuf>,
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self {
            name: String::new(),
            base_color: DEFAULT_BASE_COLOR,
            diffuse_texture: None,
            texture_path: None,
        }
    }
}

impl SurfaceMaterial {
    pub fn has_texture(&self) -> bool {
        self.diffuse_texture.is_some()
    }

    pub fn opacity(&self) -> f32 {
        self.base_color.w
    }

    /// Albedo at the given UV.
    pub fn albedo(&self, u: f32, v: f32) -> Vec3 {
        let tint = self.base_color.truncate();
        match &self.diffuse_texture {
            Some(texture) => texture.sample(u, v).truncate() * tint,
            None => tint,
        }
    }
}
