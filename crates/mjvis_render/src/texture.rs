//! Diffuse textures referenced by MJCF `<texture file=...>` assets.
//!
//! Every image is decoded at most once per scene. A file that failed to
//! decode is remembered, so a texture shared by many geoms warns once
//! instead of hitting the disk for each of them.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mjvis_math::Vec4;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Texture {0} failed to load earlier")]
    PreviouslyFailed(PathBuf),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Decoded image in linear RGBA, first row at the top.
#[derive(Clone, Debug)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub texels: Vec<Vec4>,
    pub source: PathBuf,
}

impl Texture {
    pub fn new(width: u32, height: u32, texels: Vec<Vec4>, source: impl Into<PathBuf>) -> Self {
        Self {
            width,
            height,
            texels,
            source: source.into(),
        }
    }

    /// Convert 8-bit sRGB image data; alpha is kept linear.
    pub fn from_image(image: &image::DynamicImage, source: impl Into<PathBuf>) -> Self {
        let rgba = image.to_rgba8();
        let texels = rgba
            .pixels()
            .map(|px| {
                Vec4::new(
                    srgb_to_linear(px[0]),
                    srgb_to_linear(px[1]),
                    srgb_to_linear(px[2]),
                    f32::from(px[3]) / 255.0,
                )
            })
            .collect();

        Self::new(rgba.width(), rgba.height(), texels, source)
    }

    /// Texel at column `x`, row `y`; out of range reads as opaque black.
    pub fn texel(&self, x: u32, y: u32) -> Vec4 {
        if x >= self.width || y >= self.height {
            return Vec4::W;
        }
        self.texels
            .get((y as usize) * (self.width as usize) + x as usize)
            .copied()
            .unwrap_or(Vec4::W)
    }

    /// Nearest texel for a UV with `v = 0` at the bottom edge.
    ///
    /// Coordinates repeat outside `[0, 1)` like MJCF's `texrepeat`.
    pub fn sample(&self, u: f32, v: f32) -> Vec4 {
        if self.texels.is_empty() {
            return Vec4::W;
        }
        let column = (u.rem_euclid(1.0) * self.width as f32) as u32;
        let row = ((1.0 - v.rem_euclid(1.0)) * self.height as f32) as u32;
        self.texel(column.min(self.width - 1), row.min(self.height - 1))
    }

    pub fn memory_usage(&self) -> usize {
        self.texels.len() * std::mem::size_of::<Vec4>()
    }
}

/// Decoded textures shared between visual objects, keyed by file path.
#[derive(Debug, Default)]
pub struct TextureCache {
    loaded: HashMap<PathBuf, Arc<Texture>>,
    failed: HashSet<PathBuf>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `path` on first use and hand out the shared copy afterwards.
    pub fn fetch(&mut self, path: &Path) -> TextureResult<Arc<Texture>> {
        if let Some(texture) = self.loaded.get(path) {
            return Ok(Arc::clone(texture));
        }
        if self.failed.contains(path) {
            return Err(TextureError::PreviouslyFailed(path.to_path_buf()));
        }

        let image = match image::open(path) {
            Ok(image) => image,
            Err(source) => {
                self.failed.insert(path.to_path_buf());
                return Err(TextureError::Decode {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let texture = Arc::new(Texture::from_image(&image, path));
        log::debug!(
            "Decoded {} ({}x{})",
            path.display(),
            texture.width,
            texture.height
        );
        self.loaded.insert(path.to_path_buf(), Arc::clone(&texture));
        Ok(texture)
    }

    /// Number of decoded textures.
    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }

    /// Files that could not be decoded.
    pub fn failures(&self) -> impl Iterator<Item = &Path> {
        self.failed.iter().map(PathBuf::as_path)
    }

    pub fn memory_usage(&self) -> usize {
        self.loaded.values().map(|texture| texture.memory_usage()).sum()
    }
}

/// sRGB transfer function inverse for one 8-bit channel.
pub fn srgb_to_linear(channel: u8) -> f32 {
    let c = f32::from(channel) / 255.0;
    if c > 0.04045 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
    const GREEN: Vec4 = Vec4::new(0.0, 1.0, 0.0, 1.0);
    const BLUE: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);

    // top row red/green, bottom row blue/white
    fn quad() -> Texture {
        Texture::new(2, 2, vec![RED, GREEN, BLUE, Vec4::ONE], "quad")
    }

    #[test]
    fn test_sample_quadrants() {
        let tex = quad();
        assert_eq!(tex.sample(0.25, 0.75), RED);
        assert_eq!(tex.sample(0.75, 0.75), GREEN);
        assert_eq!(tex.sample(0.25, 0.25), BLUE);
        assert_eq!(tex.sample(0.75, 0.25), Vec4::ONE);
    }

    #[test]
    fn test_sample_repeats() {
        let tex = quad();
        assert_eq!(tex.sample(1.25, -0.25), RED);
        assert_eq!(tex.sample(-0.25, 2.25), BLUE);
    }

    #[test]
    fn test_texel_out_of_range() {
        assert_eq!(quad().texel(5, 0), Vec4::W);
    }

    #[test]
    fn test_from_image_converts_to_linear() {
        let image = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            1,
            1,
            image::Rgba([255, 128, 0, 51]),
        ));
        let tex = Texture::from_image(&image, "mem");
        let texel = tex.texel(0, 0);

        assert!((texel.x - 1.0).abs() < 1e-6);
        assert!((texel.y - srgb_to_linear(128)).abs() < 1e-6);
        assert_eq!(texel.z, 0.0);
        assert!((texel.w - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_failed_decode_is_remembered() {
        let mut cache = TextureCache::new();
        let path = Path::new("/definitely/not/here.png");

        assert!(matches!(cache.fetch(path), Err(TextureError::Decode { .. })));
        assert!(matches!(cache.fetch(path), Err(TextureError::PreviouslyFailed(_))));
        assert!(cache.is_empty());
        assert_eq!(cache.failures().count(), 1);
    }

    #[test]
    fn test_srgb_curve() {
        assert_eq!(srgb_to_linear(0), 0.0);
        assert!((srgb_to_linear(255) - 1.0).abs() < 1e-6);
        // mid grey is darker in linear space
        let mid = srgb_to_linear(128);
        assert!(mid > 0.2 && mid < 0.23);
    }
}
