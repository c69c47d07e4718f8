//! The seam between the scene parser and a renderer.
//!
//! The parser never creates renderer objects itself. For every visual geom
//! it fills a [`VisualRequest`] and asks a [`VisualFactory`] for an object;
//! the returned handle is stored on the component and is otherwise opaque.

use std::path::Path;

use mjvis_math::{Vec3, Vec4, WxyzQuat};

use crate::assets::{MeshMetadata, MeshTable, TextureEntry};
use crate::mjcf::GeomType;

/// A texture resolved through a geom's material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureBinding<'a> {
    pub name: &'a str,
    pub entry: &'a TextureEntry,
}

impl<'a> TextureBinding<'a> {
    /// Backing image file, for file textures.
    pub fn file_path(&self) -> Option<&'a Path> {
        self.entry.file_path()
    }

    /// Flat colour, for builtin textures.
    pub fn color(&self) -> Option<Vec3> {
        self.entry.color()
    }
}

/// Everything a renderer needs to build one visual object.
#[derive(Clone, Debug)]
pub struct VisualRequest<'a> {
    pub shape: &'a GeomType,
    pub name: &'a str,
    pub orientation: WxyzQuat,
    pub position: Vec3,

    /// Raw `size` values, shape-specific
    pub size: &'a [f32],

    pub scale: Vec3,

    /// Flat colour from the geom, or its material
    pub rgba: Option<Vec4>,

    pub texture: Option<TextureBinding<'a>>,

    /// Referenced mesh, for mesh geoms
    pub mesh: Option<&'a MeshMetadata>,

    /// Every mesh in the document
    pub meshes: &'a MeshTable,
}

/// Creates renderer objects for visual geoms.
pub trait VisualFactory {
    /// Opaque renderer object reference
    type Handle;

    type Error: std::error::Error + Send + Sync + 'static;

    fn create_visual(&mut self, request: &VisualRequest<'_>) -> Result<Self::Handle, Self::Error>;
}

impl<F: VisualFactory + ?Sized> VisualFactory for &mut F {
    type Handle = F::Handle;
    type Error = F::Error;

    fn create_visual(&mut self, request: &VisualRequest<'_>) -> Result<Self::Handle, Self::Error> {
        (**self).create_visual(request)
    }
}
