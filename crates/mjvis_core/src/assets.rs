//! Lookup tables built from the MJCF asset section.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use mjvis_math::{Vec3, Vec4};

use crate::mjcf::Attributes;

/// A named texture: either backed by an image file or a builtin colour.
#[derive(Clone, Debug, PartialEq)]
pub enum TextureEntry {
    /// Image texture; `attributes` is the element as written
    File { attributes: Attributes, path: PathBuf },

    /// Builtin texture reduced to its primary colour
    Procedural { rgb: Vec3, kind: Option<String> },
}

impl TextureEntry {
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            TextureEntry::File { path, .. } => Some(path),
            TextureEntry::Procedural { .. } => None,
        }
    }

    pub fn color(&self) -> Option<Vec3> {
        match self {
            TextureEntry::File { .. } => None,
            TextureEntry::Procedural { rgb, .. } => Some(*rgb),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, TextureEntry::File { .. })
    }
}

/// What a material contributes to a geom's appearance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialBinding {
    pub texture: Option<String>,
    pub rgba: Option<Vec4>,
}

/// A named mesh asset.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshMetadata {
    pub name: String,

    /// Mesh file resolved against the compiler mesh directory
    pub path: Option<PathBuf>,

    pub scale: Vec3,

    pub attributes: Attributes,
}

pub type TextureTable = HashMap<String, TextureEntry>;
pub type MaterialTable = HashMap<String, MaterialBinding>;
pub type MeshTable = HashMap<String, MeshMetadata>;

/// Resolve an asset file against an optional compiler directory and base directory.
pub fn resolve_asset_path(file: &str, dir: Option<&str>, base_dir: Option<&Path>) -> PathBuf {
    let file = Path::new(file);
    if file.is_absolute() {
        return file.to_path_buf();
    }

    let mut path = base_dir.map(Path::to_path_buf).unwrap_or_default();
    if let Some(dir) = dir {
        // `join` keeps an absolute compiler directory as-is
        path = path.join(dir);
    }
    path.join(file)
}
