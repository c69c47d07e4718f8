//! mjvis Render - reference renderer for parsed MJCF scenes.
//!
//! Implements `mjvis_core::VisualFactory` with an in-memory scene of
//! transformed, textured visual objects.
//!
//! # Example
//!
//! ```ignore
//! use mjvis_core::{load_mjcf, ParserConfig};
//! use mjvis_render::VisualScene;
//!
//! let mut scene = VisualScene::new();
//! let components = load_mjcf("scene.xml", ParserConfig::default(), &mut scene)?;
//!
//! // each physics step
//! scene.sync_dynamic(&components, |c| poses.get(&c.name).copied())?;
//! ```

pub mod material;
pub mod scene;
pub mod texture;

pub use material::{SurfaceMaterial, DEFAULT_BASE_COLOR};
pub use scene::{ObjectHandle, RenderError, RenderResult, Transform, VisualObject, VisualScene};
pub use texture::{srgb_to_linear, Texture, TextureCache, TextureError, TextureResult};
