//! mjvis Core - MJCF scene descriptions to renderer-ready visual components.
//!
//! This crate provides:
//!
//! - **MJCF document model**: `SceneDocument`, typed element views, default classes
//! - **Scene parser**: `SceneDescriptionParser`, turning visual geoms into `VisualComponent`s
//! - **Renderer seam**: the `VisualFactory` trait a renderer implements
//!
//! # Example
//!
//! ```ignore
//! use mjvis_core::{load_mjcf, ParserConfig};
//!
//! let components = load_mjcf("scene.xml", ParserConfig::default(), &mut renderer)?;
//! for component in &components {
//!     println!("{} dynamic={}", component.name, component.dynamic);
//! }
//! ```

pub mod assets;
pub mod component;
pub mod config;
pub mod factory;
pub mod mjcf;
pub mod parser;

// Re-export commonly used types
pub use assets::{MaterialBinding, MeshMetadata, MeshTable, TextureEntry};
pub use component::{ComponentTable, VisualComponent, WORLD_BODY};
pub use config::{ConfigError, ParserConfig};
pub use factory::{TextureBinding, VisualFactory, VisualRequest};
pub use mjcf::{GeomType, SceneDocument};
pub use parser::{load_mjcf, load_mjcf_from_string, ParseError, ParseResult, SceneDescriptionParser};
