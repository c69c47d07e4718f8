//! MJCF (MuJoCo XML) support for mjvis.
//!
//! This module reads an MJCF document into memory and exposes typed views
//! of the elements the visual parser needs.
//!
//! ## Supported
//!
//! - `texture`, `material`, `mesh` assets
//! - `body` / `geom` hierarchy with `pos`, `quat`, `size`, `group`, `rgba`
//! - `<default>` classes for geoms (`class`, `childclass`, nesting) and mesh assets
//! - `<compiler assetdir meshdir texturedir>`
//!
//! ## Not Supported
//!
//! - `<include>` files (load the compiled model XML instead)
//! - `axisangle` / `euler` / `xyaxes` orientations
//! - body transform accumulation beyond what the visual parser needs
//!
//! # Example
//!
//! ```ignore
//! use mjvis_core::mjcf::SceneDocument;
//!
//! let doc = SceneDocument::load("scene.xml")?;
//! println!("{} geoms", doc.iter_tag("geom").count());
//! ```

mod defaults;
mod document;
mod types;

pub use defaults::*;
pub use document::*;
pub use types::*;
