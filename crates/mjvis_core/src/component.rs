//! Visual components emitted by the scene parser.
//!
//! A component is the renderer-side mirror of one visual geom: where it
//! sits, how it is oriented, whether it follows the simulation, and the
//! handle the renderer gave back for it.

use std::collections::HashMap;

use mjvis_math::{Vec3, WxyzQuat};
use serde::{Serialize, Serializer};

/// Name used for geoms whose parent has no name.
pub const WORLD_BODY: &str = "worldbody";

/// One renderer-ready geom.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VisualComponent<H> {
    /// Unique within one parse pass
    pub name: String,

    /// Owning body, or [`WORLD_BODY`]
    pub parent_body_name: String,

    pub position: Vec3,

    /// Scalar-first, as written in the document
    pub orientation: WxyzQuat,

    /// Whether the pose follows live simulation state
    pub dynamic: bool,

    /// Renderer object created for this geom
    pub handle: H,
}

/// Components in document order, addressable by name.
#[derive(Clone, Debug)]
pub struct ComponentTable<H> {
    components: Vec<VisualComponent<H>>,
    index: HashMap<String, usize>,
}

impl<H> Default for ComponentTable<H> {
    fn default() -> Self {
        Self {
            components: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<H> ComponentTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a component.
    ///
    /// A name that is already present is rejected and the component handed back.
    pub fn insert(&mut self, component: VisualComponent<H>) -> Result<usize, VisualComponent<H>> {
        if self.index.contains_key(&component.name) {
            return Err(component);
        }
        let slot = self.components.len();
        self.index.insert(component.name.clone(), slot);
        self.components.push(component);
        Ok(slot)
    }

    pub fn get(&self, name: &str) -> Option<&VisualComponent<H>> {
        self.index.get(name).map(|&i| &self.components[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VisualComponent<H>> {
        self.components.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|c| c.name.as_str())
    }

    /// Components that track simulation state.
    pub fn dynamic_components(&self) -> impl Iterator<Item = &VisualComponent<H>> {
        self.components.iter().filter(|c| c.dynamic)
    }

    pub fn static_components(&self) -> impl Iterator<Item = &VisualComponent<H>> {
        self.components.iter().filter(|c| !c.dynamic)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn as_slice(&self) -> &[VisualComponent<H>] {
        &self.components
    }

    pub fn into_vec(self) -> Vec<VisualComponent<H>> {
        self.components
    }
}

impl<'a, H> IntoIterator for &'a ComponentTable<H> {
    type Item = &'a VisualComponent<H>;
    type IntoIter = std::slice::Iter<'a, VisualComponent<H>>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}

impl<H: Serialize> Serialize for ComponentTable<H> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.components)
    }
}
