//! MJCF `<default>` class resolution for geoms and meshes.
//!
//! A geom picks its class from its own `class` attribute, else from the
//! nearest enclosing body's `childclass`, else the top-level `main` class.
//! A mesh asset uses its `class` attribute or `main`. Nested default blocks
//! inherit from the block that contains them, and attributes written on the
//! element itself always win.

use std::collections::HashMap;

use super::document::{Attributes, Element, SceneDocument};

/// Name of the implicit top-level default class.
pub const MAIN_CLASS: &str = "main";

#[derive(Clone, Debug, Default)]
struct DefaultClass {
    parent: Option<String>,
    geom: Attributes,
    mesh: Attributes,
}

impl DefaultClass {
    fn geom(&self) -> &Attributes {
        &self.geom
    }

    fn mesh(&self) -> &Attributes {
        &self.mesh
    }
}

/// Geom and mesh defaults per class, read once from a document.
#[derive(Clone, Debug, Default)]
pub struct DefaultClasses {
    classes: HashMap<String, DefaultClass>,
}

impl DefaultClasses {
    pub fn from_document(document: &SceneDocument) -> Self {
        let mut classes = HashMap::new();

        for block in document.iter_tag("default") {
            let name = class_name(block);
            let parent = document
                .parent(block.id)
                .filter(|p| p.tag == "default")
                .map(class_name);
            let template = |tag: &str| {
                document
                    .children(block.id)
                    .find(|c| c.tag == tag)
                    .map(|c| c.attributes.clone())
                    .unwrap_or_default()
            };
            let geom = template("geom");
            let mesh = template("mesh");

            classes.insert(name, DefaultClass { parent, geom, mesh });
        }

        if !classes.is_empty() {
            log::debug!("Read {} default classes", classes.len());
        }

        Self { classes }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn contains(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    /// Geom attributes a class provides, outermost class applied first.
    pub fn geom_defaults(&self, class: &str) -> Attributes {
        self.chain_defaults(class, DefaultClass::geom)
    }

    /// Mesh attributes a class provides, outermost class applied first.
    pub fn mesh_defaults(&self, class: &str) -> Attributes {
        self.chain_defaults(class, DefaultClass::mesh)
    }

    fn chain_defaults(
        &self,
        class: &str,
        template: fn(&DefaultClass) -> &Attributes,
    ) -> Attributes {
        let mut chain = Vec::new();
        let mut current = Some(class);

        // Bounded walk: a malformed document could name a cycle
        while let Some(name) = current {
            if chain.len() > self.classes.len() {
                break;
            }
            match self.classes.get(name) {
                Some(entry) => {
                    chain.push(entry);
                    current = entry.parent.as_deref();
                }
                None => {
                    if name != MAIN_CLASS {
                        log::debug!("Unknown default class `{}`", name);
                    }
                    break;
                }
            }
        }

        let mut merged = Attributes::new();
        for entry in chain.iter().rev() {
            // names never inherit
            for (key, value) in template(entry).iter().filter(|(key, _)| *key != "name") {
                merged.insert(key, value);
            }
        }
        merged
    }

    /// Class that applies to a geom element.
    pub fn class_for<'a>(&self, document: &'a SceneDocument, geom: &'a Element) -> &'a str {
        if let Some(class) = geom.attr("class") {
            return class;
        }
        document
            .ancestors(geom.id)
            .filter(|a| a.tag == "body" || a.tag == "frame")
            .find_map(|a| a.attr("childclass"))
            .unwrap_or(MAIN_CLASS)
    }

    /// The geom's own attributes layered over its class defaults.
    pub fn resolve_geom(&self, document: &SceneDocument, geom: &Element) -> Attributes {
        if self.classes.is_empty() {
            return geom.attributes.clone();
        }

        let mut merged = self.geom_defaults(self.class_for(document, geom));
        for (key, value) in geom.attributes.iter() {
            merged.insert(key, value);
        }
        merged
    }

    /// A mesh asset's own attributes layered over its class defaults.
    pub fn resolve_mesh(&self, mesh: &Element) -> Attributes {
        if self.classes.is_empty() {
            return mesh.attributes.clone();
        }

        let mut merged = self.mesh_defaults(mesh.attr("class").unwrap_or(MAIN_CLASS));
        for (key, value) in mesh.attributes.iter() {
            merged.insert(key, value);
        }
        merged
    }
}

fn class_name(block: &Element) -> String {
    block.attr("class").unwrap_or(MAIN_CLASS).to_string()
}
