//! MJCF → visual component parser.
//!
//! Walks a [`SceneDocument`] in four phases (textures, materials, meshes,
//! geoms) and hands every visual geom to a [`VisualFactory`]. The three
//! asset tables must be complete before geoms are resolved, since a geom can
//! reference all of them.
//!
//! A parser instance owns its lookup tables for one pass. Use a fresh
//! instance (or [`SceneDescriptionParser::reset`]) per simulation session.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use mjvis_math::{Vec3, Vec4, WxyzQuat};
use thiserror::Error;

use crate::assets::{
    resolve_asset_path, MaterialBinding, MaterialTable, MeshMetadata, MeshTable, TextureEntry,
    TextureTable,
};
use crate::component::{ComponentTable, VisualComponent, WORLD_BODY};
use crate::config::ParserConfig;
use crate::factory::{TextureBinding, VisualFactory, VisualRequest};
use crate::mjcf::{
    AttributeError, BodyNode, CompilerSettings, DefaultClasses, DocumentError, Element, GeomNode,
    GeomType, MaterialNode, MeshNode, SceneDocument, TextureNode,
};

/// Errors that can occur while turning a document into components.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Malformed document at {element}: {source}")]
    MalformedDocument {
        element: String,
        #[source]
        source: AttributeError,
    },

    #[error("Duplicate component name `{0}`")]
    DuplicateComponentName(String),

    #[error("Renderer failed to create `{geom}`: {source}")]
    Factory {
        geom: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

fn malformed(element: &Element, source: AttributeError) -> ParseError {
    ParseError::MalformedDocument {
        element: element.describe(),
        source,
    }
}

/// `<parent><n>` with a running counter per parent, starting at 0.
fn next_unnamed_name(counters: &mut HashMap<String, usize>, parent_name: &str) -> String {
    let counter = counters.entry(parent_name.to_string()).or_insert(0);
    let name = format!("{}{}", parent_name, counter);
    *counter += 1;
    name
}

/// Converts one MJCF document into visual components.
pub struct SceneDescriptionParser<'d> {
    document: &'d SceneDocument,
    config: ParserConfig,
    compiler: CompilerSettings,
    defaults: DefaultClasses,
    textures: TextureTable,
    materials: MaterialTable,
    meshes: MeshTable,
}

impl<'d> SceneDescriptionParser<'d> {
    pub fn new(document: &'d SceneDocument) -> Self {
        Self::with_config(document, ParserConfig::default())
    }

    pub fn with_config(document: &'d SceneDocument, config: ParserConfig) -> Self {
        let compiler = document
            .iter_tag("compiler")
            .next()
            .map(CompilerSettings::from_element)
            .unwrap_or_default();
        let defaults = if config.resolve_defaults {
            DefaultClasses::from_document(document)
        } else {
            DefaultClasses::default()
        };

        Self {
            document,
            config,
            compiler,
            defaults,
            textures: TextureTable::new(),
            materials: MaterialTable::new(),
            meshes: MeshTable::new(),
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn textures(&self) -> &TextureTable {
        &self.textures
    }

    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    pub fn meshes(&self) -> &MeshTable {
        &self.meshes
    }

    /// Drop all lookup tables.
    pub fn reset(&mut self) {
        self.textures.clear();
        self.materials.clear();
        self.meshes.clear();
    }

    fn base_dir(&self) -> Option<&Path> {
        self.config
            .base_dir
            .as_deref()
            .or_else(|| self.document.base_dir())
    }

    /// Run every phase in order and return the components.
    pub fn parse<F: VisualFactory>(
        &mut self,
        factory: &mut F,
    ) -> ParseResult<ComponentTable<F::Handle>> {
        self.parse_textures()?;
        self.parse_materials()?;
        self.parse_geometries(factory)
    }

    /// Build the texture table.
    ///
    /// File textures keep their raw attributes; builtin ones are reduced to
    /// `rgb1` and their `type`. An unnamed file texture is named after its
    /// file stem; unnamed builtin textures (skyboxes) cannot be referenced
    /// and are skipped.
    pub fn parse_textures(&mut self) -> ParseResult<()> {
        let document = self.document;
        self.textures.clear();

        for element in document.iter_tag("texture") {
            let node = TextureNode::from_element(element).map_err(|e| malformed(element, e))?;

            let Some(name) = node.resolved_name() else {
                log::debug!("Skipping unnamed texture {}", element.describe());
                continue;
            };

            let entry = match node.file {
                Some(ref file) => TextureEntry::File {
                    path: resolve_asset_path(file, self.compiler.texture_dir(), self.base_dir()),
                    attributes: node.attributes,
                },
                None => {
                    let rgb = node
                        .rgb1
                        .ok_or_else(|| malformed(element, AttributeError::Missing("rgb1")))?;
                    TextureEntry::Procedural {
                        rgb,
                        kind: node.kind,
                    }
                }
            };

            self.textures.insert(name, entry);
        }

        log::info!("Parsed {} textures", self.textures.len());
        Ok(())
    }

    /// Build the material → texture table.
    pub fn parse_materials(&mut self) -> ParseResult<()> {
        let document = self.document;
        self.materials.clear();

        for element in document.iter_tag("material") {
            let node = MaterialNode::from_element(element).map_err(|e| malformed(element, e))?;
            let name = node
                .name
                .ok_or_else(|| malformed(element, AttributeError::Missing("name")))?;

            self.materials.insert(
                name,
                MaterialBinding {
                    texture: node.texture,
                    rgba: node.rgba,
                },
            );
        }

        log::info!("Parsed {} materials", self.materials.len());
        Ok(())
    }

    /// Build the mesh table.
    pub fn parse_meshes(&mut self) -> ParseResult<()> {
        let document = self.document;
        self.meshes.clear();

        for element in document.iter_tag("mesh") {
            // <mesh> inside <default> only carries class defaults
            if document.has_ancestor(element.id, "default") {
                continue;
            }

            let attributes = self.defaults.resolve_mesh(element);
            let node = MeshNode::from_attributes(&attributes).map_err(|e| malformed(element, e))?;
            let name = node
                .resolved_name()
                .ok_or_else(|| malformed(element, AttributeError::Missing("name")))?;
            let path = node
                .file
                .as_deref()
                .map(|f| resolve_asset_path(f, self.compiler.mesh_dir(), self.base_dir()));

            self.meshes.insert(
                name.clone(),
                MeshMetadata {
                    name,
                    path,
                    scale: node.scale,
                    attributes: node.attributes,
                },
            );
        }

        log::info!("Parsed {} meshes", self.meshes.len());
        Ok(())
    }

    /// Resolve every visual geom and create its renderer object.
    ///
    /// Parses meshes first. Textures and materials are expected to be parsed
    /// already; without them material references resolve to nothing.
    pub fn parse_geometries<F: VisualFactory>(
        &mut self,
        factory: &mut F,
    ) -> ParseResult<ComponentTable<F::Handle>> {
        self.parse_meshes()?;

        let document = self.document;
        let mut unnamed_counters: HashMap<String, usize> = HashMap::new();
        let mut table = ComponentTable::new();
        let mut skipped = 0usize;

        for element in document.iter_tag("geom") {
            if document.has_ancestor(element.id, "default") {
                continue;
            }

            let attributes = self.defaults.resolve_geom(document, element);
            let geom = GeomNode::from_attributes(&attributes).map_err(|e| malformed(element, e))?;

            let parent = document.parent(element.id);
            let parent_body_name = parent.and_then(|p| p.attr("name")).unwrap_or(WORLD_BODY);

            let name = match geom.name {
                Some(ref name) => name.clone(),
                None => next_unnamed_name(&mut unnamed_counters, parent_body_name),
            };

            if self.is_excluded(&name, &geom) {
                log::debug!("Skipping geom `{}`", name);
                skipped += 1;
                continue;
            }

            let orientation = geom.quat.unwrap_or(WxyzQuat::IDENTITY);

            let mut position = geom.pos.unwrap_or(Vec3::ZERO);
            if self.config.is_container(parent_body_name) {
                if let Some(parent) = parent {
                    let body = BodyNode::from_element(parent).map_err(|e| malformed(parent, e))?;
                    position += body.pos;
                }
            }

            let mesh = if geom.kind == GeomType::Mesh {
                self.lookup_mesh(&name, geom.mesh.as_deref())
            } else {
                None
            };
            let scale = mesh.map(|m| m.scale).unwrap_or(Vec3::ONE);

            let size = geom.size.clone().unwrap_or_else(|| vec![1.0, 1.0, 1.0]);

            let (texture, material_rgba) = self.resolve_material(&name, geom.material.as_deref());
            let rgba = geom.rgba.or(material_rgba);

            let dynamic = !self.config.is_static(&name);

            if table.contains(&name) {
                return Err(ParseError::DuplicateComponentName(name));
            }

            let request = VisualRequest {
                shape: &geom.kind,
                name: &name,
                orientation,
                position,
                size: &size,
                scale,
                rgba,
                texture,
                mesh,
                meshes: &self.meshes,
            };
            let handle = factory
                .create_visual(&request)
                .map_err(|e| ParseError::Factory {
                    geom: name.clone(),
                    source: Box::new(e),
                })?;

            table
                .insert(VisualComponent {
                    name,
                    parent_body_name: parent_body_name.to_string(),
                    position,
                    orientation,
                    dynamic,
                    handle,
                })
                .map_err(|c| ParseError::DuplicateComponentName(c.name))?;
        }

        log::info!(
            "Created {} visual components ({} geoms skipped)",
            table.len(),
            skipped
        );
        Ok(table)
    }

    /// Floor, wall, deny-list, non-visual group, collision.
    fn is_excluded(&self, name: &str, geom: &GeomNode) -> bool {
        if self.config.is_excluded_name(name) {
            return true;
        }
        let visual = geom.group == Some(self.config.visual_group);
        (!visual && geom.kind != GeomType::Plane) || self.config.is_collision_name(name)
    }

    fn lookup_mesh(&self, geom_name: &str, mesh: Option<&str>) -> Option<&MeshMetadata> {
        let Some(mesh) = mesh else {
            log::warn!("Mesh geom `{}` has no mesh attribute", geom_name);
            return None;
        };
        let found = self.meshes.get(mesh);
        if found.is_none() {
            log::warn!("Geom `{}` references unknown mesh `{}`", geom_name, mesh);
        }
        found
    }

    /// Material → (texture binding, material colour).
    ///
    /// Unknown materials and textures are logged and resolve to no binding.
    fn resolve_material(
        &self,
        geom_name: &str,
        material: Option<&str>,
    ) -> (Option<TextureBinding<'_>>, Option<Vec4>) {
        let Some(material) = material else {
            return (None, None);
        };
        let Some(binding) = self.materials.get(material) else {
            log::warn!(
                "Geom `{}` references unknown material `{}`",
                geom_name,
                material
            );
            return (None, None);
        };

        let texture = binding.texture.as_deref().and_then(|texture| {
            match self.textures.get_key_value(texture) {
                Some((name, entry)) => Some(TextureBinding { name, entry }),
                None => {
                    log::warn!(
                        "Material `{}` references unknown texture `{}`",
                        material,
                        texture
                    );
                    None
                }
            }
        });

        (texture, binding.rgba)
    }
}

/// Load an MJCF file and build its components with `factory`.
///
/// # Example
///
/// ```ignore
/// use mjvis_core::{load_mjcf, ParserConfig};
///
/// let components = load_mjcf("scene.xml", ParserConfig::default(), &mut renderer)?;
/// println!("{} visual components", components.len());
/// ```
pub fn load_mjcf<P, F>(
    path: P,
    config: ParserConfig,
    factory: &mut F,
) -> ParseResult<ComponentTable<F::Handle>>
where
    P: AsRef<Path>,
    F: VisualFactory,
{
    let document = SceneDocument::load(path)?;
    SceneDescriptionParser::with_config(&document, config).parse(factory)
}

/// Build components from MJCF text (useful for testing).
pub fn load_mjcf_from_string<F: VisualFactory>(
    xml: &str,
    config: ParserConfig,
    base_dir: Option<PathBuf>,
    factory: &mut F,
) -> ParseResult<ComponentTable<F::Handle>> {
    let mut document = SceneDocument::parse(xml)?;
    if let Some(base_dir) = base_dir {
        document = document.with_base_dir(base_dir);
    }
    SceneDescriptionParser::with_config(&document, config).parse(factory)
}
