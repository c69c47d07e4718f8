//! Typed views over MJCF elements.
//!
//! These types are the intermediate representation between the raw element
//! tree and the visual components. Absent attributes stay `None` here; the
//! scene parser decides which default applies.

use std::path::Path;

use mjvis_math::{
    parse_floats, parse_vec3, parse_vec4, parse_wxyz, Vec3, Vec4, VectorParseError, WxyzQuat,
};
use thiserror::Error;

use super::document::{Attributes, Element};

/// A required attribute is missing or an attribute value does not parse.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttributeError {
    #[error("missing required attribute `{0}`")]
    Missing(&'static str),

    #[error("invalid value for `{attribute}`: {source}")]
    InvalidVector {
        attribute: &'static str,
        #[source]
        source: VectorParseError,
    },

    #[error("invalid integer for `{attribute}`: `{value}`")]
    InvalidInteger { attribute: &'static str, value: String },
}

pub type AttributeResult<T> = Result<T, AttributeError>;

/// Geometry shape, from the `type` attribute of a `geom`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum GeomType {
    Plane,
    Hfield,
    #[default]
    Sphere,
    Capsule,
    Ellipsoid,
    Cylinder,
    Box,
    Mesh,
    Sdf,
    /// A type this crate does not know; forwarded to the renderer as-is
    Other(String),
}

impl GeomType {
    pub fn parse(s: &str) -> Self {
        match s {
            "plane" => GeomType::Plane,
            "hfield" => GeomType::Hfield,
            "sphere" => GeomType::Sphere,
            "capsule" => GeomType::Capsule,
            "ellipsoid" => GeomType::Ellipsoid,
            "cylinder" => GeomType::Cylinder,
            "box" => GeomType::Box,
            "mesh" => GeomType::Mesh,
            "sdf" => GeomType::Sdf,
            other => GeomType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            GeomType::Plane => "plane",
            GeomType::Hfield => "hfield",
            GeomType::Sphere => "sphere",
            GeomType::Capsule => "capsule",
            GeomType::Ellipsoid => "ellipsoid",
            GeomType::Cylinder => "cylinder",
            GeomType::Box => "box",
            GeomType::Mesh => "mesh",
            GeomType::Sdf => "sdf",
            GeomType::Other(s) => s,
        }
    }
}

impl std::fmt::Display for GeomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn owned(attributes: &Attributes, key: &str) -> Option<String> {
    attributes.get(key).map(str::to_string)
}

fn vec3_attr(attributes: &Attributes, key: &'static str) -> AttributeResult<Option<Vec3>> {
    attributes
        .get(key)
        .map(|s| {
            parse_vec3(s).map_err(|source| AttributeError::InvalidVector { attribute: key, source })
        })
        .transpose()
}

fn vec4_attr(attributes: &Attributes, key: &'static str) -> AttributeResult<Option<Vec4>> {
    attributes
        .get(key)
        .map(|s| {
            parse_vec4(s).map_err(|source| AttributeError::InvalidVector { attribute: key, source })
        })
        .transpose()
}

/// A `texture` asset.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureNode {
    pub name: Option<String>,

    /// `type` attribute (`2d`, `cube`, `skybox`)
    pub kind: Option<String>,

    /// Image file, when the texture is file-backed
    pub file: Option<String>,

    /// Primary colour of a builtin texture
    pub rgb1: Option<Vec3>,

    /// Every attribute as written
    pub attributes: Attributes,
}

impl TextureNode {
    pub fn from_element(element: &Element) -> AttributeResult<Self> {
        let attributes = &element.attributes;
        Ok(Self {
            name: owned(attributes, "name"),
            kind: owned(attributes, "type"),
            file: owned(attributes, "file"),
            rgb1: vec3_attr(attributes, "rgb1")?,
            attributes: attributes.clone(),
        })
    }

    /// Explicit name, else the stem of `file`, as MuJoCo names file textures.
    pub fn resolved_name(&self) -> Option<String> {
        self.name.clone().or_else(|| file_stem(self.file.as_deref()))
    }
}

/// A `material` asset.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialNode {
    pub name: Option<String>,
    pub texture: Option<String>,
    pub rgba: Option<Vec4>,
}

impl MaterialNode {
    pub fn from_element(element: &Element) -> AttributeResult<Self> {
        let attributes = &element.attributes;
        Ok(Self {
            name: owned(attributes, "name"),
            // An empty texture reference means "none"
            texture: owned(attributes, "texture").filter(|t| !t.is_empty()),
            rgba: vec4_attr(attributes, "rgba")?,
        })
    }
}

/// A `mesh` asset.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshNode {
    pub name: Option<String>,
    pub file: Option<String>,

    /// Per-axis scale, `(1, 1, 1)` when absent
    pub scale: Vec3,

    pub attributes: Attributes,
}

impl MeshNode {
    pub fn from_element(element: &Element) -> AttributeResult<Self> {
        Self::from_attributes(&element.attributes)
    }

    /// Build from attributes already merged with class defaults.
    pub fn from_attributes(attributes: &Attributes) -> AttributeResult<Self> {
        Ok(Self {
            name: owned(attributes, "name"),
            file: owned(attributes, "file"),
            scale: vec3_attr(attributes, "scale")?.unwrap_or(Vec3::ONE),
            attributes: attributes.clone(),
        })
    }

    /// Explicit name, else the file stem (the MJCF naming rule for meshes).
    pub fn resolved_name(&self) -> Option<String> {
        self.name.clone().or_else(|| file_stem(self.file.as_deref()))
    }
}

fn file_stem(file: Option<&str>) -> Option<String> {
    file.and_then(|f| Path::new(f).file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
}

/// A `body` element (or the `worldbody`).
#[derive(Clone, Debug, PartialEq)]
pub struct BodyNode {
    pub name: Option<String>,

    /// Offset relative to the enclosing body, zero when absent
    pub pos: Vec3,

    pub childclass: Option<String>,
}

impl BodyNode {
    pub fn from_element(element: &Element) -> AttributeResult<Self> {
        let attributes = &element.attributes;
        Ok(Self {
            name: owned(attributes, "name"),
            pos: vec3_attr(attributes, "pos")?.unwrap_or(Vec3::ZERO),
            childclass: owned(attributes, "childclass"),
        })
    }
}

/// A `geom` element, after default-class attributes have been merged in.
#[derive(Clone, Debug, PartialEq)]
pub struct GeomNode {
    pub name: Option<String>,
    pub kind: GeomType,

    /// Render group; visual geometry conventionally lives in group 1
    pub group: Option<i32>,

    pub pos: Option<Vec3>,
    pub quat: Option<WxyzQuat>,

    /// 1 to 3 shape-specific values
    pub size: Option<Vec<f32>>,

    pub mesh: Option<String>,
    pub material: Option<String>,
    pub rgba: Option<Vec4>,
    pub class: Option<String>,
}

impl GeomNode {
    pub fn from_attributes(attributes: &Attributes) -> AttributeResult<Self> {
        let group = attributes
            .get("group")
            .map(|g| {
                g.trim().parse::<i32>().map_err(|_| AttributeError::InvalidInteger {
                    attribute: "group",
                    value: g.to_string(),
                })
            })
            .transpose()?;

        let quat = attributes
            .get("quat")
            .map(|s| {
                parse_wxyz(s).map_err(|source| AttributeError::InvalidVector {
                    attribute: "quat",
                    source,
                })
            })
            .transpose()?;

        let size = attributes
            .get("size")
            .map(|s| {
                parse_floats(s).map_err(|source| AttributeError::InvalidVector {
                    attribute: "size",
                    source,
                })
            })
            .transpose()?;

        Ok(Self {
            name: owned(attributes, "name"),
            kind: attributes.get("type").map(GeomType::parse).unwrap_or_default(),
            group,
            pos: vec3_attr(attributes, "pos")?,
            quat,
            size,
            mesh: owned(attributes, "mesh"),
            material: owned(attributes, "material"),
            rgba: vec4_attr(attributes, "rgba")?,
            class: owned(attributes, "class"),
        })
    }
}

/// Asset directories from the `compiler` element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompilerSettings {
    pub assetdir: Option<String>,
    pub meshdir: Option<String>,
    pub texturedir: Option<String>,
}

impl CompilerSettings {
    pub fn from_element(element: &Element) -> Self {
        let attributes = &element.attributes;
        Self {
            assetdir: owned(attributes, "assetdir"),
            meshdir: owned(attributes, "meshdir"),
            texturedir: owned(attributes, "texturedir"),
        }
    }

    /// Directory texture files are relative to.
    pub fn texture_dir(&self) -> Option<&str> {
        self.texturedir.as_deref().or(self.assetdir.as_deref())
    }

    /// Directory mesh files are relative to.
    pub fn mesh_dir(&self) -> Option<&str> {
        self.meshdir.as_deref().or(self.assetdir.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mjcf::SceneDocument;

    fn first<'a>(doc: &'a SceneDocument, tag: &'a str) -> &'a Element {
        doc.iter_tag(tag).next().unwrap()
    }

    #[test]
    fn test_geom_type_parse() {
        assert_eq!(GeomType::parse("mesh"), GeomType::Mesh);
        assert_eq!(GeomType::parse("plane"), GeomType::Plane);
        assert_eq!(GeomType::parse("blob"), GeomType::Other("blob".to_string()));
        assert_eq!(GeomType::default(), GeomType::Sphere);
        assert_eq!(GeomType::Box.to_string(), "box");
    }

    #[test]
    fn test_geom_defaults_stay_absent() {
        let geom = GeomNode::from_attributes(&Attributes::new()).unwrap();
        assert_eq!(geom.kind, GeomType::Sphere);
        assert!(geom.name.is_none());
        assert!(geom.pos.is_none());
        assert!(geom.quat.is_none());
        assert!(geom.size.is_none());
        assert!(geom.group.is_none());
    }

    #[test]
    fn test_geom_full() {
        let attrs: Attributes = [
            ("name", "g"),
            ("type", "box"),
            ("group", "1"),
            ("pos", "1 2 3"),
            ("quat", "0 1 0 0"),
            ("size", "0.1 0.2"),
            ("material", "wood"),
            ("rgba", "1 0 0 1"),
        ]
        .into_iter()
        .collect();
        let geom = GeomNode::from_attributes(&attrs).unwrap();
        assert_eq!(geom.kind, GeomType::Box);
        assert_eq!(geom.group, Some(1));
        assert_eq!(geom.pos, Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(geom.quat, Some(WxyzQuat::new(0.0, 1.0, 0.0, 0.0)));
        assert_eq!(geom.size, Some(vec![0.1, 0.2]));
        assert_eq!(geom.material.as_deref(), Some("wood"));
        assert_eq!(geom.rgba, Some(Vec4::new(1.0, 0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_geom_bad_group() {
        let attrs: Attributes = [("group", "visual")].into_iter().collect();
        assert_eq!(
            GeomNode::from_attributes(&attrs),
            Err(AttributeError::InvalidInteger {
                attribute: "group",
                value: "visual".to_string()
            })
        );
    }

    #[test]
    fn test_geom_short_quat() {
        let attrs: Attributes = [("quat", "1 0 0")].into_iter().collect();
        assert!(matches!(
            GeomNode::from_attributes(&attrs),
            Err(AttributeError::InvalidVector { attribute: "quat", .. })
        ));
    }

    #[test]
    fn test_texture_and_material() {
        let doc = SceneDocument::parse(
            r#"<asset>
                <texture name="sky" type="skybox" builtin="gradient" rgb1="0.9 0.9 1"/>
                <material name="plain" texture=""/>
            </asset>"#,
        )
        .unwrap();

        let tex = TextureNode::from_element(first(&doc, "texture")).unwrap();
        assert_eq!(tex.kind.as_deref(), Some("skybox"));
        assert!(tex.file.is_none());
        assert_eq!(tex.rgb1, Some(Vec3::new(0.9, 0.9, 1.0)));
        assert_eq!(tex.attributes.get("builtin"), Some("gradient"));

        let mat = MaterialNode::from_element(first(&doc, "material")).unwrap();
        assert_eq!(mat.name.as_deref(), Some("plain"));
        assert!(mat.texture.is_none());
    }

    #[test]
    fn test_mesh_name_falls_back_to_file_stem() {
        let doc =
            SceneDocument::parse(r#"<mesh file="meshes/link0.stl" scale="2 2 2"/>"#).unwrap();
        let mesh = MeshNode::from_element(doc.root()).unwrap();
        assert_eq!(mesh.resolved_name().as_deref(), Some("link0"));
        assert_eq!(mesh.scale, Vec3::splat(2.0));
    }

    #[test]
    fn test_texture_name_falls_back_to_file_stem() {
        let doc = SceneDocument::parse(
            r#"<asset>
                <texture file="textures/wood.png" type="2d"/>
                <texture type="skybox" builtin="gradient" rgb1="1 1 1"/>
            </asset>"#,
        )
        .unwrap();

        let mut textures = doc.iter_tag("texture");
        let file = TextureNode::from_element(textures.next().unwrap()).unwrap();
        assert_eq!(file.resolved_name().as_deref(), Some("wood"));

        let skybox = TextureNode::from_element(textures.next().unwrap()).unwrap();
        assert!(skybox.resolved_name().is_none());
    }

    #[test]
    fn test_compiler_dirs() {
        let doc =
            SceneDocument::parse(r#"<compiler assetdir="assets" meshdir="meshes"/>"#).unwrap();
        let compiler = CompilerSettings::from_element(doc.root());
        assert_eq!(compiler.mesh_dir(), Some("meshes"));
        assert_eq!(compiler.texture_dir(), Some("assets"));
    }
}
