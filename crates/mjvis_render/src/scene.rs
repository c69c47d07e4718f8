//! In-memory renderer scene built from parsed visual components.
//!
//! `VisualScene` is the renderer side of the parser's factory seam: each
//! request becomes a `VisualObject` and the caller gets back an
//! `ObjectHandle` to drive its pose later.

use std::path::PathBuf;

use mjvis_core::{ComponentTable, GeomType, VisualComponent, VisualFactory, VisualRequest};
use mjvis_math::{Mat4, Quat, Vec3, Vec4, WxyzQuat};
use serde::Serialize;
use thiserror::Error;

use crate::material::SurfaceMaterial;
use crate::texture::{TextureCache, TextureError};

/// Errors raised by scene operations.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Unknown object handle: {0:?}")]
    UnknownHandle(ObjectHandle),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Index of an object inside a `VisualScene`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectHandle(pub usize);

/// A 3D transformation (translation, rotation, scale).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_pose(translation: Vec3, orientation: WxyzQuat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation: orientation.to_quat(),
            scale,
        }
    }

    pub fn orientation(&self) -> WxyzQuat {
        WxyzQuat::from_quat(self.rotation)
    }

    /// Order: Scale -> Rotate -> Translate (SRT)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// One renderable object.
#[derive(Clone, Debug)]
pub struct VisualObject {
    pub name: String,
    pub shape: GeomType,
    pub transform: Transform,

    /// Shape-specific `size` values as written on the geom
    pub size: Vec<f32>,

    pub material: SurfaceMaterial,

    /// Mesh file for mesh geoms
    pub mesh_path: Option<PathBuf>,
}

/// Collection of visual objects plus the textures they share.
pub struct VisualScene {
    objects: Vec<VisualObject>,
    textures: TextureCache,
    load_textures: bool,
}

impl Default for VisualScene {
    fn default() -> Self {
        Self::new()
    }
}

impl VisualScene {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            textures: TextureCache::new(),
            load_textures: true,
        }
    }

    /// Record texture paths without decoding the images.
    pub fn without_texture_loading(mut self) -> Self {
        self.load_textures = false;
        self
    }

    pub fn object(&self, handle: ObjectHandle) -> Option<&VisualObject> {
        self.objects.get(handle.0)
    }

    pub fn objects(&self) -> &[VisualObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn texture_cache(&self) -> &TextureCache {
        &self.textures
    }

    /// Move an object, keeping its scale.
    pub fn set_pose(
        &mut self,
        handle: ObjectHandle,
        position: Vec3,
        orientation: WxyzQuat,
    ) -> RenderResult<()> {
        let object = self
            .objects
            .get_mut(handle.0)
            .ok_or(RenderError::UnknownHandle(handle))?;

        object.transform.translation = position;
        object.transform.rotation = orientation.to_quat();
        Ok(())
    }

    /// Push new poses onto every dynamic component.
    ///
    /// `pose_of` returns the current world pose of a component, or `None` to
    /// leave it where it is. Static components are never queried. Returns
    /// the number of objects moved.
    pub fn sync_dynamic<F>(
        &mut self,
        components: &ComponentTable<ObjectHandle>,
        mut pose_of: F,
    ) -> RenderResult<usize>
    where
        F: FnMut(&VisualComponent<ObjectHandle>) -> Option<(Vec3, WxyzQuat)>,
    {
        let mut moved = 0;
        for component in components.dynamic_components() {
            if let Some((position, orientation)) = pose_of(component) {
                self.set_pose(component.handle, position, orientation)?;
                moved += 1;
            }
        }
        Ok(moved)
    }

    fn build_material(&mut self, request: &VisualRequest<'_>) -> SurfaceMaterial {
        let mut material = SurfaceMaterial::default();

        if let Some(binding) = request.texture {
            material.name = binding.name.to_string();

            if let Some(path) = binding.file_path() {
                material.texture_path = Some(path.to_path_buf());
                if self.load_textures {
                    match self.textures.fetch(path) {
                        Ok(texture) => material.diffuse_texture = Some(texture),
                        Err(TextureError::PreviouslyFailed(_)) => {}
                        Err(e) => log::warn!(
                            "Texture '{}' unavailable, '{}' uses a flat colour: {}",
                            binding.name,
                            request.name,
                            e
                        ),
                    }
                }
            } else if let Some(rgb) = binding.color() {
                material.base_color = rgb.extend(1.0);
            }
        }

        if let Some(rgba) = request.rgba {
            material.base_color = rgba;
        } else if material.texture_path.is_some() {
            // untinted image
            material.base_color = Vec4::ONE;
        }

        material
    }
}

impl VisualFactory for VisualScene {
    type Handle = ObjectHandle;
    type Error = RenderError;

    fn create_visual(&mut self, request: &VisualRequest<'_>) -> RenderResult<ObjectHandle> {
        let material = self.build_material(request);
        let handle = ObjectHandle(self.objects.len());

        self.objects.push(VisualObject {
            name: request.name.to_string(),
            shape: request.shape.clone(),
            transform: Transform::from_pose(request.position, request.orientation, request.scale),
            size: request.size.to_vec(),
            material,
            mesh_path: request.mesh.and_then(|mesh| mesh.path.clone()),
        });

        log::debug!("Created visual '{}' ({})", request.name, request.shape);
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mjvis_core::mjcf::Attributes;
    use mjvis_core::{MeshMetadata, MeshTable, TextureBinding, TextureEntry};

    fn request<'a>(shape: &'a GeomType, name: &'a str, meshes: &'a MeshTable) -> VisualRequest<'a> {
        VisualRequest {
            shape,
            name,
            orientation: WxyzQuat::IDENTITY,
            position: Vec3::new(1.0, 2.0, 3.0),
            size: &[0.1, 0.2, 0.3],
            scale: Vec3::ONE,
            rgba: None,
            texture: None,
            mesh: None,
            meshes,
        }
    }

    #[test]
    fn test_transform_default() {
        let t = Transform::default();
        assert_eq!(t.to_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_transform_from_pose() {
        let t = Transform::from_pose(Vec3::X, WxyzQuat::new(0.0, 0.0, 0.0, 1.0), Vec3::ONE);
        let p = t.to_matrix().transform_point3(Vec3::X);
        // half turn about z, then offset
        assert!((p - Vec3::ZERO).length() < 1e-6);
    }

    #[test]
    fn test_create_visual_assigns_sequential_handles() {
        let meshes = MeshTable::new();
        let sphere = GeomType::Sphere;
        let mut scene = VisualScene::new();

        let a = scene.create_visual(&request(&sphere, "a", &meshes)).unwrap();
        let b = scene.create_visual(&request(&sphere, "b", &meshes)).unwrap();

        assert_eq!(a, ObjectHandle(0));
        assert_eq!(b, ObjectHandle(1));
        assert_eq!(scene.object(b).unwrap().name, "b");
        assert_eq!(scene.object(a).unwrap().size, vec![0.1, 0.2, 0.3]);
        assert_eq!(
            scene.object(a).unwrap().transform.translation,
            Vec3::new(1.0, 2.0, 3.0)
        );
    }

    #[test]
    fn test_rgba_wins_over_procedural_texture() {
        let meshes = MeshTable::new();
        let shape = GeomType::Box;
        let entry = TextureEntry::Procedural {
            rgb: Vec3::new(0.8, 0.6, 0.4),
            kind: Some("flat".to_string()),
        };

        let mut scene = VisualScene::new();
        let mut req = request(&shape, "wood", &meshes);
        req.texture = Some(TextureBinding { name: "tex-wood", entry: &entry });
        let wood = scene.create_visual(&req).unwrap();

        req.name = "tinted";
        req.rgba = Some(Vec4::new(1.0, 0.0, 0.0, 0.5));
        let tinted = scene.create_visual(&req).unwrap();

        let wood = &scene.object(wood).unwrap().material;
        assert_eq!(wood.name, "tex-wood");
        assert_eq!(wood.base_color, Vec4::new(0.8, 0.6, 0.4, 1.0));

        let tinted = &scene.object(tinted).unwrap().material;
        assert_eq!(tinted.base_color, Vec4::new(1.0, 0.0, 0.0, 0.5));
    }

    #[test]
    fn test_missing_texture_falls_back_to_flat_colour() {
        let _ = env_logger::builder().is_test(true).try_init();

        let meshes = MeshTable::new();
        let shape = GeomType::Plane;
        let entry = TextureEntry::File {
            attributes: Attributes::default(),
            path: PathBuf::from("/no/such/texture.png"),
        };

        let mut scene = VisualScene::new();
        let mut req = request(&shape, "floor", &meshes);
        req.texture = Some(TextureBinding { name: "texplane", entry: &entry });
        let handle = scene.create_visual(&req).unwrap();

        let material = &scene.object(handle).unwrap().material;
        assert!(!material.has_texture());
        assert_eq!(material.texture_path, Some(PathBuf::from("/no/such/texture.png")));
        assert!(scene.texture_cache().is_empty());

        // a second geom on the same broken file falls back without a retry
        req.name = "floor_copy";
        let copy = scene.create_visual(&req).unwrap();
        assert!(!scene.object(copy).unwrap().material.has_texture());
        assert_eq!(scene.texture_cache().failures().count(), 1);
    }

    #[test]
    fn test_mesh_path_recorded() {
        let mesh = MeshMetadata {
            name: "can".to_string(),
            path: Some(PathBuf::from("meshes/can.stl")),
            scale: Vec3::splat(2.0),
            attributes: Attributes::default(),
        };
        let mut meshes = MeshTable::new();
        meshes.insert("can".to_string(), mesh.clone());

        let shape = GeomType::Mesh;
        let mut req = request(&shape, "can_visual", &meshes);
        req.mesh = Some(&mesh);
        req.scale = mesh.scale;

        let mut scene = VisualScene::new();
        let handle = scene.create_visual(&req).unwrap();
        let object = scene.object(handle).unwrap();

        assert_eq!(object.mesh_path, Some(PathBuf::from("meshes/can.stl")));
        assert_eq!(object.transform.scale, Vec3::splat(2.0));
    }

    #[test]
    fn test_set_pose_unknown_handle() {
        let mut scene = VisualScene::new();
        let result = scene.set_pose(ObjectHandle(7), Vec3::ZERO, WxyzQuat::IDENTITY);
        assert!(matches!(result, Err(RenderError::UnknownHandle(ObjectHandle(7)))));
    }

    #[test]
    fn test_set_pose_keeps_scale() {
        let meshes = MeshTable::new();
        let shape = GeomType::Capsule;
        let mut req = request(&shape, "arm", &meshes);
        req.scale = Vec3::splat(3.0);

        let mut scene = VisualScene::new();
        let handle = scene.create_visual(&req).unwrap();
        let q = WxyzQuat::new(0.0, 1.0, 0.0, 0.0);
        scene.set_pose(handle, Vec3::Z, q).unwrap();

        let t = scene.object(handle).unwrap().transform;
        assert_eq!(t.translation, Vec3::Z);
        assert_eq!(t.orientation(), q);
        assert_eq!(t.scale, Vec3::splat(3.0));
    }
}
