//! Loads an MJCF file from disk into a `VisualScene` and drives its poses.

use std::fs;
use std::path::PathBuf;

use mjvis_core::{load_mjcf, ParserConfig};
use mjvis_math::{Vec3, Vec4, WxyzQuat};
use mjvis_render::{ObjectHandle, VisualScene};

const SCENE: &str = r#"<mujoco model="tabletop">
    <compiler texturedir="textures"/>
    <asset>
        <texture name="tex-table" file="table.png" type="2d"/>
        <texture name="tex-red" builtin="flat" rgb1="1 0 0" type="2d"/>
        <material name="table" texture="tex-table"/>
        <material name="red" texture="tex-red"/>
    </asset>
    <worldbody>
        <geom name="floor" type="plane" size="2 2 0.1" group="1"/>
        <body name="bin1" pos="0 0 0.5">
            <geom type="box" size="0.3 0.3 0.02" material="table" group="1"/>
        </body>
        <body name="cube" pos="0 0 1">
            <geom name="cube_visual" type="box" size="0.02 0.02 0.02" material="red" group="1"/>
            <geom name="cube_collision" type="box" size="0.02 0.02 0.02" group="0"/>
        </body>
        <body name="ball">
            <geom type="sphere" size="0.03" rgba="0 0 1 1" group="1"/>
        </body>
    </worldbody>
</mujoco>
"#;

fn scratch_dir(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mjvis_render_{}_{}", test, std::process::id()));
    fs::create_dir_all(dir.join("textures")).unwrap();
    dir
}

fn write_scene(dir: &PathBuf) -> PathBuf {
    image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 255, 255, 255]))
        .save(dir.join("textures").join("table.png"))
        .unwrap();

    let scene = dir.join("scene.xml");
    fs::write(&scene, SCENE).unwrap();
    scene
}

#[test]
fn test_load_scene_with_textures() {
    let _ = env_logger::builder().is_test(true).try_init();

    let dir = scratch_dir("textures");
    let path = write_scene(&dir);

    let mut scene = VisualScene::new();
    let components = load_mjcf(&path, ParserConfig::default(), &mut scene).unwrap();

    let names: Vec<&str> = components.names().collect();
    assert_eq!(names, vec!["bin10", "cube_visual", "ball0"]);
    assert_eq!(scene.len(), 3);

    // texture decoded once and bound untinted
    let bin = scene.object(components.get("bin10").unwrap().handle).unwrap();
    assert!(bin.material.has_texture());
    assert_eq!(bin.material.base_color, Vec4::ONE);
    assert!((bin.material.albedo(0.5, 0.5) - Vec3::ONE).length() < 1e-3);
    assert!((bin.transform.translation - Vec3::new(0.0, 0.0, 0.5)).length() < 1e-6);
    assert_eq!(scene.texture_cache().len(), 1);

    let cube = scene.object(components.get("cube_visual").unwrap().handle).unwrap();
    assert_eq!(cube.material.base_color, Vec4::new(1.0, 0.0, 0.0, 1.0));

    let ball = scene.object(components.get("ball0").unwrap().handle).unwrap();
    assert_eq!(ball.material.base_color, Vec4::new(0.0, 0.0, 1.0, 1.0));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_texture_loading_disabled() {
    let dir = scratch_dir("no_textures");
    let path = write_scene(&dir);

    let mut scene = VisualScene::new().without_texture_loading();
    let components = load_mjcf(&path, ParserConfig::default(), &mut scene).unwrap();

    let bin = scene.object(components.get("bin10").unwrap().handle).unwrap();
    assert!(!bin.material.has_texture());
    assert_eq!(
        bin.material.texture_path,
        Some(dir.join("textures").join("table.png"))
    );
    assert!(scene.texture_cache().is_empty());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_sync_dynamic_moves_only_dynamic_objects() {
    let dir = scratch_dir("sync");
    let path = write_scene(&dir);

    let mut scene = VisualScene::new().without_texture_loading();
    let components = load_mjcf(&path, ParserConfig::default(), &mut scene).unwrap();

    let lifted = Vec3::new(0.2, 0.1, 1.5);
    let turned = WxyzQuat::new(0.0, 0.0, 0.0, 1.0);
    let mut queried = Vec::new();

    let moved = scene
        .sync_dynamic(&components, |component| {
            queried.push(component.name.clone());
            (component.name == "cube_visual").then_some((lifted, turned))
        })
        .unwrap();

    assert_eq!(moved, 1);
    assert_eq!(queried, vec!["cube_visual".to_string(), "ball0".to_string()]);

    let cube = scene.object(components.get("cube_visual").unwrap().handle).unwrap();
    assert_eq!(cube.transform.translation, lifted);
    assert_eq!(cube.transform.orientation(), turned);

    // static bin untouched
    let bin = scene.object(components.get("bin10").unwrap().handle).unwrap();
    assert!((bin.transform.translation - Vec3::new(0.0, 0.0, 0.5)).length() < 1e-6);

    assert!(scene
        .set_pose(ObjectHandle(99), Vec3::ZERO, WxyzQuat::IDENTITY)
        .is_err());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_component_table_serializes_handles() {
    let dir = scratch_dir("json");
    let path = write_scene(&dir);

    let mut scene = VisualScene::new().without_texture_loading();
    let components = load_mjcf(&path, ParserConfig::default(), &mut scene).unwrap();

    let json = serde_json::to_value(&components).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1]["name"], "cube_visual");
    assert_eq!(entries[1]["dynamic"], true);
    assert_eq!(entries[1]["handle"], 1);

    let _ = fs::remove_dir_all(&dir);
}
