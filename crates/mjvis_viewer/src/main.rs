// Inspect the visual components of an MJCF scene
// Run with: cargo run --bin mjvis_viewer -- <scene.xml> [--config <parser.json>] [--json]

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use mjvis_core::{load_mjcf, ParserConfig};
use mjvis_render::VisualScene;

#[derive(Debug, PartialEq)]
struct Args {
    scene: PathBuf,
    config: Option<PathBuf>,
    json: bool,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut scene = None;
    let mut config = None;
    let mut json = false;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--config" => {
                let path = iter.next().context("--config needs a file argument")?;
                config = Some(PathBuf::from(path));
            }
            flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
            path => {
                if scene.is_some() {
                    bail!("Only one scene file may be given");
                }
                scene = Some(PathBuf::from(path));
            }
        }
    }

    Ok(Args {
        scene: scene.context("Missing scene file")?,
        config,
        json,
    })
}

fn main() -> Result<()> {
    env_logger::init();

    let argv: Vec<String> = env::args().collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!(
                "Usage: {} <scene.xml> [--config <parser.json>] [--json]",
                argv.first().map(String::as_str).unwrap_or("mjvis_viewer")
            );
            std::process::exit(1);
        }
    };

    let config = match &args.config {
        Some(path) => ParserConfig::load(path)
            .with_context(|| format!("Failed to read parser config {}", path.display()))?,
        None => ParserConfig::default(),
    };

    let mut scene = VisualScene::new();
    let components = load_mjcf(&args.scene, config, &mut scene)
        .with_context(|| format!("Failed to parse {}", args.scene.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&components)?);
        return Ok(());
    }

    println!("Scene: {}", args.scene.display());
    println!(
        "Components: {} ({} dynamic, {} static)",
        components.len(),
        components.dynamic_components().count(),
        components.static_components().count()
    );
    println!(
        "Textures loaded: {} ({:.1} KB)",
        scene.texture_cache().len(),
        scene.texture_cache().memory_usage() as f32 / 1024.0
    );
    println!();

    for component in &components {
        let shape = scene
            .object(component.handle)
            .map(|object| object.shape.to_string())
            .unwrap_or_default();
        let p = component.position;
        let q = component.orientation;

        println!(
            "{:<28} {:<10} parent={:<20} {} pos=({:.3}, {:.3}, {:.3}) quat=({:.3}, {:.3}, {:.3}, {:.3})",
            component.name,
            shape,
            component.parent_body_name,
            if component.dynamic { "dynamic" } else { "static " },
            p.x,
            p.y,
            p.z,
            q.w(),
            q.x(),
            q.y(),
            q.z()
        );
    }

    log::info!("Inspected {} visual components", components.len());
    Ok(())
}
