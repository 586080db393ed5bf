use std::path::{Path, PathBuf};

use clap::Parser;
use log::{error, info, warn};

use lumaray::{load_config, Error, Result, Scene, SceneConfig};

mod cli;
mod logger;
mod output;

use cli::Args;
use logger::init_logger;
use output::save_png;

/// Load the scene description, or the seeded demo scene when the file is absent.
///
/// Returns the configuration and the directory its relative paths start from.
fn load_scene_config(args: &Args) -> Result<(SceneConfig, PathBuf)> {
    match load_config(&args.config) {
        Ok(config) => {
            info!("Loaded scene {}", args.config.display());
            let base_dir = args.config.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
            Ok((config, base_dir))
        }
        Err(Error::Io { path, .. }) if !path.exists() => {
            warn!(
                "Scene file {} not found, rendering demo scene (seed {})",
                path.display(),
                args.seed
            );
            Ok((SceneConfig::demo(args.seed), PathBuf::from(".")))
        }
        Err(e) => Err(e),
    }
}

fn run(args: &Args) -> Result<()> {
    let (mut config, base_dir) = load_scene_config(args)?;

    // Command line overrides
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    config.render.parallel &= !args.sequential;
    config.render.cull &= !args.no_cull;
    config.render.progress &= !args.no_progress;

    let mut scene = Scene::from_config(&config, &base_dir)?;
    for file in &args.files {
        scene.add_model(file)?;
    }

    info!(
        "Image resolution: {}x{}, surfaces: {}",
        config.render.width,
        config.render.height,
        scene.surfaces().len()
    );
    let stats = scene.render_frame();
    info!(
        "{:.1} Mrays/s",
        stats.rays_cast as f64 / stats.elapsed.as_secs_f64().max(1e-9) / 1e6
    );

    save_png(&scene.to_image(), &args.output)
}

fn main() {
    let args = Args::parse();
    init_logger(args.debug_level.clone().into());

    // Log application startup with version information
    info!("LumaRay - Git Version {} ({})", env!("GIT_HASH"), env!("GIT_DATE"));

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
