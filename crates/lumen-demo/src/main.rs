//! Demo binary that builds a small synthetic host world, bridges it into a
//! Lumen scene and renders it with a rasterizing preview backend.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p lumen-demo` to write `renders/preview.png` and
//! `renders/ao_bake.png` into the config directory.
//! Run with `cargo run -p lumen-demo -- --width 640 --height 360` to override size.

mod preview;
mod sample;

use std::path::{Path, PathBuf};

use clap::Parser;
use glam::{Quat, Vec3};
use lumen_config::{CliArgs, Config, default_config_dir};
use lumen_host::{DirectoryFs, ImageData, TextureLibrary};
use lumen_scene::{AoBakeOptions, HostServices, RenderJob, SceneView};
use lumen_texture::{DdsProbe, ImageFileWriter};
use tracing::{error, info, warn};

use preview::PreviewRenderer;

/// Container the demo converts host textures into.
const DEMO_CONTAINER: &str = "png";

fn main() {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args
        .config
        .clone()
        .or_else(default_config_dir)
        .unwrap_or_else(|| PathBuf::from("lumen"));

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    // Initialize logging with config and debug settings
    let log_dir = config_dir.join("logs");
    lumen_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));
    force_demo_container(&mut config);

    let asset_root = config_dir.join("assets");
    let fs = DirectoryFs::new([asset_root.clone()]);
    let textures = TextureLibrary::new();
    let writer = ImageFileWriter::new(&asset_root, DEMO_CONTAINER);
    let services = HostServices {
        fs: &fs,
        textures: &textures,
        writer: &writer,
        probe: &DdsProbe,
    };
    let render_dir = config_dir.join("renders");

    demonstrate_render_image(&config, services, &render_dir);
    // Edits to config.ron made while the preview rendered apply to the bake.
    if let Some(fresh) = refreshed_config(&config, &config_dir, &args) {
        config = fresh;
    }
    demonstrate_ao_bake(&config, services, &render_dir);
}

/// The image crate cannot encode DDS, so converted textures go to PNG.
fn force_demo_container(config: &mut Config) {
    if config.textures.container_extension != DEMO_CONTAINER {
        info!(
            "Converting textures to .{DEMO_CONTAINER} instead of .{}",
            config.textures.container_extension
        );
        config.textures.container_extension = DEMO_CONTAINER.to_string();
    }
}

/// Re-reads `config.ron`, keeping CLI overrides on top. `None` when nothing
/// changed or the file cannot be read.
fn refreshed_config(config: &Config, config_dir: &Path, args: &CliArgs) -> Option<Config> {
    let on_disk = match config.reload(config_dir) {
        Ok(on_disk) => on_disk?,
        Err(e) => {
            warn!("Keeping current config: {e}");
            return None;
        }
    };
    let mut fresh = on_disk;
    fresh.apply_cli_overrides(args);
    force_demo_container(&mut fresh);
    (fresh != *config).then_some(fresh)
}

/// Renders the sample world from a camera looking down -Z.
fn demonstrate_render_image(config: &Config, services: HostServices<'_>, render_dir: &Path) {
    let world = sample::world();
    let aspect = config.render.width as f32 / config.render.height.max(1) as f32;
    let view = SceneView::new(Vec3::new(0.0, 1.5, 4.0), Quat::IDENTITY, 60.0, aspect, 0.1, 200.0);

    match lumen_scene::render_image(config, services, &world, &view, None, PreviewRenderer) {
        Ok(job) => finish(job, &render_dir.join("preview.png")),
        Err(e) => error!("Failed to start render job: {e}"),
    }
}

/// Bakes ambient occlusion for the first material of the sample crate.
fn demonstrate_ao_bake(config: &Config, services: HostServices<'_>, render_dir: &Path) {
    let model = sample::crate_model();
    let options = AoBakeOptions {
        width: 256,
        height: 256,
        ..AoBakeOptions::default()
    };
    match lumen_scene::bake_ambient_occlusion(config, services, &model, 0, options, PreviewRenderer)
    {
        Ok(job) => finish(job, &render_dir.join("ao_bake.png")),
        Err(e) => error!("Failed to start bake job: {e}"),
    }
}

fn finish(job: RenderJob, path: &Path) {
    match job.wait() {
        Ok(output) => match save_png(&output.image, path) {
            Ok(()) => info!(
                "Wrote {}x{} image to {}",
                output.image.width,
                output.image.height,
                path.display()
            ),
            Err(e) => warn!("Failed to save {}: {e}", path.display()),
        },
        Err(e) => error!("Render job failed: {e}"),
    }
}

fn save_png(image: &ImageData, path: &Path) -> image::ImageResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut out = image::RgbaImage::new(image.width, image.height);
    for (dst, src) in out.pixels_mut().zip(&image.pixels) {
        dst.0 = src.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    }
    out.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_picks_up_edits_under_cli_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let args = CliArgs::parse_from(["lumen-demo", "--width", "640"]);
        let mut config = Config::load_or_create(dir.path()).unwrap();
        config.apply_cli_overrides(&args);
        force_demo_container(&mut config);
        assert!(refreshed_config(&config, dir.path(), &args).is_none());

        let mut edited = Config::default();
        edited.render.width = 2048;
        edited.render.samples = Some(64);
        edited.save(dir.path()).unwrap();

        let fresh = refreshed_config(&config, dir.path(), &args).unwrap();
        assert_eq!(fresh.render.width, 640);
        assert_eq!(fresh.render.samples, Some(64));
        assert_eq!(fresh.textures.container_extension, DEMO_CONTAINER);
    }

    #[test]
    fn test_refresh_keeps_config_when_file_is_gone() {
        let dir = tempfile::tempdir().unwrap();
        let args = CliArgs::parse_from(["lumen-demo"]);
        assert!(refreshed_config(&Config::default(), dir.path(), &args).is_none());
    }
}
