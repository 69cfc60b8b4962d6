//! Command-line argument parsing for Lumen scene builds.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;
use crate::mode::{DeviceType, RenderMode};

/// Lumen command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "lumen", about = "Lumen path-tracer bridge")]
pub struct CliArgs {
    /// Output width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Output height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Samples per pixel.
    #[arg(long)]
    pub samples: Option<u32>,

    /// Render mode.
    #[arg(long, value_enum)]
    pub mode: Option<RenderMode>,

    /// Render device.
    #[arg(long, value_enum)]
    pub device: Option<DeviceType>,

    /// Sky image override.
    #[arg(long)]
    pub sky: Option<String>,

    /// Sky strength.
    #[arg(long)]
    pub sky_strength: Option<f32>,

    /// Emission strength.
    #[arg(long)]
    pub emission_strength: Option<f32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.render.width = w;
        }
        if let Some(h) = args.height {
            self.render.height = h;
        }
        if let Some(samples) = args.samples {
            self.render.samples = Some(samples);
        }
        if let Some(mode) = args.mode {
            self.render.render_mode = mode;
        }
        if let Some(device) = args.device {
            self.render.device = device;
        }
        if let Some(ref sky) = args.sky {
            self.sky.override_path = Some(sky.clone());
        }
        if let Some(strength) = args.sky_strength {
            self.sky.strength = strength;
        }
        if let Some(strength) = args.emission_strength {
            self.lighting.emission_strength = strength;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
