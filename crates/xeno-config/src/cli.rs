//! Command-line argument parsing for the Xenoscape host.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Ticks run when `--ticks` is not given.
pub const DEFAULT_TICKS: u32 = 600;

/// Xenoscape command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "xenoscape", about = "Headless alien terrain streaming core")]
pub struct CliArgs {
    /// Chunk edge length in world units.
    #[arg(long)]
    pub chunk_size: Option<f64>,

    /// Render distance in chunks.
    #[arg(long)]
    pub render_distance: Option<u32>,

    /// Number of weather particles.
    #[arg(long)]
    pub particles: Option<u32>,

    /// Biome description file (.ron or .json).
    #[arg(long)]
    pub biome: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of simulation ticks to run before exiting.
    #[arg(long, default_value_t = DEFAULT_TICKS)]
    pub ticks: u32,
}

impl Default for CliArgs {
    /// The arguments of a bare invocation: no overrides, [`DEFAULT_TICKS`] ticks.
    fn default() -> Self {
        Self {
            chunk_size: None,
            render_distance: None,
            particles: None,
            biome: None,
            log_level: None,
            config: None,
            ticks: DEFAULT_TICKS,
        }
    }
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(size) = args.chunk_size {
            self.world.chunk_size = size;
        }
        if let Some(rd) = args.render_distance {
            self.world.render_distance = rd;
        }
        if let Some(count) = args.particles {
            self.weather.particle_count = count;
        }
        if let Some(ref path) = args.biome {
            self.biome.path = Some(path.clone());
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
