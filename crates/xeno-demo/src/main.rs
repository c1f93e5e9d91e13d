//! Headless host for the terrain core: streams chunks around a walking
//! observer, scatters flora and props on worker threads, and runs weather.

mod explorer;

use clap::Parser;
use xeno_biome::BiomeParameters;
use xeno_config::{CliArgs, Config, default_config_dir};

use crate::explorer::Explorer;

/// Simulation step of the headless loop (60 Hz).
const TICK_SECONDS: f64 = 1.0 / 60.0;

fn main() {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(2);
    }

    let log_dir = config_dir.join("logs");
    xeno_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let biome = load_biome(&config).sanitized();
    tracing::info!(
        name = %biome.name,
        seed = biome.terrain.seed,
        layers = biome.terrain.layers.len(),
        flora = biome.flora.len(),
        props = biome.props.len(),
        weather = ?biome.weather.kind,
        "biome ready"
    );

    let mut explorer = match Explorer::new(&config, biome) {
        Ok(explorer) => explorer,
        Err(e) => {
            tracing::error!(error = %e, "failed to start scatter workers");
            std::process::exit(1);
        }
    };

    for tick in 0..args.ticks {
        let t = tick as f64 * TICK_SECONDS;
        let (x, z) = walk_path(t);
        explorer.tick(TICK_SECONDS, x, z);
    }

    let stats = explorer.stats();
    tracing::info!(
        ticks = stats.ticks,
        chunks_built = stats.chunks_built,
        chunks_evicted = stats.chunks_evicted,
        objects = stats.objects_placed,
        window_moves = stats.window_moves,
        "exploration finished"
    );
}

/// Loads the configured biome description, or the built-in sample.
///
/// A description that fails to load is logged and replaced by the sample;
/// streaming never stops because of a broken biome.
fn load_biome(config: &Config) -> BiomeParameters {
    let Some(path) = config.biome.path.as_deref() else {
        tracing::info!("no biome configured, using built-in sample");
        return BiomeParameters::sample();
    };
    BiomeParameters::load(path).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to load biome, using built-in sample");
        BiomeParameters::sample()
    })
}

/// Observer path: a slow drift along +X with a sideways meander.
fn walk_path(t: f64) -> (f64, f64) {
    const WALK_SPEED: f64 = 40.0;
    (t * WALK_SPEED, (t * 0.2).sin() * 150.0)
}
