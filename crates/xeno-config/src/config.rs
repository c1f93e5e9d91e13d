//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Largest render distance accepted by [`Config::validate`]. A radius of 16
/// already means a 33x33 window of chunks.
const MAX_RENDER_DISTANCE: u32 = 16;

/// Largest weather cube edge accepted by [`Config::validate`].
const MAX_WEATHER_CUBE_SIZE: f32 = 1.0e6;

/// Top-level configuration for the terrain explorer core.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Chunk streaming and height sampling.
    pub world: WorldConfig,
    /// Ambient particle weather.
    pub weather: WeatherConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
    /// Where the biome description comes from.
    pub biome: BiomeSourceConfig,
}

/// Chunk streaming configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Edge length of one square terrain chunk, in world units.
    pub chunk_size: f64,
    /// Radius of the active window in chunks (2 gives a 5x5 window).
    pub render_distance: u32,
    /// Central-difference step used for surface normals, in world units.
    pub normal_step: f64,
    /// Maximum number of newly entered chunks built per tick.
    pub builds_per_tick: u32,
    /// Scatter worker threads. 0 picks a count from the CPU core count.
    pub scatter_threads: u32,
}

/// Weather particle field configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeatherConfig {
    /// Number of simulated particles.
    pub particle_count: u32,
    /// Edge length of the cube of particles that follows the observer.
    pub cube_size: f32,
    /// Intensity change per second while easing in or out.
    pub easing_rate: f32,
    /// Seconds of active weather per schedule cycle.
    pub on_seconds: f32,
    /// Seconds of clear sky per schedule cycle.
    pub off_seconds: f32,
    /// Seed for the initial particle layout.
    pub seed: u64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Log every chunk entering or leaving the active window.
    pub log_chunk_transitions: bool,
}

/// Source of the biome description consumed by the core.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BiomeSourceConfig {
    /// Path to a `.ron` or `.json` biome description. `None` uses the
    /// built-in sample biome.
    pub path: Option<PathBuf>,
}

// --- Default implementations ---

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size: 100.0,
            render_distance: 2,
            normal_step: 0.25,
            builds_per_tick: 4,
            scatter_threads: 0,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            particle_count: 10_000,
            cube_size: 100.0,
            easing_rate: 0.5,
            on_seconds: 60.0,
            off_seconds: 90.0,
            seed: 7,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_chunk_transitions: false,
        }
    }
}

/// Default per-user config directory (`<config_dir>/xenoscape`), falling
/// back to the working directory when the platform has none.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("xenoscape"))
        .unwrap_or_else(|| PathBuf::from("."))
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized)
            .map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let contents = std::fs::read_to_string(config_dir.join(CONFIG_FILE))
            .map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Reject values the streaming loop cannot work with.
    ///
    /// Biome values are never validated here; the terrain core defaults
    /// those itself.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.world.chunk_size.is_finite() && self.world.chunk_size > 0.0) {
            return Err(ConfigError::Invalid {
                field: "world.chunk_size",
                reason: format!("must be a positive number, got {}", self.world.chunk_size),
            });
        }
        if self.world.render_distance > MAX_RENDER_DISTANCE {
            return Err(ConfigError::Invalid {
                field: "world.render_distance",
                reason: format!(
                    "must be at most {MAX_RENDER_DISTANCE}, got {}",
                    self.world.render_distance
                ),
            });
        }
        if !(self.weather.cube_size > 0.0 && self.weather.cube_size <= MAX_WEATHER_CUBE_SIZE) {
            return Err(ConfigError::Invalid {
                field: "weather.cube_size",
                reason: format!(
                    "must be in (0, {MAX_WEATHER_CUBE_SIZE}], got {}",
                    self.weather.cube_size
                ),
            });
        }
        if !(self.weather.easing_rate.is_finite() && self.weather.easing_rate >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "weather.easing_rate",
                reason: format!(
                    "must be a non-negative number, got {}",
                    self.weather.easing_rate
                ),
            });
        }
        Ok(())
    }
}
