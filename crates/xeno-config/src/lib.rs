//! Configuration system for the Xenoscape terrain core.
//!
//! Provides runtime-configurable settings that persist to disk as RON files.
//! Supports CLI overrides via clap, hot-reload detection, and forward/backward
//! compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::{CliArgs, DEFAULT_TICKS};
pub use config::{
    BiomeSourceConfig, Config, DebugConfig, WeatherConfig, WorldConfig, default_config_dir,
};
pub use error::ConfigError;
