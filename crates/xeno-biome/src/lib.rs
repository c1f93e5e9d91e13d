//! Biome description consumed read-only by the terrain core.
//!
//! A biome is produced by an external generation service (usually as JSON)
//! and arrives here as plain data. [`BiomeParameters::sanitized`] turns any
//! malformed values into safe defaults so a broken biome never stops chunk
//! streaming.

mod error;
mod params;
mod sanitize;

pub use error::BiomeError;
pub use params::{
    AtmosphereDensity, BiomeParameters, ObjectDefinition, TerrainLayer, TerrainParams,
    WeatherKind, WeatherParams, parse_hex_color,
};
pub use sanitize::MIN_NOISE_SCALE;
