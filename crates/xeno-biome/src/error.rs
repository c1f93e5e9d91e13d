use std::path::PathBuf;

/// Errors raised while reading a biome description.
///
/// Only loading can fail. Once parsed, out-of-range values are corrected by
/// [`BiomeParameters::sanitized`](crate::BiomeParameters::sanitized) instead.
#[derive(Debug, thiserror::Error)]
pub enum BiomeError {
    /// The biome file could not be read.
    #[error("failed to read biome {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// RON content did not match the biome schema.
    #[error("failed to parse biome RON: {0}")]
    ParseRon(#[source] ron::error::SpannedError),

    /// JSON content did not match the biome schema.
    #[error("failed to parse biome JSON: {0}")]
    ParseJson(#[source] serde_json::Error),
}
