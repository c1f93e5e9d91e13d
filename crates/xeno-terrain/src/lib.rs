//! Deterministic alien terrain: seeded gradient noise, the layered height
//! model, and per-chunk scatter of flora and props.

mod async_scatter;
mod height;
mod noise_field;

pub mod scatter;

pub use async_scatter::{AsyncScatter, ScatterContext, ScatteredChunk};
pub use height::{
    DEFAULT_NORMAL_STEP, FALLBACK_HEIGHT_SCALE, FALLBACK_NOISE_SCALE, HeightModel,
};
pub use noise_field::{Lcg, NoiseField};
pub use scatter::{
    DefinitionRef, Morphology, MorphologyClass, ObjectCategory, ScatterConfig, ScatterEngine,
    ScatteredObject, classify,
};
