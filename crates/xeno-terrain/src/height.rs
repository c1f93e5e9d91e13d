//! Layered fractal height model.
//!
//! Each terrain layer contributes `[n(f) + 0.5 * roughness * n(2f)] * heightScale`
//! where `n(f)` samples the shared noise field at the layer's offset position
//! scaled by frequency `f`. Layers are summed. A biome without layers falls
//! back to one octave at frequency 0.02 and amplitude 5 so the ground is
//! never flat.

use std::sync::Arc;

use glam::DVec3;
use xeno_biome::{TerrainLayer, TerrainParams};

use crate::noise_field::NoiseField;

/// Frequency of the empty-layer fallback.
pub const FALLBACK_NOISE_SCALE: f64 = 0.02;
/// Amplitude of the empty-layer fallback.
pub const FALLBACK_HEIGHT_SCALE: f64 = 5.0;
/// Default central-difference step for normals, in world units.
pub const DEFAULT_NORMAL_STEP: f64 = 0.25;

const MIN_NORMAL_STEP: f64 = 0.2;
const MAX_NORMAL_STEP: f64 = 0.5;

/// Height and surface normal of a biome at any world `(x, z)`.
///
/// Stateless after construction and `Send + Sync`, so one instance serves
/// every chunk and worker thread of a biome.
#[derive(Clone, Debug)]
pub struct HeightModel {
    noise: Arc<NoiseField>,
    layers: Vec<TerrainLayer>,
    normal_step: f64,
}

impl HeightModel {
    /// Builds a model from terrain layers and a shared noise field.
    ///
    /// Layers are sanitised first: zero frequencies are clamped away from 0
    /// and negative roughness becomes 0.
    pub fn build(layers: &[TerrainLayer], noise: Arc<NoiseField>) -> Self {
        let layers: Vec<TerrainLayer> = layers.iter().map(TerrainLayer::sanitized).collect();
        if layers.is_empty() {
            tracing::debug!(seed = noise.seed(), "no terrain layers, using fallback octave");
        }
        Self {
            noise,
            layers,
            normal_step: DEFAULT_NORMAL_STEP,
        }
    }

    /// Builds the noise field from `terrain.seed` and the model on top of it.
    pub fn for_terrain(terrain: &TerrainParams) -> Self {
        Self::build(&terrain.layers, Arc::new(NoiseField::new(terrain.seed)))
    }

    /// Sets the normal step, clamped to `[0.2, 0.5]`. NaN keeps the default.
    pub fn with_normal_step(mut self, step: f64) -> Self {
        self.normal_step = if step.is_nan() {
            DEFAULT_NORMAL_STEP
        } else {
            step.clamp(MIN_NORMAL_STEP, MAX_NORMAL_STEP)
        };
        self
    }

    pub fn normal_step(&self) -> f64 {
        self.normal_step
    }

    pub fn noise(&self) -> &Arc<NoiseField> {
        &self.noise
    }

    pub fn layers(&self) -> &[TerrainLayer] {
        &self.layers
    }

    /// Returns `true` if the model uses the empty-layer fallback.
    pub fn is_fallback(&self) -> bool {
        self.layers.is_empty()
    }

    /// Terrain height at world `(x, z)`.
    pub fn height(&self, x: f64, z: f64) -> f64 {
        if self.layers.is_empty() {
            return self.noise.sample(x * FALLBACK_NOISE_SCALE, z * FALLBACK_NOISE_SCALE)
                * FALLBACK_HEIGHT_SCALE;
        }

        self.layers
            .iter()
            .map(|layer| {
                let f = layer.noise_scale;
                let px = x + layer.offset_x;
                let pz = z + layer.offset_z;
                let mut n = self.noise.sample(px * f, pz * f);
                if layer.roughness > 0.0 {
                    n += 0.5 * layer.roughness * self.noise.sample(px * 2.0 * f, pz * 2.0 * f);
                }
                n * layer.height_scale
            })
            .sum()
    }

    /// Upward unit normal at `(x, z)` using the configured step.
    pub fn normal(&self, x: f64, z: f64) -> DVec3 {
        self.normal_with_step(x, z, self.normal_step)
    }

    /// Upward unit normal from a four-point central difference with `step`.
    ///
    /// The result always has a positive Y component and leans away from
    /// rising ground: on a surface that climbs towards +X it points towards -X.
    /// Non-positive or NaN steps use [`DEFAULT_NORMAL_STEP`].
    pub fn normal_with_step(&self, x: f64, z: f64, step: f64) -> DVec3 {
        let s = if step > 0.0 { step } else { DEFAULT_NORMAL_STEP };
        let h_l = self.height(x - s, z);
        let h_r = self.height(x + s, z);
        let h_d = self.height(x, z - s);
        let h_u = self.height(x, z + s);

        let tangent_x = DVec3::new(2.0 * s, h_r - h_l, 0.0);
        let tangent_z = DVec3::new(0.0, h_u - h_d, 2.0 * s);
        tangent_z.cross(tangent_x).try_normalize().unwrap_or(DVec3::Y)
    }

    /// Angle between the surface normal and +Y, in radians.
    pub fn slope(&self, x: f64, z: f64) -> f64 {
        self.normal(x, z).y.clamp(-1.0, 1.0).acos()
    }
}
