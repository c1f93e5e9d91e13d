//! Defensive defaulting of biome values.
//!
//! Generated biomes occasionally carry zero frequencies, negative roughness or
//! NaNs. Each is replaced by the nearest usable value and logged once, never
//! raised as an error.

use crate::params::{BiomeParameters, ObjectDefinition, TerrainLayer, WeatherParams};

/// Smallest noise frequency a layer may use.
pub const MIN_NOISE_SCALE: f64 = 1e-4;

impl TerrainLayer {
    /// Returns a copy that is safe to sample.
    ///
    /// * `noise_scale`: negative values are mirrored, zero/NaN become
    ///   [`MIN_NOISE_SCALE`]
    /// * `roughness`: negative or NaN becomes 0
    /// * `height_scale`, offsets: non-finite become 0
    pub fn sanitized(&self) -> TerrainLayer {
        let mut layer = self.clone();

        let scale = if layer.noise_scale.is_finite() {
            layer.noise_scale.abs()
        } else {
            0.0
        };
        let scale = scale.max(MIN_NOISE_SCALE);
        if scale != layer.noise_scale {
            tracing::warn!(layer = %layer.name, from = layer.noise_scale, to = scale, "clamped noiseScale");
            layer.noise_scale = scale;
        }

        if !(layer.roughness.is_finite() && layer.roughness >= 0.0) {
            tracing::warn!(layer = %layer.name, from = layer.roughness, "negative roughness treated as 0");
            layer.roughness = 0.0;
        }

        if !layer.height_scale.is_finite() {
            tracing::warn!(layer = %layer.name, "non-finite heightScale treated as 0");
            layer.height_scale = 0.0;
        }
        if !layer.offset_x.is_finite() {
            layer.offset_x = 0.0;
        }
        if !layer.offset_z.is_finite() {
            layer.offset_z = 0.0;
        }

        layer
    }
}

impl ObjectDefinition {
    /// Returns a copy with `density` in `[0, 1]` and a positive `base_scale`.
    pub fn sanitized(&self) -> ObjectDefinition {
        let mut def = self.clone();
        let density = if def.density.is_nan() {
            0.0
        } else {
            def.density.clamp(0.0, 1.0)
        };
        if density != def.density {
            tracing::warn!(id = %def.id, from = def.density, to = density, "clamped density");
            def.density = density;
        }
        if !(def.base_scale.is_finite() && def.base_scale > 0.0) {
            tracing::warn!(id = %def.id, from = def.base_scale, "invalid baseScale treated as 1");
            def.base_scale = 1.0;
        }
        def
    }
}

impl WeatherParams {
    /// Returns a copy with intensity in `[0, 1]` and a non-negative speed.
    pub fn sanitized(&self) -> WeatherParams {
        let mut weather = self.clone();
        weather.intensity = if weather.intensity.is_nan() {
            0.0
        } else {
            weather.intensity.clamp(0.0, 1.0)
        };
        weather.speed = if weather.speed.is_finite() {
            weather.speed.max(0.0)
        } else {
            1.0
        };
        weather
    }
}

impl BiomeParameters {
    /// Returns a copy in which every value the core consumes is usable.
    ///
    /// An empty layer list is kept as-is: it selects the fallback terrain.
    pub fn sanitized(&self) -> BiomeParameters {
        let mut biome = self.clone();

        if !biome.temperature.is_finite() {
            tracing::warn!(biome = %biome.name, "non-finite temperature treated as 20 C");
            biome.temperature = 20.0;
        }
        if !(biome.gravity.is_finite() && biome.gravity > 0.0) {
            tracing::warn!(biome = %biome.name, from = biome.gravity, "invalid gravity treated as 1 g");
            biome.gravity = 1.0;
        }
        if !biome.terrain.water_level.is_finite() {
            tracing::warn!(biome = %biome.name, "non-finite waterLevel treated as 0");
            biome.terrain.water_level = 0.0;
        }

        biome.terrain.layers = biome.terrain.layers.iter().map(TerrainLayer::sanitized).collect();
        biome.flora = biome.flora.iter().map(ObjectDefinition::sanitized).collect();
        biome.props = biome.props.iter().map(ObjectDefinition::sanitized).collect();
        biome.weather = biome.weather.sanitized();
        biome
    }
}
