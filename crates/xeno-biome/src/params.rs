//! Biome data model.
//!
//! Field names are camelCase on the wire, matching what the biome generation
//! service emits. Every struct is `#[serde(default)]` so partial descriptions
//! still load.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BiomeError;

/// Coarse atmosphere classification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AtmosphereDensity {
    None,
    Thin,
    #[default]
    Standard,
    Thick,
}

/// One fractal noise layer. Layers are summed; their order only matters for
/// readability of the description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TerrainLayer {
    pub name: String,
    /// Base sampling frequency. Must be positive.
    pub noise_scale: f64,
    /// Amplitude multiplier. Zero makes the layer contribute nothing.
    pub height_scale: f64,
    /// Weight of the double-frequency detail octave. Never negative.
    pub roughness: f64,
    pub offset_x: f64,
    pub offset_z: f64,
}

impl Default for TerrainLayer {
    fn default() -> Self {
        Self {
            name: String::new(),
            noise_scale: 0.02,
            height_scale: 5.0,
            roughness: 0.0,
            offset_x: 0.0,
            offset_z: 0.0,
        }
    }
}

/// Height-field inputs of a biome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TerrainParams {
    /// Seed of the shared noise field.
    pub seed: i64,
    /// Summed noise layers. Empty selects the single-octave fallback.
    pub layers: Vec<TerrainLayer>,
    /// Height of the water plane in world units.
    pub water_level: f64,
    /// Hex colour of low ground.
    pub base_color: String,
    /// Hex colour of high ground.
    pub high_color: String,
    /// Optional reference to a generated ground texture.
    pub ground_texture: Option<String>,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: 0,
            layers: Vec::new(),
            water_level: -2.0,
            base_color: "#5a4a3a".to_string(),
            high_color: "#c8b89a".to_string(),
            ground_texture: None,
        }
    }
}

/// A flora or prop archetype that can be scattered on a chunk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectDefinition {
    pub id: String,
    pub name: String,
    /// Key used by the external model/texture generator for this object.
    pub prompt: String,
    /// Placement density in `[0, 1]`; each 0.05 adds one candidate per chunk.
    pub density: f64,
    /// Uniform size multiplier before morphology is applied.
    pub base_scale: f64,
}

impl Default for ObjectDefinition {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            prompt: String::new(),
            density: 0.0,
            base_scale: 1.0,
        }
    }
}

/// Precipitation / particle weather type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherKind {
    #[default]
    None,
    Rain,
    Snow,
    Sandstorm,
    Spores,
}

/// Weather profile of a biome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeatherParams {
    #[serde(rename = "type")]
    pub kind: WeatherKind,
    /// Target intensity in `[0, 1]` while weather is active.
    pub intensity: f32,
    /// Hex colour of the particles.
    pub color: String,
    /// Motion speed multiplier.
    pub speed: f32,
}

impl Default for WeatherParams {
    fn default() -> Self {
        Self {
            kind: WeatherKind::None,
            intensity: 0.5,
            color: "#ffffff".to_string(),
            speed: 1.0,
        }
    }
}

/// A complete explorable world description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BiomeParameters {
    /// Display name; also keys the scatter hash.
    pub name: String,
    /// Surface temperature in degrees Celsius.
    pub temperature: f64,
    /// Surface gravity relative to Earth.
    pub gravity: f64,
    pub atmosphere: AtmosphereDensity,
    pub terrain: TerrainParams,
    pub flora: Vec<ObjectDefinition>,
    pub props: Vec<ObjectDefinition>,
    pub weather: WeatherParams,
}

impl Default for BiomeParameters {
    fn default() -> Self {
        Self {
            name: "Unnamed".to_string(),
            temperature: 20.0,
            gravity: 1.0,
            atmosphere: AtmosphereDensity::Standard,
            terrain: TerrainParams::default(),
            flora: Vec::new(),
            props: Vec::new(),
            weather: WeatherParams::default(),
        }
    }
}

/// Temperature (Celsius) mapped to 0.0 in [`BiomeParameters::temperature_norm`].
const TEMPERATURE_COLD: f64 = -50.0;
/// Temperature (Celsius) mapped to 1.0 in [`BiomeParameters::temperature_norm`].
const TEMPERATURE_HOT: f64 = 100.0;

impl BiomeParameters {
    /// Temperature normalised to `[0, 1]` over -50..100 °C.
    pub fn temperature_norm(&self) -> f64 {
        let t = (self.temperature - TEMPERATURE_COLD) / (TEMPERATURE_HOT - TEMPERATURE_COLD);
        if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) }
    }

    /// Parses a RON description.
    pub fn from_ron_str(s: &str) -> Result<Self, BiomeError> {
        ron::from_str(s).map_err(BiomeError::ParseRon)
    }

    /// Parses a JSON description, as returned by the generation service.
    pub fn from_json_str(s: &str) -> Result<Self, BiomeError> {
        serde_json::from_str(s).map_err(BiomeError::ParseJson)
    }

    /// Loads a description from disk. `.json` files are parsed as JSON,
    /// everything else as RON. The result is not sanitised.
    pub fn load(path: &Path) -> Result<Self, BiomeError> {
        let contents = std::fs::read_to_string(path).map_err(|source| BiomeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let biome = if is_json {
            Self::from_json_str(&contents)?
        } else {
            Self::from_ron_str(&contents)?
        };
        tracing::info!(name = %biome.name, path = %path.display(), "loaded biome");
        Ok(biome)
    }

    /// A small temperate-cold biome used when no description is supplied.
    pub fn sample() -> Self {
        Self {
            name: "Ashen Reach".to_string(),
            temperature: -12.0,
            gravity: 0.8,
            atmosphere: AtmosphereDensity::Thin,
            terrain: TerrainParams {
                seed: 1337,
                layers: vec![
                    TerrainLayer {
                        name: "continents".to_string(),
                        noise_scale: 0.004,
                        height_scale: 18.0,
                        roughness: 0.3,
                        offset_x: 0.0,
                        offset_z: 0.0,
                    },
                    TerrainLayer {
                        name: "ridges".to_string(),
                        noise_scale: 0.02,
                        height_scale: 4.0,
                        roughness: 0.8,
                        offset_x: 311.0,
                        offset_z: -97.0,
                    },
                ],
                water_level: -3.0,
                base_color: "#3d3a4f".to_string(),
                high_color: "#b7c4d8".to_string(),
                ground_texture: None,
            },
            flora: vec![
                ObjectDefinition {
                    id: "frost-spire".to_string(),
                    name: "Frost Spire".to_string(),
                    prompt: "translucent blue crystalline spire plant".to_string(),
                    density: 0.4,
                    base_scale: 1.2,
                },
                ObjectDefinition {
                    id: "lichen-cap".to_string(),
                    name: "Lichen Cap".to_string(),
                    prompt: "low violet lichen mushroom cluster".to_string(),
                    density: 0.25,
                    base_scale: 0.6,
                },
            ],
            props: vec![ObjectDefinition {
                id: "basalt-monolith".to_string(),
                name: "Basalt Monolith".to_string(),
                prompt: "weathered hexagonal basalt column".to_string(),
                density: 0.1,
                base_scale: 2.5,
            }],
            weather: WeatherParams {
                kind: WeatherKind::Snow,
                intensity: 0.7,
                color: "#e8f0ff".to_string(),
                speed: 1.0,
            },
        }
    }
}

/// Parses `#rrggbb` (leading `#` optional) into sRGB components in `[0, 1]`.
pub fn parse_hex_color(hex: &str) -> Option<[f32; 3]> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .ok()
            .map(|v| v as f32 / 255.0)
    };
    Some([channel(0)?, channel(2)?, channel(4)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICE_JSON: &str = r##"{
        "name": "Glass Dunes",
        "temperature": 85,
        "gravity": 1.4,
        "atmosphere": "thick",
        "terrain": {
            "seed": 99,
            "layers": [
                {"name": "dunes", "noiseScale": 0.01, "heightScale": 6, "roughness": 0.2, "offsetX": 10, "offsetZ": -4}
            ],
            "waterLevel": -10,
            "baseColor": "#aa8844",
            "highColor": "#ffeecc"
        },
        "flora": [{"id": "f1", "name": "Glass Reed", "prompt": "reed", "density": 0.3, "baseScale": 1}],
        "weather": {"type": "sandstorm", "intensity": 0.9, "color": "#d2b48c", "speed": 2.5}
    }"##;

    #[test]
    fn test_parse_service_json() {
        let biome = BiomeParameters::from_json_str(SERVICE_JSON).unwrap();
        assert_eq!(biome.name, "Glass Dunes");
        assert_eq!(biome.atmosphere, AtmosphereDensity::Thick);
        assert_eq!(biome.terrain.layers[0].offset_x, 10.0);
        assert_eq!(biome.weather.kind, WeatherKind::Sandstorm);
        assert!(biome.props.is_empty(), "missing list should default to empty");
        assert!(biome.terrain.ground_texture.is_none());
    }

    #[test]
    fn test_ron_roundtrip_of_sample() {
        let biome = BiomeParameters::sample();
        let text = ron::to_string(&biome).unwrap();
        assert_eq!(BiomeParameters::from_ron_str(&text).unwrap(), biome);
    }

    #[test]
    fn test_load_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("dunes.json");
        std::fs::write(&json_path, SERVICE_JSON).unwrap();
        assert_eq!(BiomeParameters::load(&json_path).unwrap().name, "Glass Dunes");

        let ron_path = dir.path().join("reach.ron");
        std::fs::write(&ron_path, ron::to_string(&BiomeParameters::sample()).unwrap()).unwrap();
        assert_eq!(BiomeParameters::load(&ron_path).unwrap().name, "Ashen Reach");
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let err = BiomeParameters::load(Path::new("/definitely/not/here.ron")).unwrap_err();
        assert!(matches!(err, BiomeError::Read { .. }));
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let err = BiomeParameters::from_json_str("{\"gravity\": \"heavy\"}").unwrap_err();
        assert!(matches!(err, BiomeError::ParseJson(_)));
    }

    #[test]
    fn test_temperature_norm_range() {
        let mut biome = BiomeParameters::default();
        biome.temperature = -50.0;
        assert_eq!(biome.temperature_norm(), 0.0);
        biome.temperature = 100.0;
        assert_eq!(biome.temperature_norm(), 1.0);
        biome.temperature = 25.0;
        assert!((biome.temperature_norm() - 0.5).abs() < 1e-12);
        biome.temperature = -400.0;
        assert_eq!(biome.temperature_norm(), 0.0);
        biome.temperature = f64::NAN;
        assert_eq!(biome.temperature_norm(), 0.5);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff0000"), Some([1.0, 0.0, 0.0]));
        assert_eq!(parse_hex_color("00ff00"), Some([0.0, 1.0, 0.0]));
        assert!(parse_hex_color("#fff").is_none());
        assert!(parse_hex_color("#gg0000").is_none());
    }
}
