//! Deterministic per-chunk placement of flora and props.
//!
//! Every candidate is derived from `(biome name, definition index, chunk
//! coordinate, candidate index)` alone, so revisiting a chunk reproduces the
//! exact same objects without storing anything. Chunks share no RNG state,
//! which lets them be scattered on any thread in any order.

mod hash;
mod morphology;

use std::f64::consts::TAU;

use glam::DVec3;
use xeno_biome::{BiomeParameters, ObjectDefinition};
use xeno_chunks::ChunkCoord;

use crate::height::HeightModel;

pub use hash::{hash_name, seeded_random};
pub use morphology::{
    CLASS_GATE, COLD_THRESHOLD, HOT_THRESHOLD, Morphology, MorphologyClass, classify,
};

/// Candidates per chunk for a definition of density 1.
pub const CANDIDATES_PER_UNIT_DENSITY: f64 = 20.0;
/// Seed stride between definitions of one list.
const DEFINITION_STRIDE: i64 = 1000;
/// Offset of the second position draw.
const SECOND_DRAW_OFFSET: i64 = 100;
/// Offset of the morphology draw.
const MORPHOLOGY_DRAW_OFFSET: i64 = 200;
/// Offset of the yaw draw.
const YAW_DRAW_OFFSET: i64 = 300;
/// Flora stands at least this far above the water plane.
const FLORA_WATER_MARGIN: f64 = 1.0;

/// Which definition list an object came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectCategory {
    Flora,
    Prop,
}

/// Points at the definition an object was scattered from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DefinitionRef {
    pub category: ObjectCategory,
    /// Index into `biome.flora` or `biome.props`.
    pub index: usize,
}

impl DefinitionRef {
    /// Resolves the reference against the biome it was scattered from.
    pub fn resolve<'a>(&self, biome: &'a BiomeParameters) -> Option<&'a ObjectDefinition> {
        match self.category {
            ObjectCategory::Flora => biome.flora.get(self.index),
            ObjectCategory::Prop => biome.props.get(self.index),
        }
    }
}

/// One placed object, in chunk-local coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct ScatteredObject {
    pub definition: DefinitionRef,
    /// Offset from the chunk centre; `y` is the absolute terrain height.
    pub local_position: DVec3,
    /// Upward surface normal at the placement point.
    pub normal: DVec3,
    /// Candidate seed. Renderers derive further per-instance variation from it.
    pub seed: i64,
    /// Final scale; uniform `base_scale` for props.
    pub scale: DVec3,
    /// Shape and tint modifiers. Only flora carries them.
    pub morphology: Option<Morphology>,
}

impl ScatteredObject {
    /// Rotation about +Y in radians, in `[0, 2π)`.
    pub fn yaw(&self) -> f64 {
        seeded_random(self.seed.wrapping_add(YAW_DRAW_OFFSET)) * TAU
    }

    /// World-space position given the chunk the object belongs to.
    pub fn world_position(&self, coord: ChunkCoord, chunk_size: f64) -> DVec3 {
        let (ox, oz) = coord.origin(chunk_size);
        self.local_position + DVec3::new(ox, 0.0, oz)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterConfig {
    /// Edge length of a chunk in world units.
    pub chunk_size: f64,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self { chunk_size: 100.0 }
    }
}

/// Places the biome's flora and props on chunks.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScatterEngine {
    config: ScatterConfig,
}

impl ScatterEngine {
    pub fn new(config: ScatterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScatterConfig {
        &self.config
    }

    /// All flora followed by all props of one chunk.
    pub fn scatter_chunk(
        &self,
        biome: &BiomeParameters,
        coord: ChunkCoord,
        model: &HeightModel,
    ) -> Vec<ScatteredObject> {
        let mut objects = self.scatter_flora(biome, coord, model);
        objects.extend(self.scatter_props(biome, coord, model));
        tracing::trace!(chunk = %coord, count = objects.len(), "scattered chunk");
        objects
    }

    /// Flora of one chunk. Candidates below `water_level - 1` are dropped;
    /// a candidate exactly at `water_level - 1` is kept.
    pub fn scatter_flora(
        &self,
        biome: &BiomeParameters,
        coord: ChunkCoord,
        model: &HeightModel,
    ) -> Vec<ScatteredObject> {
        let mut out = Vec::new();
        self.scatter_list(
            biome,
            ObjectCategory::Flora,
            hash_name(&biome.name),
            coord,
            model,
            &mut out,
        );
        out
    }

    /// Props of one chunk. Candidates at or below `water_level` are dropped.
    ///
    /// Props hash `"<name>:props"` so that flora and prop definitions sharing
    /// an index do not land on the same spots.
    pub fn scatter_props(
        &self,
        biome: &BiomeParameters,
        coord: ChunkCoord,
        model: &HeightModel,
    ) -> Vec<ScatteredObject> {
        let mut out = Vec::new();
        let key = format!("{}:props", biome.name);
        self.scatter_list(biome, ObjectCategory::Prop, hash_name(&key), coord, model, &mut out);
        out
    }

    fn scatter_list(
        &self,
        biome: &BiomeParameters,
        category: ObjectCategory,
        name_hash: i64,
        coord: ChunkCoord,
        model: &HeightModel,
        out: &mut Vec<ScatteredObject>,
    ) {
        let defs = match category {
            ObjectCategory::Flora => &biome.flora,
            ObjectCategory::Prop => &biome.props,
        };
        let size = self.config.chunk_size;
        let (origin_x, origin_z) = coord.origin(size);
        let water = biome.terrain.water_level;
        let temp_norm = biome.temperature_norm();

        for (index, def) in defs.iter().enumerate() {
            let seed0 = name_hash
                .wrapping_add((index as i64).wrapping_mul(DEFINITION_STRIDE))
                .wrapping_add(coord.x.wrapping_mul(31))
                .wrapping_add(coord.z.wrapping_mul(17));

            for k in 0..candidate_count(def.density) {
                let seed = seed0.wrapping_add(k as i64);
                let lx = (seeded_random(seed) - 0.5) * size;
                let lz = (seeded_random(seed.wrapping_add(SECOND_DRAW_OFFSET)) - 0.5) * size;
                let (wx, wz) = (origin_x + lx, origin_z + lz);

                let h = model.height(wx, wz);
                let submerged = match category {
                    ObjectCategory::Flora => h < water - FLORA_WATER_MARGIN,
                    ObjectCategory::Prop => h <= water,
                };
                if submerged {
                    continue;
                }

                let (scale, morphology) = match category {
                    ObjectCategory::Flora => {
                        let draw = seeded_random(seed.wrapping_add(MORPHOLOGY_DRAW_OFFSET));
                        let m = Morphology::derive(
                            classify(temp_norm, draw),
                            biome.gravity,
                            def.density,
                            def.base_scale,
                        );
                        (m.scale, Some(m))
                    }
                    ObjectCategory::Prop => (DVec3::splat(def.base_scale), None),
                };

                out.push(ScatteredObject {
                    definition: DefinitionRef { category, index },
                    local_position: DVec3::new(lx, h, lz),
                    normal: model.normal(wx, wz),
                    seed,
                    scale,
                    morphology,
                });
            }
        }
    }
}

/// `floor(density * 20)`, with NaN and negative densities yielding nothing.
pub fn candidate_count(density: f64) -> usize {
    if density.is_nan() {
        return 0;
    }
    (density.clamp(0.0, 1.0) * CANDIDATES_PER_UNIT_DENSITY).floor() as usize
}
