//! Per-tick orchestration of the terrain core.
//!
//! Order within one tick: window update, scatter submission and result
//! collection, eviction, ground lookup, weather. Scatter always sees the
//! window of the current tick.

use std::sync::Arc;

use glam::Vec3;
use xeno_biome::BiomeParameters;
use xeno_chunks::{ChunkManager, ChunkManagerConfig, ChunkStore};
use xeno_config::Config;
use xeno_terrain::{
    AsyncScatter, HeightModel, ScatterConfig, ScatterContext, ScatterEngine, ScatteredObject,
};
use xeno_weather::{WeatherField, WeatherFieldConfig, WeatherSchedule};

/// Eye height of the walking observer above the ground.
pub const EYE_HEIGHT: f64 = 1.7;

/// Counters reported at the end of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExplorerStats {
    pub ticks: u64,
    pub window_moves: u64,
    pub chunks_built: u64,
    pub chunks_evicted: u64,
    pub objects_placed: u64,
}

/// Owns every per-biome component and advances them together.
pub struct Explorer {
    context: Arc<ScatterContext>,
    manager: ChunkManager,
    store: ChunkStore<Vec<ScatteredObject>>,
    pool: AsyncScatter,
    weather: WeatherField,
    schedule: WeatherSchedule,
    builds_per_tick: usize,
    observer: Vec3,
    stats: ExplorerStats,
}

impl Explorer {
    /// Builds the shared height model and starts the scatter workers.
    pub fn new(config: &Config, biome: BiomeParameters) -> std::io::Result<Self> {
        let world = &config.world;
        let model = HeightModel::for_terrain(&biome.terrain).with_normal_step(world.normal_step);

        let weather = WeatherField::new(
            &biome.weather,
            WeatherFieldConfig {
                particle_count: config.weather.particle_count as usize,
                cube_size: config.weather.cube_size,
                easing_rate: config.weather.easing_rate,
                seed: config.weather.seed,
            },
        );

        let context = Arc::new(ScatterContext {
            biome: Arc::new(biome),
            model: Arc::new(model),
            engine: ScatterEngine::new(ScatterConfig {
                chunk_size: world.chunk_size,
            }),
        });
        let pool = AsyncScatter::with_threads(Arc::clone(&context), world.scatter_threads as usize)?;

        let manager = ChunkManager::new(ChunkManagerConfig {
            chunk_size: world.chunk_size,
            render_distance: world.render_distance,
        })
        .with_transition_logging(config.debug.log_chunk_transitions);

        Ok(Self {
            context,
            manager,
            store: ChunkStore::new(),
            pool,
            weather,
            schedule: WeatherSchedule::new(config.weather.on_seconds, config.weather.off_seconds),
            builds_per_tick: world.builds_per_tick.max(1) as usize,
            observer: Vec3::ZERO,
            stats: ExplorerStats::default(),
        })
    }

    /// Advances the world by `dt` seconds with the observer at `(x, z)`.
    pub fn tick(&mut self, dt: f64, x: f64, z: f64) {
        self.stats.ticks += 1;
        self.manager.swap_events();

        let transition = self.manager.tick_transition(x, z);
        if !transition.is_unchanged() {
            self.stats.window_moves += 1;
            self.pool.cancel_inactive(&transition.active);
        }
        let active = transition.active;

        let mut submitted = 0;
        for coord in self.store.missing(&active) {
            if submitted == self.builds_per_tick {
                break;
            }
            if self.pool.is_pending(&coord) {
                continue;
            }
            if self.pool.submit(coord).is_err() {
                break;
            }
            submitted += 1;
        }

        for chunk in self.pool.drain_results() {
            let objects = chunk.objects.len() as u64;
            if self.store.insert_if_active(&active, chunk.coord, chunk.objects) {
                self.stats.chunks_built += 1;
                self.stats.objects_placed += objects;
                tracing::trace!(
                    chunk = %chunk.coord,
                    objects,
                    micros = chunk.generation_time_us,
                    "chunk scattered"
                );
            }
        }

        let evicted = self.store.evict_inactive(&active);
        self.stats.chunks_evicted += evicted.len() as u64;

        // Walking height comes straight from the height model.
        let ground = self.context.model.height(x, z);
        self.observer = Vec3::new(x as f32, (ground + EYE_HEIGHT) as f32, z as f32);

        let weather_active = self.schedule.tick(dt as f32);
        self.weather.step(dt as f32, self.observer, weather_active);
    }

    pub fn stats(&self) -> &ExplorerStats {
        &self.stats
    }

    pub fn observer(&self) -> Vec3 {
        self.observer
    }

    pub fn store(&self) -> &ChunkStore<Vec<ScatteredObject>> {
        &self.store
    }

    pub fn manager(&self) -> &ChunkManager {
        &self.manager
    }

    pub fn weather(&self) -> &WeatherField {
        &self.weather
    }

    pub fn model(&self) -> &HeightModel {
        &self.context.model
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    fn explorer() -> Explorer {
        let mut config = Config::default();
        config.weather.particle_count = 256;
        config.world.scatter_threads = 2;
        Explorer::new(&config, BiomeParameters::sample()).unwrap()
    }

    fn settle(explorer: &mut Explorer, x: f64, z: f64) {
        let deadline = Instant::now() + Duration::from_secs(30);
        loop {
            explorer.tick(1.0 / 60.0, x, z);
            let filled = explorer.store().len() == explorer.manager().active().len();
            if filled || Instant::now() > deadline {
                break;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_window_fills_under_build_budget() {
        let mut explorer = explorer();
        explorer.tick(1.0 / 60.0, 0.0, 0.0);
        assert!(explorer.store().len() <= 4, "budget caps first-tick builds");

        settle(&mut explorer, 0.0, 0.0);
        assert_eq!(explorer.store().len(), 25);
        assert_eq!(explorer.stats().chunks_built, 25);
    }

    #[test]
    fn test_store_content_matches_synchronous_scatter() {
        let mut explorer = explorer();
        settle(&mut explorer, 130.0, -260.0);
        let biome = BiomeParameters::sample();
        let engine = ScatterEngine::default();
        for (coord, objects) in explorer.store().iter() {
            assert_eq!(objects, &engine.scatter_chunk(&biome, *coord, explorer.model()));
        }
    }

    #[test]
    fn test_observer_stands_on_height_model() {
        let mut explorer = explorer();
        explorer.tick(1.0 / 60.0, 42.0, -17.0);
        let expected = explorer.model().height(42.0, -17.0) + EYE_HEIGHT;
        assert!((explorer.observer().y as f64 - expected).abs() < 1e-3);
    }

    #[test]
    fn test_moving_away_evicts() {
        let mut explorer = explorer();
        settle(&mut explorer, 0.0, 0.0);
        settle(&mut explorer, 1000.0, 0.0);
        assert_eq!(explorer.store().len(), 25);
        assert_eq!(explorer.stats().chunks_evicted, 25);
        assert!(explorer.stats().window_moves >= 2);
    }

    #[test]
    fn test_weather_eases_in() {
        let mut explorer = explorer();
        for _ in 0..30 {
            explorer.tick(1.0 / 60.0, 0.0, 0.0);
        }
        assert!(explorer.weather().is_visible());
        assert!(explorer.weather().current_intensity() > 0.0);
        assert!(explorer.weather().current_intensity() < 0.7);
    }
}
