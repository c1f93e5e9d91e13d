//! Chunk streaming end to end: the active window drives scatter, and chunks
//! that are left and re-entered come back identical.

use std::sync::Arc;
use std::time::{Duration, Instant};

use xeno_biome::BiomeParameters;
use xeno_chunks::{ChunkCoord, ChunkManager, ChunkManagerConfig, ChunkStore};
use xeno_terrain::{
    AsyncScatter, HeightModel, ScatterConfig, ScatterContext, ScatterEngine, ScatteredObject,
};

fn setup() -> (BiomeParameters, HeightModel, ScatterEngine, ChunkManager) {
    let biome = BiomeParameters::sample().sanitized();
    let model = HeightModel::for_terrain(&biome.terrain);
    let engine = ScatterEngine::new(ScatterConfig { chunk_size: 100.0 });
    let manager = ChunkManager::new(ChunkManagerConfig {
        chunk_size: 100.0,
        render_distance: 2,
    });
    (biome, model, engine, manager)
}

#[test]
fn test_reentered_chunks_scatter_identically() {
    let (biome, model, engine, mut manager) = setup();
    let mut store: ChunkStore<Vec<ScatteredObject>> = ChunkStore::new();

    let active = manager.tick(0.0, 0.0);
    store.sync(&active, 100, |coord| engine.scatter_chunk(&biome, coord, &model));
    let origin = ChunkCoord::new(0, 0);
    let first_visit = store.get(&origin).cloned().unwrap();

    // Walk far enough east that the origin chunk leaves the window.
    let mut x = 0.0;
    while x < 1000.0 {
        x += 37.0;
        let active = manager.tick(x, 0.0);
        store.sync(&active, 100, |coord| engine.scatter_chunk(&biome, coord, &model));
    }
    assert!(store.get(&origin).is_none(), "origin chunk should have been evicted");

    // And back.
    while x > 0.0 {
        x -= 37.0;
        let active = manager.tick(x, 0.0);
        store.sync(&active, 100, |coord| engine.scatter_chunk(&biome, coord, &model));
    }
    let second_visit = store.get(&origin).unwrap();

    assert_eq!(first_visit.len(), second_visit.len());
    for (a, b) in first_visit.iter().zip(second_visit) {
        assert!(
            (a.local_position - b.local_position).length() < 1e-9,
            "object moved on re-entry: {:?} vs {:?}",
            a.local_position,
            b.local_position
        );
        assert_eq!(a.seed, b.seed);
    }
}

#[test]
fn test_store_tracks_window_while_walking() {
    let (biome, model, engine, mut manager) = setup();
    let mut store: ChunkStore<Vec<ScatteredObject>> = ChunkStore::new();
    let mut builds = 0;

    for step in 0..200 {
        let t = step as f64 * 0.05;
        let (x, z) = (t.cos() * 400.0, t.sin() * 250.0 - 30.0);
        let active = manager.tick(x, z);
        store.sync(&active, u32::MAX, |coord| {
            builds += 1;
            engine.scatter_chunk(&biome, coord, &model)
        });

        assert_eq!(store.len(), 25, "store must mirror the 5x5 window at step {step}");
        assert!(active.iter().all(|c| store.get(&c).is_some()));
    }
    assert!(builds > 25, "walking should have built chunks beyond the first window");
}

#[test]
fn test_unchanged_ticks_trigger_no_rebuilds() {
    let (biome, model, engine, mut manager) = setup();
    let mut store: ChunkStore<Vec<ScatteredObject>> = ChunkStore::new();

    let first = manager.tick(10.0, 10.0);
    store.sync(&first, 100, |coord| engine.scatter_chunk(&biome, coord, &model));

    for i in 0..40 {
        let wiggle = (i as f64 * 0.7).sin() * 30.0;
        let again = manager.tick(10.0 + wiggle, 10.0 - wiggle);
        assert!(Arc::ptr_eq(&first, &again), "tick {i} replaced an unchanged window");
        let result = store.sync(&again, 100, |_| unreachable!("nothing should be rebuilt"));
        assert!(result.built.is_empty() && result.evicted.is_empty());
    }
}

#[test]
fn test_worker_pool_fills_window_with_synchronous_results() {
    let (biome, model, engine, mut manager) = setup();
    let context = Arc::new(ScatterContext {
        biome: Arc::new(biome),
        model: Arc::new(model),
        engine,
    });
    let pool = AsyncScatter::new(Arc::clone(&context), 2, 64, 64).unwrap();
    let mut store: ChunkStore<Vec<ScatteredObject>> = ChunkStore::new();

    let transition = manager.tick_transition(-420.0, 180.0);
    for coord in &transition.entered {
        pool.submit(*coord).unwrap();
    }

    let deadline = Instant::now() + Duration::from_secs(30);
    while store.len() < transition.active.len() && Instant::now() < deadline {
        for chunk in pool.drain_results() {
            store.insert_if_active(&transition.active, chunk.coord, chunk.objects);
        }
        std::thread::sleep(Duration::from_millis(5));
    }

    assert_eq!(store.len(), 25);
    for coord in transition.active.iter() {
        assert_eq!(store.get(&coord), Some(&context.scatter(coord)), "chunk {coord} differs");
    }
}
