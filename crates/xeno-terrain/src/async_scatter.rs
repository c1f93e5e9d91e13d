//! Background chunk scatter on a worker pool.
//!
//! Workers share the biome and height model read-only; each chunk's
//! random stream is derived from its coordinate, so results do not depend
//! on which worker ran them or in which order. Completed chunks arrive on a
//! bounded channel that the main thread drains once per frame.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, bounded};
use dashmap::DashMap;
use xeno_biome::BiomeParameters;
use xeno_chunks::{ActiveChunkSet, ChunkCoord};

use crate::height::HeightModel;
use crate::scatter::{ScatterEngine, ScatteredObject};

/// Everything a worker needs to scatter a chunk of one biome.
#[derive(Debug)]
pub struct ScatterContext {
    pub biome: Arc<BiomeParameters>,
    pub model: Arc<HeightModel>,
    pub engine: ScatterEngine,
}

impl ScatterContext {
    /// Scatters one chunk on the calling thread.
    pub fn scatter(&self, coord: ChunkCoord) -> Vec<ScatteredObject> {
        self.engine.scatter_chunk(&self.biome, coord, &self.model)
    }
}

/// Objects of one chunk, produced by a worker.
#[derive(Debug)]
pub struct ScatteredChunk {
    pub coord: ChunkCoord,
    pub objects: Vec<ScatteredObject>,
    /// Scatter time in microseconds (for profiling).
    pub generation_time_us: u64,
}

/// Internal wrapper that carries the coordinate and its cancellation flag.
struct PendingScatter {
    coord: ChunkCoord,
    cancelled: Arc<AtomicBool>,
}

/// Scatters chunks across a thread pool.
pub struct AsyncScatter {
    task_sender: Sender<PendingScatter>,
    result_receiver: Receiver<ScatteredChunk>,
    /// Cancellation flag per pending coordinate.
    active_tasks: Arc<DashMap<ChunkCoord, Arc<AtomicBool>>>,
    in_flight: Arc<AtomicU64>,
}

impl AsyncScatter {
    /// Starts `thread_count` workers (at least one).
    ///
    /// - `max_concurrent`: queue depth; further submissions are rejected.
    /// - `result_capacity`: bounded channel capacity for completed chunks.
    pub fn new(
        context: Arc<ScatterContext>,
        thread_count: usize,
        max_concurrent: usize,
        result_capacity: usize,
    ) -> std::io::Result<Self> {
        let (task_sender, task_receiver) = bounded::<PendingScatter>(max_concurrent.max(1));
        let (result_sender, result_receiver) = bounded::<ScatteredChunk>(result_capacity.max(1));
        let in_flight = Arc::new(AtomicU64::new(0));

        for _ in 0..thread_count.max(1) {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let in_flight = Arc::clone(&in_flight);
            let context = Arc::clone(&context);

            std::thread::Builder::new()
                .name("scatter-worker".into())
                .spawn(move || {
                    while let Ok(task) = receiver.recv() {
                        if task.cancelled.load(Ordering::Relaxed) {
                            in_flight.fetch_sub(1, Ordering::Relaxed);
                            continue;
                        }

                        let start = std::time::Instant::now();
                        let objects = context.scatter(task.coord);
                        let elapsed = start.elapsed().as_micros() as u64;

                        // Receiver gone means the pool was dropped.
                        let disconnected = !task.cancelled.load(Ordering::Relaxed)
                            && sender
                                .send(ScatteredChunk {
                                    coord: task.coord,
                                    objects,
                                    generation_time_us: elapsed,
                                })
                                .is_err();
                        in_flight.fetch_sub(1, Ordering::Relaxed);
                        if disconnected {
                            break;
                        }
                    }
                })?;
        }

        tracing::debug!(threads = thread_count.max(1), "scatter workers started");
        Ok(Self {
            task_sender,
            result_receiver,
            active_tasks: Arc::new(DashMap::new()),
            in_flight,
        })
    }

    /// Starts a pool with `threads` workers, or `num_cpus - 2` when `threads` is 0.
    pub fn with_threads(context: Arc<ScatterContext>, threads: usize) -> std::io::Result<Self> {
        let threads = if threads == 0 {
            num_cpus::get().saturating_sub(2).max(1)
        } else {
            threads
        };
        Self::new(context, threads, 64, 128)
    }

    /// Queues a chunk for scattering.
    ///
    /// Already-pending coordinates are accepted without queueing twice.
    /// Returns `Err(coord)` if the queue is full.
    pub fn submit(&self, coord: ChunkCoord) -> Result<(), ChunkCoord> {
        if self.active_tasks.contains_key(&coord) {
            return Ok(());
        }
        let cancelled = Arc::new(AtomicBool::new(false));
        self.active_tasks.insert(coord, Arc::clone(&cancelled));
        self.in_flight.fetch_add(1, Ordering::Relaxed);

        self.task_sender
            .try_send(PendingScatter { coord, cancelled })
            .map_err(|e| {
                self.in_flight.fetch_sub(1, Ordering::Relaxed);
                let coord = e.into_inner().coord;
                self.active_tasks.remove(&coord);
                coord
            })
    }

    /// Cancels a pending or running chunk. No-op once its result was drained.
    pub fn cancel(&self, coord: &ChunkCoord) {
        if let Some((_, cancelled)) = self.active_tasks.remove(coord) {
            cancelled.store(true, Ordering::Relaxed);
        }
    }

    /// Cancels every pending chunk that is not in `active`.
    pub fn cancel_inactive(&self, active: &ActiveChunkSet) -> usize {
        let stale: Vec<ChunkCoord> = self
            .active_tasks
            .iter()
            .map(|entry| *entry.key())
            .filter(|coord| !active.contains(coord))
            .collect();
        for coord in &stale {
            self.cancel(coord);
        }
        if !stale.is_empty() {
            tracing::debug!(count = stale.len(), "cancelled scatter for exited chunks");
        }
        stale.len()
    }

    /// Drains all completed chunks. Call once per frame on the main thread.
    pub fn drain_results(&self) -> Vec<ScatteredChunk> {
        let mut results = Vec::new();
        while let Ok(chunk) = self.result_receiver.try_recv() {
            self.active_tasks.remove(&chunk.coord);
            results.push(chunk);
        }
        results
    }

    /// Number of chunks queued or executing.
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Returns `true` if `coord` was submitted and not yet drained or cancelled.
    pub fn is_pending(&self, coord: &ChunkCoord) -> bool {
        self.active_tasks.contains_key(coord)
    }
}
