//! Caller-owned per-chunk content (scatter results, mesh handles, ...).
//!
//! [`ChunkStore`] keeps content only for active chunks: content of chunks
//! that left the window is dropped, and newly active chunks are built
//! nearest-first under a per-tick budget so a fast-moving observer does not
//! stall a frame.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::coord::ChunkCoord;
use crate::manager::ActiveChunkSet;

/// Priority queue for chunks awaiting a build, nearest to the window centre first.
#[derive(Debug, Default)]
pub struct ChunkBuildQueue {
    /// Min-heap of `(distance_squared, coord)`.
    queue: BinaryHeap<Reverse<(u64, ChunkCoord)>>,
    /// Coordinates currently queued (dedup guard).
    pending: FxHashSet<ChunkCoord>,
}

impl ChunkBuildQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a chunk with its squared distance to the window centre.
    ///
    /// Duplicate coordinates are ignored.
    pub fn enqueue(&mut self, coord: ChunkCoord, dist_sq: u64) {
        if self.pending.insert(coord) {
            self.queue.push(Reverse((dist_sq, coord)));
        }
    }

    /// Dequeues the nearest chunk.
    pub fn dequeue(&mut self) -> Option<(u64, ChunkCoord)> {
        while let Some(Reverse((dist_sq, coord))) = self.queue.pop() {
            if self.pending.remove(&coord) {
                return Some((dist_sq, coord));
            }
        }
        None
    }

    /// Forgets a queued chunk.
    pub fn remove(&mut self, coord: &ChunkCoord) -> bool {
        let removed = self.pending.remove(coord);
        if removed {
            self.queue.retain(|Reverse((_, queued))| queued != coord);
        }
        removed
    }

    /// Keeps only the queued chunks for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&ChunkCoord) -> bool) {
        self.pending.retain(|coord| keep(coord));
        let pending = &self.pending;
        self.queue.retain(|Reverse((_, coord))| pending.contains(coord));
    }

    /// Returns `true` if `coord` is queued.
    pub fn contains(&self, coord: &ChunkCoord) -> bool {
        self.pending.contains(coord)
    }

    /// Number of queued chunks.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Clears the queue entirely.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.pending.clear();
    }
}

/// Result of one [`ChunkStore::sync`] call.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ChunkSyncResult {
    /// Chunks whose content was built this call.
    pub built: Vec<ChunkCoord>,
    /// Chunks whose content was dropped because they left the window.
    pub evicted: Vec<ChunkCoord>,
    /// Active chunks still waiting for a build after this call.
    pub pending: usize,
}

/// Per-chunk content for the active window.
#[derive(Debug)]
pub struct ChunkStore<T> {
    content: FxHashMap<ChunkCoord, T>,
    queue: ChunkBuildQueue,
}

impl<T> ChunkStore<T> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            content: FxHashMap::default(),
            queue: ChunkBuildQueue::new(),
        }
    }

    /// Drops content and queued builds of chunks that are no longer active.
    ///
    /// Returns the evicted coordinates so callers can release GPU resources.
    pub fn evict_inactive(&mut self, active: &ActiveChunkSet) -> Vec<ChunkCoord> {
        let mut evicted: Vec<ChunkCoord> = self
            .content
            .keys()
            .filter(|coord| !active.contains(coord))
            .copied()
            .collect();
        evicted.sort_unstable();
        for coord in &evicted {
            self.content.remove(coord);
        }
        self.queue.retain(|coord| active.contains(coord));
        evicted
    }

    /// Active chunks that have no content, nearest first. Queued chunks are
    /// included until they are built.
    pub fn missing(&self, active: &ActiveChunkSet) -> Vec<ChunkCoord> {
        let center = active.center().unwrap_or_default();
        let mut missing: Vec<ChunkCoord> = active
            .iter()
            .filter(|coord| !self.content.contains_key(coord))
            .collect();
        missing.sort_by_key(|coord| (coord.distance_sq(center), *coord));
        missing
    }

    /// Brings the store in line with `active`.
    ///
    /// Evicts inactive content, queues missing chunks, then calls `build`
    /// for at most `budget` queued chunks, nearest to the centre first.
    pub fn sync(
        &mut self,
        active: &ActiveChunkSet,
        budget: u32,
        mut build: impl FnMut(ChunkCoord) -> T,
    ) -> ChunkSyncResult {
        let evicted = self.evict_inactive(active);

        let center = active.center().unwrap_or_default();
        for coord in self.missing(active) {
            self.queue.enqueue(coord, coord.distance_sq(center));
        }

        let mut built = Vec::new();
        while built.len() < budget as usize {
            let Some((_dist_sq, coord)) = self.queue.dequeue() else {
                break;
            };
            if !active.contains(&coord) || self.content.contains_key(&coord) {
                continue;
            }
            self.content.insert(coord, build(coord));
            built.push(coord);
        }

        ChunkSyncResult {
            built,
            evicted,
            pending: self.queue.len(),
        }
    }

    /// Stores content produced elsewhere (e.g. a worker pool), but only if the
    /// chunk is still active. Late results for evicted chunks are discarded.
    pub fn insert_if_active(&mut self, active: &ActiveChunkSet, coord: ChunkCoord, value: T) -> bool {
        if !active.contains(&coord) {
            return false;
        }
        self.queue.remove(&coord);
        self.content.insert(coord, value);
        true
    }

    /// Content of an active chunk.
    pub fn get(&self, coord: &ChunkCoord) -> Option<&T> {
        self.content.get(coord)
    }

    /// Removes and returns the content of a chunk.
    pub fn remove(&mut self, coord: &ChunkCoord) -> Option<T> {
        self.queue.remove(coord);
        self.content.remove(coord)
    }

    /// Number of chunks with content.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Returns `true` if no chunk has content.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Iterates `(coord, content)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&ChunkCoord, &T)> {
        self.content.iter()
    }
}

impl<T> Default for ChunkStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
