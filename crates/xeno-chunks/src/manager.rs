//! The active chunk window that follows the observer.
//!
//! Each tick the observer position is snapped to the nearest chunk centre and
//! the square window of radius `render_distance` around it becomes the active
//! set. The set is replaced only when its coordinates change, so callers can
//! compare the returned [`Arc`]s with [`Arc::ptr_eq`] and skip rebuild work
//! while the observer wanders inside one chunk.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::coord::ChunkCoord;
use crate::events::{ChunkEvent, ChunkEventBuffer};

/// Configuration for the active window.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkManagerConfig {
    /// Edge length of a chunk in world units.
    pub chunk_size: f64,
    /// Window radius in chunks. The window holds `(2R + 1)^2` chunks.
    pub render_distance: u32,
}

impl Default for ChunkManagerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 100.0,
            render_distance: 2,
        }
    }
}

/// An immutable set of active chunk coordinates.
///
/// Coordinates are kept in row-major order (Z outer, X inner) for stable
/// iteration; membership tests go through a hash set.
#[derive(Clone, Debug, Default)]
pub struct ActiveChunkSet {
    center: Option<ChunkCoord>,
    ordered: Vec<ChunkCoord>,
    members: FxHashSet<ChunkCoord>,
}

impl ActiveChunkSet {
    /// The set before the first tick: no centre, no chunks.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The square window of radius `radius` around `center`.
    ///
    /// The centre is pulled in from the edge of the `i64` grid so the whole
    /// window stays representable.
    pub fn window(center: ChunkCoord, radius: u32) -> Self {
        let r = radius as i64;
        let center = ChunkCoord::new(
            center.x.clamp(i64::MIN + r, i64::MAX - r),
            center.z.clamp(i64::MIN + r, i64::MAX - r),
        );
        let side = (2 * radius as usize) + 1;
        let mut ordered = Vec::with_capacity(side * side);
        for dz in -r..=r {
            for dx in -r..=r {
                ordered.push(center.offset(dx, dz));
            }
        }
        let members = ordered.iter().copied().collect();
        Self {
            center: Some(center),
            ordered,
            members,
        }
    }

    /// Chunk the window is centred on, `None` before the first tick.
    pub fn center(&self) -> Option<ChunkCoord> {
        self.center
    }

    /// Returns `true` if `coord` is active.
    pub fn contains(&self, coord: &ChunkCoord) -> bool {
        self.members.contains(coord)
    }

    /// Number of active chunks.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Returns `true` if no chunk is active.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Iterates active coordinates in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.ordered.iter().copied()
    }

    /// Set equality on coordinates, ignoring order and centre.
    pub fn same_coords(&self, other: &ActiveChunkSet) -> bool {
        self.members.len() == other.members.len()
            && self.members.iter().all(|c| other.members.contains(c))
    }

    /// Coordinates in `self` that are not in `other`, in row-major order.
    pub fn difference<'a>(
        &'a self,
        other: &'a ActiveChunkSet,
    ) -> impl Iterator<Item = ChunkCoord> + 'a {
        self.iter().filter(move |c| !other.contains(c))
    }
}

impl PartialEq for ActiveChunkSet {
    fn eq(&self, other: &Self) -> bool {
        self.same_coords(other)
    }
}

impl Eq for ActiveChunkSet {}

/// Outcome of one tick in incremental form.
#[derive(Clone, Debug)]
pub struct ChunkTransition {
    /// The active set after this tick.
    pub active: Arc<ActiveChunkSet>,
    /// Chunks that became active this tick.
    pub entered: Vec<ChunkCoord>,
    /// Chunks that stopped being active this tick.
    pub exited: Vec<ChunkCoord>,
}

impl ChunkTransition {
    /// Returns `true` if the active set did not change.
    pub fn is_unchanged(&self) -> bool {
        self.entered.is_empty() && self.exited.is_empty()
    }
}

/// Tracks which chunks are live around a moving observer.
///
/// Chunks move through `absent -> active -> absent` only; "active" means
/// "present in the current set". The manager owns no chunk content: it
/// records [`ChunkEvent`]s and leaves building and releasing to callers.
#[derive(Debug)]
pub struct ChunkManager {
    config: ChunkManagerConfig,
    active: Arc<ActiveChunkSet>,
    events: ChunkEventBuffer,
    log_transitions: bool,
}

impl ChunkManager {
    /// Creates a manager with an empty active set.
    pub fn new(config: ChunkManagerConfig) -> Self {
        Self {
            config,
            active: Arc::new(ActiveChunkSet::empty()),
            events: ChunkEventBuffer::new(),
            log_transitions: false,
        }
    }

    /// Emit a `debug!` line for every entered/exited chunk.
    pub fn with_transition_logging(mut self, enabled: bool) -> Self {
        self.log_transitions = enabled;
        self
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &ChunkManagerConfig {
        &self.config
    }

    /// Changes the window radius. Takes effect on the next tick.
    pub fn set_render_distance(&mut self, render_distance: u32) {
        self.config.render_distance = render_distance;
    }

    /// The active set produced by the latest tick.
    pub fn active(&self) -> &Arc<ActiveChunkSet> {
        &self.active
    }

    /// Transition events of the current and previous frame.
    pub fn events(&self) -> &ChunkEventBuffer {
        &self.events
    }

    /// Advances the event buffer. Call once per frame before [`tick`](Self::tick).
    pub fn swap_events(&mut self) {
        self.events.swap();
    }

    /// Recomputes the active set for an observer at `(observer_x, observer_z)`.
    ///
    /// Returns the previous `Arc` untouched when the coordinate set is the same.
    pub fn tick(&mut self, observer_x: f64, observer_z: f64) -> Arc<ActiveChunkSet> {
        self.tick_transition(observer_x, observer_z).active
    }

    /// Like [`tick`](Self::tick), but also reports entered and exited chunks.
    pub fn tick_transition(&mut self, observer_x: f64, observer_z: f64) -> ChunkTransition {
        let center = ChunkCoord::containing(observer_x, observer_z, self.config.chunk_size);

        // Same centre and radius always means the same window.
        if self.active.center() == Some(center)
            && self.active.len() == window_len(self.config.render_distance)
        {
            return ChunkTransition {
                active: Arc::clone(&self.active),
                entered: Vec::new(),
                exited: Vec::new(),
            };
        }

        let next = ActiveChunkSet::window(center, self.config.render_distance);
        if next.same_coords(&self.active) {
            return ChunkTransition {
                active: Arc::clone(&self.active),
                entered: Vec::new(),
                exited: Vec::new(),
            };
        }

        let entered: Vec<ChunkCoord> = next.difference(&self.active).collect();
        let exited: Vec<ChunkCoord> = self.active.difference(&next).collect();

        tracing::debug!(
            center = %center,
            entered = entered.len(),
            exited = exited.len(),
            "active chunk window moved"
        );

        for &coord in &entered {
            if self.log_transitions {
                tracing::debug!(coord = %coord, "chunk entered");
            }
            self.events.send(ChunkEvent::Entered(coord));
        }
        for &coord in &exited {
            if self.log_transitions {
                tracing::debug!(coord = %coord, "chunk exited");
            }
            self.events.send(ChunkEvent::Exited(coord));
        }

        self.active = Arc::new(next);
        ChunkTransition {
            active: Arc::clone(&self.active),
            entered,
            exited,
        }
    }
}

impl Default for ChunkManager {
    fn default() -> Self {
        Self::new(ChunkManagerConfig::default())
    }
}

fn window_len(radius: u32) -> usize {
    let side = 2 * radius as usize + 1;
    side * side
}
