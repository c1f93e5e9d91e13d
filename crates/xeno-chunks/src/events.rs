//! Chunk transition events.
//!
//! The [`ChunkManager`](crate::ChunkManager) only signals lifecycle changes;
//! mesh builders, scatter jobs and GPU resource owners read these events and
//! act on them. Events are double-buffered per frame.

use crate::coord::ChunkCoord;

/// A chunk entering or leaving the active window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkEvent {
    /// The chunk became active this tick; build its content once.
    Entered(ChunkCoord),
    /// The chunk left the active window; release anything derived from it.
    Exited(ChunkCoord),
}

impl ChunkEvent {
    /// The chunk this event refers to.
    pub fn coord(&self) -> ChunkCoord {
        match self {
            Self::Entered(coord) | Self::Exited(coord) => *coord,
        }
    }
}

/// Double-buffered storage for [`ChunkEvent`]s.
///
/// Events written in the current frame are readable in the current and next
/// frame. After two [`swap`](ChunkEventBuffer::swap) calls they are dropped.
#[derive(Debug, Default)]
pub struct ChunkEventBuffer {
    prev: Vec<ChunkEvent>,
    current: Vec<ChunkEvent>,
}

impl ChunkEventBuffer {
    /// Creates a new empty event buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an event for the current frame.
    pub fn send(&mut self, event: ChunkEvent) {
        self.current.push(event);
    }

    /// All readable events, previous frame first.
    pub fn read(&self) -> impl Iterator<Item = &ChunkEvent> {
        self.prev.iter().chain(self.current.iter())
    }

    /// Readable `Entered` coordinates.
    pub fn entered(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.read().filter_map(|e| match e {
            ChunkEvent::Entered(coord) => Some(*coord),
            ChunkEvent::Exited(_) => None,
        })
    }

    /// Readable `Exited` coordinates.
    pub fn exited(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.read().filter_map(|e| match e {
            ChunkEvent::Exited(coord) => Some(*coord),
            ChunkEvent::Entered(_) => None,
        })
    }

    /// Number of readable events.
    pub fn len(&self) -> usize {
        self.prev.len() + self.current.len()
    }

    /// Returns `true` if there are no readable events.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Advances the frame: previous events are dropped, current becomes previous.
    pub fn swap(&mut self) {
        self.prev.clear();
        std::mem::swap(&mut self.prev, &mut self.current);
    }

    /// Drops every buffered event.
    pub fn clear(&mut self) {
        self.prev.clear();
        self.current.clear();
    }
}
