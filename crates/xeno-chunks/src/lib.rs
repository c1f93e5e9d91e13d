//! Chunk streaming around a moving observer: chunk coordinates, the active
//! window, transition events, and caller-owned per-chunk content.

pub mod coord;
pub mod events;
pub mod manager;
pub mod store;

pub use coord::{ChunkCoord, ChunkCoordParseError, round_half_up};
pub use events::{ChunkEvent, ChunkEventBuffer};
pub use manager::{ActiveChunkSet, ChunkManager, ChunkManagerConfig, ChunkTransition};
pub use store::{ChunkBuildQueue, ChunkStore, ChunkSyncResult};
