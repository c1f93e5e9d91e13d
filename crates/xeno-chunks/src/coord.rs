//! Integer chunk-grid coordinates and the `"x,z"` chunk key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifies one square terrain tile on the infinite XZ plane.
///
/// Chunk `(x, z)` is centred on world position `(x * size, z * size)` and
/// spans half a chunk in every direction. A chunk has no identity beyond
/// this coordinate: everything placed on it is re-derived from the biome.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ChunkCoord {
    /// Chunk-grid X coordinate.
    pub x: i64,
    /// Chunk-grid Z coordinate.
    pub z: i64,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    pub const fn new(x: i64, z: i64) -> Self {
        Self { x, z }
    }

    /// The chunk whose centre is nearest to world position `(world_x, world_z)`.
    pub fn containing(world_x: f64, world_z: f64, chunk_size: f64) -> Self {
        Self {
            x: round_half_up(world_x / chunk_size),
            z: round_half_up(world_z / chunk_size),
        }
    }

    /// World-space centre of this chunk.
    pub fn origin(self, chunk_size: f64) -> (f64, f64) {
        (self.x as f64 * chunk_size, self.z as f64 * chunk_size)
    }

    /// Returns the coordinate offset by `(dx, dz)` chunks, saturating at
    /// the edge of the `i64` grid.
    pub fn offset(self, dx: i64, dz: i64) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            z: self.z.saturating_add(dz),
        }
    }

    /// Squared grid distance between two chunks, saturating at `u64::MAX`.
    pub fn distance_sq(self, other: ChunkCoord) -> u64 {
        let dx = self.x as i128 - other.x as i128;
        let dz = self.z as i128 - other.z as i128;
        u64::try_from(dx * dx + dz * dz).unwrap_or(u64::MAX)
    }
}

/// Rounds to the nearest integer with ties going toward positive infinity.
///
/// `round_half_up(2.5) == 3` and `round_half_up(-2.5) == -2`. This differs
/// from [`f64::round`], which sends `-2.5` to `-3`. NaN maps to 0 and
/// infinities saturate, as with any `as i64` cast.
pub fn round_half_up(v: f64) -> i64 {
    (v + 0.5).floor() as i64
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.z)
    }
}

/// Error returned when a chunk key is not of the form `"x,z"`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid chunk key `{0}`, expected `x,z`")]
pub struct ChunkCoordParseError(pub String);

impl FromStr for ChunkCoord {
    type Err = ChunkCoordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ChunkCoordParseError(s.to_string());
        let (x, z) = s.split_once(',').ok_or_else(err)?;
        let x = x.trim().parse().map_err(|_| err())?;
        let z = z.trim().parse().map_err(|_| err())?;
        Ok(Self { x, z })
    }
}
