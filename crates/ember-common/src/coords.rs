//! Tile coordinates in the game world.

use serde::{Deserialize, Serialize};

/// A tile position in world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// X coordinate in tiles
    pub x: i32,
    /// Y coordinate in tiles
    pub y: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance to `other`: the larger of the per-axis deltas.
    ///
    /// This is the number of steps needed when diagonal moves cost the same
    /// as straight ones, which is how view ranges are measured.
    #[must_use]
    pub const fn distance_to(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy {
            dx
        } else {
            dy
        }
    }
}
