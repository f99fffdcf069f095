//! # Block Side Module
//!
//! This module defines the six axis-aligned faces of a voxel block, their
//! direction offsets, and opposite-face lookup. Sides are ordered so that
//! opposite pairs sit next to each other, which makes `opposite()` a single
//! xor on the index.

use cgmath::{Point3, Vector3};

/// Represents the six possible faces of a voxel block.
///
/// Each variant is assigned a fixed index used throughout the face buffer's
/// slot layout (slot = side index * 2 + half). The order is:
/// [UP, DOWN, NORTH, SOUTH, WEST, EAST].
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The top face (facing positive Y)
    UP = 0,

    /// The bottom face (facing negative Y)
    DOWN = 1,

    /// The north face (facing positive Z)
    NORTH = 2,

    /// The south face (facing negative Z)
    SOUTH = 3,

    /// The west face (facing positive X)
    WEST = 4,

    /// The east face (facing negative X)
    EAST = 5,
}

impl BlockSide {
    /// Returns all six block sides in index order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::UP,
            BlockSide::DOWN,
            BlockSide::NORTH,
            BlockSide::SOUTH,
            BlockSide::WEST,
            BlockSide::EAST,
        ]
    }

    /// Returns this side's index in `[0, 6)`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Looks up a side from its index.
    ///
    /// # Panics
    /// Panics if `index` is not in `[0, 6)`.
    pub fn from_index(index: usize) -> Self {
        Self::all()[index]
    }

    /// Returns the side facing the other way.
    pub fn opposite(self) -> Self {
        Self::from_index(self.index() ^ 1)
    }

    /// Returns the unit offset from a block to its neighbor on this side.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::UP => Vector3::new(0, 1, 0),
            BlockSide::DOWN => Vector3::new(0, -1, 0),
            BlockSide::NORTH => Vector3::new(0, 0, 1),
            BlockSide::SOUTH => Vector3::new(0, 0, -1),
            BlockSide::WEST => Vector3::new(1, 0, 0),
            BlockSide::EAST => Vector3::new(-1, 0, 0),
        }
    }

    /// Returns the position adjacent to `position` on this side.
    pub fn adjacent_position(self, position: Point3<i32>) -> Point3<i32> {
        position + self.offset()
    }

    /// Returns this side's axis (0 = x, 1 = y, 2 = z).
    pub fn axis(self) -> usize {
        match self {
            BlockSide::WEST | BlockSide::EAST => 0,
            BlockSide::UP | BlockSide::DOWN => 1,
            BlockSide::NORTH | BlockSide::SOUTH => 2,
        }
    }

    /// Reports whether this side faces the positive direction of its axis.
    pub fn is_positive(self) -> bool {
        matches!(self, BlockSide::UP | BlockSide::NORTH | BlockSide::WEST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposites_pair_up() {
        for side in BlockSide::all() {
            assert_eq!(side.opposite().opposite(), side);
            assert_eq!(side.offset() + side.opposite().offset(), Vector3::new(0, 0, 0));
        }
    }

    #[test]
    fn offsets_follow_axes() {
        assert_eq!(BlockSide::UP.offset(), Vector3::new(0, 1, 0));
        assert_eq!(BlockSide::WEST.offset(), Vector3::new(1, 0, 0));
        assert_eq!(BlockSide::NORTH.offset(), Vector3::new(0, 0, 1));
        for side in BlockSide::all() {
            assert_eq!(side.offset()[side.axis()], if side.is_positive() { 1 } else { -1 });
        }
    }
}
