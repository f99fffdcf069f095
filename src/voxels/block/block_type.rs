//! # Block Type Module
//!
//! This module defines the block types the terrain generator can produce and
//! conversion from the compact integer form stored in chunk grids.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all block types in the voxel world.
///
/// The discriminants are the ids stored in chunk grids (0 = air / empty).
/// The `FromPrimitive` derive allows conversion from those stored integers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// An air block, which is non-solid and never meshed.
    AIR,

    /// A basic dirt block, the bulk of generated terrain.
    DIRT,

    /// A grass block: green on top, dirt-colored on the other sides.
    GRASS,

    /// A tree-trunk block placed by the tree generator.
    LOG,

    /// A leaf block forming tree canopies.
    LEAF,
}

impl BlockType {
    /// Converts a stored block id to a `BlockType`.
    ///
    /// # Arguments
    /// * `btype` - The block id as stored in a chunk grid
    ///
    /// # Returns
    /// `Some(BlockType)` for a known id, `None` otherwise.
    pub fn from_id(btype: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(btype)
    }

    /// Returns this block type's grid id.
    pub fn id(self) -> BlockTypeSize {
        self as BlockTypeSize
    }
}
