//! # Block Module
//!
//! Block type definitions, block side handling, and the static block registry
//! mapping stored block ids to their face color palettes.

use phf::phf_map;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in chunk grids.
/// An id of 0 always means air / empty.
pub type BlockTypeSize = u8;

/// Per-type render data: one RGB color per block side, in `BlockSide` index
/// order, plus the palette used while the block is highlighted.
pub struct BlockDescriptor {
    /// RGB color for each of the six sides, `BlockSide` index order.
    pub colors: [[f32; 3]; 6],
    /// RGB color for each side while the block is highlighted.
    pub highlight_colors: [[f32; 3]; 6],
}

impl BlockDescriptor {
    /// Returns the color for one of the 12 face-half slots.
    ///
    /// Both halves of a side share a color, so this is just `slot / 2`.
    pub fn color_for_slot(&self, slot: usize, highlighted: bool) -> [f32; 3] {
        if highlighted {
            self.highlight_colors[slot / 2]
        } else {
            self.colors[slot / 2]
        }
    }
}

const DIRT_BROWN: [f32; 3] = [214.0 / 255.0, 134.0 / 255.0, 83.0 / 255.0];
const DIRT_BROWN_LIT: [f32; 3] = [227.0 / 255.0, 160.0 / 255.0, 102.0 / 255.0];
const GRASS_GREEN: [f32; 3] = [54.0 / 255.0, 153.0 / 255.0, 64.0 / 255.0];
const GRASS_GREEN_LIT: [f32; 3] = [67.0 / 255.0, 179.0 / 255.0, 83.0 / 255.0];
const LOG_BARK: [f32; 3] = [140.0 / 255.0, 91.0 / 255.0, 45.0 / 255.0];
const LOG_BARK_LIT: [f32; 3] = [168.0 / 255.0, 115.0 / 255.0, 66.0 / 255.0];
const LEAF_GREEN: [f32; 3] = [46.0 / 255.0, 139.0 / 255.0, 58.0 / 255.0];
const LEAF_GREEN_LIT: [f32; 3] = [74.0 / 255.0, 169.0 / 255.0, 88.0 / 255.0];

/// The static block registry, keyed by stored block id.
///
/// Air (id 0) has no entry; it is never meshed. Grids produced by the terrain
/// generator only ever contain ids present here (or 0).
pub static BLOCKS: phf::Map<BlockTypeSize, BlockDescriptor> = phf_map! {
    1u8 => BlockDescriptor {
        colors: [DIRT_BROWN; 6],
        highlight_colors: [DIRT_BROWN_LIT; 6],
    },
    2u8 => BlockDescriptor {
        colors: [
            GRASS_GREEN,
            DIRT_BROWN,
            DIRT_BROWN,
            DIRT_BROWN,
            DIRT_BROWN,
            DIRT_BROWN,
        ],
        highlight_colors: [
            GRASS_GREEN_LIT,
            DIRT_BROWN_LIT,
            DIRT_BROWN_LIT,
            DIRT_BROWN_LIT,
            DIRT_BROWN_LIT,
            DIRT_BROWN_LIT,
        ],
    },
    3u8 => BlockDescriptor {
        colors: [LOG_BARK; 6],
        highlight_colors: [LOG_BARK_LIT; 6],
    },
    4u8 => BlockDescriptor {
        colors: [LEAF_GREEN; 6],
        highlight_colors: [LEAF_GREEN_LIT; 6],
    },
};

/// Looks up the descriptor for a stored block id.
///
/// Returns `None` for air (0) and for unknown ids.
pub fn descriptor_for_id(id: BlockTypeSize) -> Option<&'static BlockDescriptor> {
    BLOCKS.get(&id)
}
