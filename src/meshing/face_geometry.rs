//! # Face Geometry Table
//!
//! Pure lookup producing the six vertices (two triangles) of a unit-cube face
//! at a given block position. The windings keep every face's normal pointing
//! out of the block with counter-clockwise triangles.

use cgmath::Point3;

use crate::voxels::block::block_side::BlockSide;

/// Number of position scalars emitted per face (6 vertices x 3 components).
pub const SCALARS_PER_FACE: usize = 18;

/// Returns the 18 position scalars for one side of the unit cube at `position`.
///
/// # Arguments
/// * `position` - Chunk-local block coordinates of the cube
/// * `side` - Which face of the cube to emit
///
/// # Returns
/// Two triangles as a flat `[x0, y0, z0, ..., x5, y5, z5]` array.
pub fn vertices_for_side(position: Point3<i32>, side: BlockSide) -> [f32; SCALARS_PER_FACE] {
    let x = position.x as f32;
    let y = position.y as f32;
    let z = position.z as f32;

    match side {
        BlockSide::UP => [
            x, y + 1.0, z,   x + 1.0, y + 1.0, z + 1.0,   x + 1.0, y + 1.0, z,
            x, y + 1.0, z,   x, y + 1.0, z + 1.0,         x + 1.0, y + 1.0, z + 1.0,
        ],
        BlockSide::DOWN => [
            x, y, z,         x + 1.0, y, z,               x + 1.0, y, z + 1.0,
            x, y, z,         x + 1.0, y, z + 1.0,         x, y, z + 1.0,
        ],
        BlockSide::NORTH => [
            x, y, z + 1.0,   x + 1.0, y, z + 1.0,         x + 1.0, y + 1.0, z + 1.0,
            x, y, z + 1.0,   x + 1.0, y + 1.0, z + 1.0,   x, y + 1.0, z + 1.0,
        ],
        BlockSide::SOUTH => [
            x, y, z,         x + 1.0, y + 1.0, z,         x + 1.0, y, z,
            x, y, z,         x, y + 1.0, z,               x + 1.0, y + 1.0, z,
        ],
        BlockSide::WEST => [
            x + 1.0, y, z,   x + 1.0, y + 1.0, z + 1.0,   x + 1.0, y, z + 1.0,
            x + 1.0, y, z,   x + 1.0, y + 1.0, z,         x + 1.0, y + 1.0, z + 1.0,
        ],
        BlockSide::EAST => [
            x, y, z,         x, y, z + 1.0,               x, y + 1.0, z + 1.0,
            x, y, z,         x, y + 1.0, z + 1.0,         x, y + 1.0, z,
        ],
    }
}
