//! # Coordinates Module
//!
//! Linearization of chunk-local block coordinates, the inverse lookup, and the
//! index mapping used when an adjacent position falls into a neighboring
//! chunk's boundary layer.

use cgmath::Point3;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;

/// Converts chunk-local coordinates to a linear block index.
///
/// The linearization is `x * 256 + y * 16 + z`. Callers must pass coordinates
/// in `[0, CHUNK_DIMENSION)` on every axis; anything else is a contract
/// violation and panics in debug builds.
///
/// # Arguments
/// * `position` - Chunk-local block coordinates
///
/// # Returns
/// The linear index in `[0, CHUNK_SIZE)`.
pub fn block_index_for_position(position: Point3<i32>) -> usize {
    debug_assert!(
        position_is_within_chunk(position),
        "block position {:?} outside chunk bounds",
        position
    );
    (position.x * CHUNK_PLANE_SIZE + position.y * CHUNK_DIMENSION + position.z) as usize
}

/// Converts a linear block index back to chunk-local coordinates.
///
/// # Arguments
/// * `index` - A linear index in `[0, CHUNK_SIZE)`
///
/// # Returns
/// The chunk-local block coordinates.
pub fn position_for_block_index(index: usize) -> Point3<i32> {
    let index = index as i32;
    debug_assert!(index < CHUNK_SIZE, "block index {} out of range", index);
    Point3::new(
        index / CHUNK_PLANE_SIZE,
        (index / CHUNK_DIMENSION) % CHUNK_DIMENSION,
        index % CHUNK_DIMENSION,
    )
}

/// Reports whether a local coordinate triple lies within the chunk bounds.
///
/// Used to decide whether an adjacent-face operation is local or must be
/// forwarded to a neighboring chunk.
pub fn position_is_within_chunk(position: Point3<i32>) -> bool {
    position.x >= 0
        && position.x < CHUNK_DIMENSION
        && position.y >= 0
        && position.y < CHUNK_DIMENSION
        && position.z >= 0
        && position.z < CHUNK_DIMENSION
}

/// Maps an out-of-chunk adjacent position to an index into the neighboring
/// chunk's 16x16 boundary layer.
///
/// Exactly one axis is out of range; the remaining two axes select the cell:
/// x out of range uses `y * 16 + z`, y out of range uses `x * 16 + z`, and
/// z out of range uses `x * 16 + y`.
pub fn boundary_index_for_position(position: Point3<i32>) -> usize {
    if position.x < 0 || position.x >= CHUNK_DIMENSION {
        (position.y * CHUNK_DIMENSION + position.z) as usize
    } else if position.y < 0 || position.y >= CHUNK_DIMENSION {
        (position.x * CHUNK_DIMENSION + position.z) as usize
    } else {
        (position.x * CHUNK_DIMENSION + position.y) as usize
    }
}
