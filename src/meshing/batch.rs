//! # Batch Geometry Builder
//!
//! One dense pass over a freshly generated voxel grid, producing the same
//! face-buffer layout the incremental path would build one face at a time.
//!
//! The builder is pure and stateless: it reads a caller-provided grid and
//! boundary-layer snapshot and writes freshly allocated output buffers, so it
//! can run on a worker thread concurrently with main-thread chunk edits. The
//! caller must not start a second build for the same chunk before the first
//! result is consumed.

use cgmath::Point3;

use crate::meshing::face_buffer::{FaceBuffer, SCALARS_PER_ENTRY, SLOTS_PER_BLOCK};
use crate::meshing::face_geometry::{vertices_for_side, SCALARS_PER_FACE};
use crate::voxels::block::block_side::BlockSide;
use crate::voxels::block::{descriptor_for_id, BlockTypeSize};
use crate::voxels::coordinates::{
    block_index_for_position, boundary_index_for_position, position_for_block_index,
    position_is_within_chunk, CHUNK_PLANE_SIZE, CHUNK_SIZE,
};

/// A 16x16 slice of block ids at the edge of a neighboring chunk.
pub type BoundaryLayer = [BlockTypeSize; CHUNK_PLANE_SIZE as usize];

/// A chunk's full grid of block ids.
pub type BlockGrid = [BlockTypeSize; CHUNK_SIZE as usize];

const MAX_FACE_ENTRIES: usize = CHUNK_SIZE as usize * 12;

/// Looks up the block adjacent to a position, falling back to the neighbor's
/// boundary layer when the position leaves the chunk. An absent layer (the
/// neighbor is not loaded) reads as empty, so boundary faces are built
/// speculatively and removed again once the neighbor loads.
fn adjacent_block(
    blocks: &BlockGrid,
    layer: Option<&BoundaryLayer>,
    position: Point3<i32>,
) -> BlockTypeSize {
    if position_is_within_chunk(position) {
        blocks[block_index_for_position(position)]
    } else if let Some(layer) = layer {
        layer[boundary_index_for_position(position)]
    } else {
        0
    }
}

/// Builds the initial face buffer for a chunk.
///
/// Scans all 4096 blocks once, in raster order of block index then side
/// index, and emits a face wherever a solid block meets a non-solid neighbor.
/// The output is content-equivalent to calling `create_face` incrementally
/// for every visible face, and the buffers are sized to the next power-of-two
/// capacity above the live counts so a bounded number of subsequent edits fit
/// without reallocation.
///
/// # Arguments
/// * `blocks` - The chunk's full voxel grid
/// * `neighbor_sides` - The six adjacent chunks' facing boundary layers, in
///   `BlockSide` index order; `None` where the neighbor is not loaded
///
/// # Returns
/// A populated `FaceBuffer`.
pub fn build_chunk_geometry(
    blocks: &BlockGrid,
    neighbor_sides: [Option<&BoundaryLayer>; 6],
) -> FaceBuffer {
    let mut positions = vec![0.0f32; MAX_FACE_ENTRIES * SCALARS_PER_ENTRY];
    let mut colors = vec![0.0f32; MAX_FACE_ENTRIES * SCALARS_PER_ENTRY];
    let mut blocks_for_faces = vec![-1i32; MAX_FACE_ENTRIES];
    let mut slots_for_faces = vec![-1i32; MAX_FACE_ENTRIES];
    let mut slots = vec![-1i32; CHUNK_SIZE as usize * SLOTS_PER_BLOCK];
    let mut blocks_for_records = vec![-1i32; CHUNK_SIZE as usize];
    let mut slot_offsets = vec![-1i32; CHUNK_SIZE as usize];

    let mut live_len = 0usize;
    let mut slot_len = 0usize;
    let mut record = [-1i32; SLOTS_PER_BLOCK];

    for block_index in 0..CHUNK_SIZE as usize {
        let id = blocks[block_index];
        if id == 0 {
            continue;
        }
        let Some(descriptor) = descriptor_for_id(id) else {
            continue;
        };

        let position = position_for_block_index(block_index);
        record.fill(-1);
        let mut block_has_visible_faces = false;

        for side in BlockSide::all() {
            let adjacent = side.adjacent_position(position);
            if adjacent_block(blocks, neighbor_sides[side.index()], adjacent) != 0 {
                continue;
            }

            for half in 0..2 {
                let entry = live_len / SCALARS_PER_ENTRY + half;
                let slot = side.index() * 2 + half;

                record[slot] = entry as i32;
                slots_for_faces[entry] = slot as i32;
                blocks_for_faces[entry] = block_index as i32;

                let color = descriptor.color_for_slot(slot, false);
                for vertex in 0..3 {
                    let at = entry * SCALARS_PER_ENTRY + vertex * 3;
                    colors[at..at + 3].copy_from_slice(&color);
                }
            }

            positions[live_len..live_len + SCALARS_PER_FACE]
                .copy_from_slice(&vertices_for_side(position, side));
            live_len += SCALARS_PER_FACE;
            block_has_visible_faces = true;
        }

        if block_has_visible_faces {
            slots[slot_len..slot_len + SLOTS_PER_BLOCK].copy_from_slice(&record);
            blocks_for_records[slot_len / SLOTS_PER_BLOCK] = block_index as i32;
            slot_offsets[block_index] = slot_len as i32;
            slot_len += SLOTS_PER_BLOCK;
        }
    }

    // Trim the scratch buffers down to power-of-two capacities, leaving
    // headroom for incremental edits before the buffer has to grow.
    let face_capacity = (live_len / SCALARS_PER_ENTRY).next_power_of_two().max(16);
    let record_capacity = (slot_len / SLOTS_PER_BLOCK).next_power_of_two().max(8);

    positions.truncate(face_capacity * SCALARS_PER_ENTRY);
    positions.shrink_to_fit();
    colors.truncate(face_capacity * SCALARS_PER_ENTRY);
    colors.shrink_to_fit();
    blocks_for_faces.truncate(face_capacity);
    blocks_for_faces.shrink_to_fit();
    slots_for_faces.truncate(face_capacity);
    slots_for_faces.shrink_to_fit();
    slots.truncate(record_capacity * SLOTS_PER_BLOCK);
    slots.shrink_to_fit();
    blocks_for_records.truncate(record_capacity);
    blocks_for_records.shrink_to_fit();

    FaceBuffer::from_parts(
        positions,
        colors,
        live_len,
        slot_offsets,
        slots,
        slot_len,
        blocks_for_records,
        blocks_for_faces,
        slots_for_faces,
    )
}
