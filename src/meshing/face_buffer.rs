//! # Face Buffer Module
//!
//! The per-chunk slab allocator that keeps a chunk's vertex and color streams
//! dense across incremental block edits.
//!
//! To make single-face edits O(1) without re-scanning the chunk, the buffer
//! maintains five co-indexed flat tables alongside the two compact streams:
//!
//! - `slot_offsets` maps each block index to the offset of its 12-slot record
//!   in `slots`, or -1 if the block currently has no visible faces.
//! - `slots` is a heap of 12-slot records (6 sides x 2 triangle halves). Each
//!   slot holds the triangle-entry index realizing that face half, or -1.
//!   Space is only allocated for blocks with at least one visible face.
//! - `blocks_for_records` maps each record position (`offset / 12`) back to
//!   the owning block, needed to relocate a record during compaction.
//! - `blocks_for_faces` and `slots_for_faces` map each live triangle entry
//!   back to its owning block and slot, needed to rewrite the mover's record
//!   when a tail entry is swapped into a freed position.
//!
//! A triangle entry is 9 scalars (3 vertices x xyz) in `positions` and the
//! same count in `colors`; a face is two entries. All live data occupies
//! `[0, live_len)` scalars. Removal swaps the tail entry into the hole and
//! rewrites the moved entry's back-pointers, so the streams never develop
//! gaps; the record heap is compacted the same way when a block loses its
//! last face.

use crate::meshing::face_geometry::{vertices_for_side, SCALARS_PER_FACE};
use crate::voxels::block::block_side::BlockSide;
use crate::voxels::block::BlockDescriptor;
use crate::voxels::coordinates::{position_for_block_index, CHUNK_SIZE};

/// Slots per block record: 6 sides x 2 triangle halves.
pub const SLOTS_PER_BLOCK: usize = 12;
/// Position/color scalars per triangle entry (3 vertices x 3 components).
pub const SCALARS_PER_ENTRY: usize = 9;

const MIN_FACE_CAPACITY: usize = 16;
const MIN_RECORD_CAPACITY: usize = 8;

/// A chunk's compact face geometry plus the index tables that make
/// incremental face edits O(1).
pub struct FaceBuffer {
    positions: Vec<f32>,
    colors: Vec<f32>,
    /// Number of live scalars in `positions`/`colors`; always a multiple of 9.
    live_len: usize,
    /// Block index -> offset of its record in `slots`, or -1.
    slot_offsets: Vec<i32>,
    /// The record heap; used length is `slot_len`, a multiple of 12.
    slots: Vec<i32>,
    slot_len: usize,
    /// Record position -> owning block index, or -1.
    blocks_for_records: Vec<i32>,
    /// Triangle entry -> owning block index, or -1 beyond the live range.
    blocks_for_faces: Vec<i32>,
    /// Triangle entry -> slot within the owner's record, or -1.
    slots_for_faces: Vec<i32>,
}

impl FaceBuffer {
    /// Creates an empty face buffer with no geometry allocated.
    pub fn new() -> Self {
        FaceBuffer {
            positions: Vec::new(),
            colors: Vec::new(),
            live_len: 0,
            slot_offsets: vec![-1; CHUNK_SIZE as usize],
            slots: Vec::new(),
            slot_len: 0,
            blocks_for_records: Vec::new(),
            blocks_for_faces: Vec::new(),
            slots_for_faces: Vec::new(),
        }
    }

    /// Assembles a face buffer from pre-populated tables.
    ///
    /// Used by the batch geometry builder, which fills the same layout in a
    /// single dense pass instead of repeated `create_face` calls.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        positions: Vec<f32>,
        colors: Vec<f32>,
        live_len: usize,
        slot_offsets: Vec<i32>,
        slots: Vec<i32>,
        slot_len: usize,
        blocks_for_records: Vec<i32>,
        blocks_for_faces: Vec<i32>,
        slots_for_faces: Vec<i32>,
    ) -> Self {
        let buffer = FaceBuffer {
            positions,
            colors,
            live_len,
            slot_offsets,
            slots,
            slot_len,
            blocks_for_records,
            blocks_for_faces,
            slots_for_faces,
        };
        debug_assert!({
            buffer.assert_invariants();
            true
        });
        buffer
    }

    /// Writes one face (two triangle entries) for `block_index` on `side`.
    ///
    /// Appends at the end of the compact streams and never relocates any
    /// other block's data, so only the newly written ranges need re-upload.
    /// The block's 12-slot record is allocated lazily on its first face.
    ///
    /// # Arguments
    /// * `block_index` - Linear index of the block gaining the face
    /// * `side` - Which side of the block becomes visible
    /// * `block` - Palette source for the face colors
    /// * `highlighted` - Whether to use the highlight palette
    pub fn create_face(
        &mut self,
        block_index: usize,
        side: BlockSide,
        block: &BlockDescriptor,
        highlighted: bool,
    ) {
        self.ensure_face_capacity();

        if self.slot_offsets[block_index] == -1 {
            self.ensure_record_capacity();
            self.slot_offsets[block_index] = self.slot_len as i32;
            self.blocks_for_records[self.slot_len / SLOTS_PER_BLOCK] = block_index as i32;
            self.slot_len += SLOTS_PER_BLOCK;
        }

        let offset = self.slot_offsets[block_index] as usize;
        for half in 0..2 {
            let entry = self.live_len / SCALARS_PER_ENTRY + half;
            let slot = side.index() * 2 + half;
            debug_assert_eq!(
                self.slots[offset + slot],
                -1,
                "face already exists for block {} side {:?}",
                block_index,
                side
            );

            self.slots[offset + slot] = entry as i32;
            self.slots_for_faces[entry] = slot as i32;
            self.blocks_for_faces[entry] = block_index as i32;

            let color = block.color_for_slot(slot, highlighted);
            for vertex in 0..3 {
                let at = entry * SCALARS_PER_ENTRY + vertex * 3;
                self.colors[at..at + 3].copy_from_slice(&color);
            }
        }

        let vertices = vertices_for_side(position_for_block_index(block_index), side);
        self.positions[self.live_len..self.live_len + SCALARS_PER_FACE].copy_from_slice(&vertices);
        self.live_len += SCALARS_PER_FACE;
    }

    /// Removes the face for `block_index` on `side`, if present.
    ///
    /// Idempotent: removing a face that does not exist is a no-op, because
    /// block edits call this speculatively based on neighbor solidity.
    ///
    /// Each present half is freed by swap-compaction: the tail triangle entry
    /// is copied into the hole and the *moved* entry's record slot and
    /// back-pointers are rewritten to its new position. When the block's last
    /// face goes away, its 12-slot record is freed by the same swap technique
    /// at the record tier. At most one relocation happens per tier per call.
    pub fn remove_face(&mut self, block_index: usize, side: BlockSide) {
        if self.slot_offsets[block_index] == -1 {
            return;
        }
        let offset = self.slot_offsets[block_index] as usize;

        for half in 0..2 {
            let slot = side.index() * 2 + half;
            let entry = self.slots[offset + slot];
            if entry == -1 {
                continue;
            }
            let entry = entry as usize;
            let last = self.live_len / SCALARS_PER_ENTRY - 1;

            if entry != last {
                self.positions.copy_within(
                    last * SCALARS_PER_ENTRY..(last + 1) * SCALARS_PER_ENTRY,
                    entry * SCALARS_PER_ENTRY,
                );
                self.colors.copy_within(
                    last * SCALARS_PER_ENTRY..(last + 1) * SCALARS_PER_ENTRY,
                    entry * SCALARS_PER_ENTRY,
                );

                // Re-point the mover's record at the entry's new position.
                let moved_block = self.blocks_for_faces[last];
                let moved_slot = self.slots_for_faces[last];
                let moved_offset = self.slot_offsets[moved_block as usize] + moved_slot;
                self.slots[moved_offset as usize] = entry as i32;
                self.slots_for_faces[entry] = moved_slot;
                self.blocks_for_faces[entry] = moved_block;
            }

            self.slots[offset + slot] = -1;
            self.slots_for_faces[last] = -1;
            self.blocks_for_faces[last] = -1;
            self.live_len -= SCALARS_PER_ENTRY;
        }

        // Free the record once every slot is empty.
        if self.slots[offset..offset + SLOTS_PER_BLOCK].iter().all(|&slot| slot == -1) {
            let record = offset / SLOTS_PER_BLOCK;
            let last_record = self.slot_len / SLOTS_PER_BLOCK - 1;

            if record != last_record {
                let source = last_record * SLOTS_PER_BLOCK;
                self.slots.copy_within(source..source + SLOTS_PER_BLOCK, offset);

                let moved_block = self.blocks_for_records[last_record];
                self.blocks_for_records[record] = moved_block;
                self.slot_offsets[moved_block as usize] = offset as i32;
            }

            self.blocks_for_records[last_record] = -1;
            self.slot_offsets[block_index] = -1;
            self.slot_len -= SLOTS_PER_BLOCK;

            // The vacated tail must read as unallocated for the next block
            // that claims it.
            let tail = self.slot_len;
            for slot in &mut self.slots[tail..tail + SLOTS_PER_BLOCK] {
                *slot = -1;
            }
        }
    }

    /// Rewrites the color scalars (positions untouched) for every live face
    /// of `block_index`, switching between the normal and highlight palettes.
    pub fn set_highlight(&mut self, block_index: usize, block: &BlockDescriptor, active: bool) {
        if self.slot_offsets[block_index] == -1 {
            return;
        }
        let offset = self.slot_offsets[block_index] as usize;

        for slot in 0..SLOTS_PER_BLOCK {
            let entry = self.slots[offset + slot];
            if entry == -1 {
                continue;
            }
            let color = block.color_for_slot(slot, active);
            for vertex in 0..3 {
                let at = entry as usize * SCALARS_PER_ENTRY + vertex * 3;
                self.colors[at..at + 3].copy_from_slice(&color);
            }
        }
    }

    /// The live position scalars, ready for GPU upload.
    pub fn positions(&self) -> &[f32] {
        &self.positions[..self.live_len]
    }

    /// The live color scalars, ready for GPU upload.
    pub fn colors(&self) -> &[f32] {
        &self.colors[..self.live_len]
    }

    /// The live position stream as raw bytes.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.positions())
    }

    /// The live color stream as raw bytes.
    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.colors())
    }

    /// Number of live scalars; always a multiple of 9.
    pub fn live_len(&self) -> usize {
        self.live_len
    }

    /// Number of live vertices (the renderer's draw count).
    pub fn vertex_count(&self) -> usize {
        self.live_len / 3
    }

    /// Number of visible faces (two triangle entries each).
    pub fn face_count(&self) -> usize {
        self.live_len / SCALARS_PER_FACE
    }

    /// Number of blocks that currently have at least one visible face.
    pub fn record_count(&self) -> usize {
        self.slot_len / SLOTS_PER_BLOCK
    }

    /// Whether the buffer holds no live geometry.
    pub fn is_empty(&self) -> bool {
        self.live_len == 0
    }

    /// The block owning a live triangle entry, used for picking.
    pub fn block_for_entry(&self, entry: usize) -> Option<usize> {
        if entry >= self.live_len / SCALARS_PER_ENTRY {
            return None;
        }
        Some(self.blocks_for_faces[entry] as usize)
    }

    /// The side a live triangle entry belongs to, used for picking.
    pub fn side_for_entry(&self, entry: usize) -> Option<BlockSide> {
        if entry >= self.live_len / SCALARS_PER_ENTRY {
            return None;
        }
        Some(BlockSide::from_index(self.slots_for_faces[entry] as usize / 2))
    }

    fn ensure_face_capacity(&mut self) {
        let needed = self.live_len / SCALARS_PER_ENTRY + 2;
        if needed <= self.blocks_for_faces.len() {
            return;
        }
        let capacity = needed.next_power_of_two().max(MIN_FACE_CAPACITY);
        self.positions.resize(capacity * SCALARS_PER_ENTRY, 0.0);
        self.colors.resize(capacity * SCALARS_PER_ENTRY, 0.0);
        self.blocks_for_faces.resize(capacity, -1);
        self.slots_for_faces.resize(capacity, -1);
    }

    fn ensure_record_capacity(&mut self) {
        let needed = self.slot_len / SLOTS_PER_BLOCK + 1;
        if needed <= self.blocks_for_records.len() {
            return;
        }
        let capacity = needed.next_power_of_two().max(MIN_RECORD_CAPACITY);
        self.slots.resize(capacity * SLOTS_PER_BLOCK, -1);
        self.blocks_for_records.resize(capacity, -1);
    }

    /// Verifies every structural invariant, panicking on the first violation.
    ///
    /// Table corruption is a programming-logic fault: it must never be
    /// silently patched, since continuing risks corrupting later compactions.
    /// This is O(buffer) and intended for tests and debug assertions.
    pub fn assert_invariants(&self) {
        assert_eq!(self.live_len % SCALARS_PER_ENTRY, 0, "live_len not entry-aligned");
        assert_eq!(self.slot_len % SLOTS_PER_BLOCK, 0, "slot_len not record-aligned");
        assert_eq!(self.positions.len(), self.colors.len());
        assert!(self.live_len <= self.positions.len());
        assert!(self.slot_len <= self.slots.len());

        let live_entries = self.live_len / SCALARS_PER_ENTRY;
        let records = self.slot_len / SLOTS_PER_BLOCK;

        // Records and their owners agree in both directions.
        let mut blocks_with_faces = 0;
        for (block_index, &offset) in self.slot_offsets.iter().enumerate() {
            if offset == -1 {
                continue;
            }
            blocks_with_faces += 1;
            let offset = offset as usize;
            assert!(offset + SLOTS_PER_BLOCK <= self.slot_len);
            assert_eq!(
                self.blocks_for_records[offset / SLOTS_PER_BLOCK] as usize,
                block_index,
                "record {} does not point back at block {}",
                offset / SLOTS_PER_BLOCK,
                block_index
            );
            assert!(
                self.slots[offset..offset + SLOTS_PER_BLOCK].iter().any(|&slot| slot != -1),
                "block {} owns an all-empty record",
                block_index
            );
        }
        assert_eq!(blocks_with_faces, records, "record heap length mismatch");

        // Every live entry is pointed at by exactly the slot it claims.
        let mut slot_references = 0;
        for entry in 0..live_entries {
            let block = self.blocks_for_faces[entry];
            let slot = self.slots_for_faces[entry];
            assert!(block != -1 && slot != -1, "live entry {} lacks back-pointers", entry);
            let offset = self.slot_offsets[block as usize];
            assert_ne!(offset, -1, "entry {} owned by recordless block {}", entry, block);
            assert_eq!(
                self.slots[(offset + slot) as usize] as usize,
                entry,
                "slot does not point back at entry {}",
                entry
            );
        }
        for offset in 0..self.slot_len {
            if self.slots[offset] != -1 {
                slot_references += 1;
                assert!((self.slots[offset] as usize) < live_entries, "slot points past live range");
            }
        }
        assert_eq!(slot_references, live_entries, "dangling or duplicated slots");

        // Nothing beyond the live range may carry back-pointers.
        for entry in live_entries..self.blocks_for_faces.len() {
            assert_eq!(self.blocks_for_faces[entry], -1);
            assert_eq!(self.slots_for_faces[entry], -1);
        }
        for record in records..self.blocks_for_records.len() {
            assert_eq!(self.blocks_for_records[record], -1);
        }
        for offset in self.slot_len..self.slots.len() {
            assert_eq!(self.slots[offset], -1);
        }
    }
}

impl Default for FaceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxels::block::descriptor_for_id;
    use crate::voxels::block::block_type::BlockType;
    use crate::voxels::coordinates::block_index_for_position;
    use cgmath::Point3;
    use std::collections::HashSet;

    fn dirt() -> &'static BlockDescriptor {
        descriptor_for_id(BlockType::DIRT.id()).unwrap()
    }

    fn snapshot(buffer: &FaceBuffer) -> (usize, usize, Vec<i32>, Vec<i32>, Vec<i32>, Vec<i32>, Vec<i32>, Vec<f32>) {
        (
            buffer.live_len,
            buffer.slot_len,
            buffer.slot_offsets.clone(),
            buffer.slots[..buffer.slot_len].to_vec(),
            buffer.blocks_for_records[..buffer.record_count()].to_vec(),
            buffer.blocks_for_faces[..buffer.live_len / SCALARS_PER_ENTRY].to_vec(),
            buffer.slots_for_faces[..buffer.live_len / SCALARS_PER_ENTRY].to_vec(),
            buffer.positions[..buffer.live_len].to_vec(),
        )
    }

    #[test]
    fn create_then_remove_restores_everything() {
        let mut buffer = FaceBuffer::new();
        buffer.create_face(100, BlockSide::UP, dirt(), false);
        buffer.create_face(200, BlockSide::WEST, dirt(), false);
        let before = snapshot(&buffer);

        buffer.create_face(300, BlockSide::NORTH, dirt(), false);
        buffer.assert_invariants();
        buffer.remove_face(300, BlockSide::NORTH);
        buffer.assert_invariants();

        assert_eq!(snapshot(&buffer), before);
    }

    #[test]
    fn removal_is_idempotent() {
        let mut buffer = FaceBuffer::new();
        buffer.create_face(7, BlockSide::UP, dirt(), false);
        buffer.create_face(7, BlockSide::DOWN, dirt(), false);

        buffer.remove_face(7, BlockSide::UP);
        let after_first = snapshot(&buffer);
        buffer.remove_face(7, BlockSide::UP);
        assert_eq!(snapshot(&buffer), after_first);

        // A block with no record at all is also a no-op.
        buffer.remove_face(9, BlockSide::UP);
        assert_eq!(snapshot(&buffer), after_first);
        buffer.assert_invariants();
    }

    #[test]
    fn swap_compaction_repoints_the_mover() {
        let mut buffer = FaceBuffer::new();
        buffer.create_face(1, BlockSide::UP, dirt(), false);
        buffer.create_face(2, BlockSide::UP, dirt(), false);
        buffer.create_face(3, BlockSide::UP, dirt(), false);

        // Freeing block 1's entries moves block 3's entries into the hole.
        buffer.remove_face(1, BlockSide::UP);
        buffer.assert_invariants();
        assert_eq!(buffer.face_count(), 2);
        assert_eq!(buffer.record_count(), 2);

        // The relocated entries must still resolve to block 3.
        let owners: HashSet<usize> =
            (0..buffer.live_len / SCALARS_PER_ENTRY).map(|entry| buffer.block_for_entry(entry).unwrap()).collect();
        assert_eq!(owners, HashSet::from([2, 3]));
        for entry in 0..buffer.live_len / SCALARS_PER_ENTRY {
            assert_eq!(buffer.side_for_entry(entry), Some(BlockSide::UP));
        }
    }

    #[test]
    fn record_compaction_relocates_the_last_record() {
        let mut buffer = FaceBuffer::new();
        buffer.create_face(10, BlockSide::UP, dirt(), false);
        buffer.create_face(20, BlockSide::UP, dirt(), false);
        buffer.create_face(30, BlockSide::UP, dirt(), false);

        // Block 20's record is in the middle; freeing it moves block 30's
        // record down, which must update both reverse maps.
        buffer.remove_face(20, BlockSide::UP);
        buffer.assert_invariants();
        assert_eq!(buffer.record_count(), 2);
        assert_eq!(buffer.slot_offsets[30], SLOTS_PER_BLOCK as i32);
        assert_eq!(buffer.slot_offsets[20], -1);
    }

    #[test]
    fn highlight_touches_colors_only() {
        let mut buffer = FaceBuffer::new();
        let grass = descriptor_for_id(BlockType::GRASS.id()).unwrap();
        buffer.create_face(42, BlockSide::UP, grass, false);
        buffer.create_face(42, BlockSide::NORTH, grass, false);

        let positions_before = buffer.position_bytes().to_vec();
        let colors_before = buffer.colors().to_vec();

        buffer.set_highlight(42, grass, true);
        assert_eq!(buffer.position_bytes(), positions_before.as_slice());
        assert_ne!(buffer.colors(), colors_before.as_slice());

        buffer.set_highlight(42, grass, false);
        assert_eq!(buffer.colors(), colors_before.as_slice());
        buffer.assert_invariants();
    }

    #[test]
    fn density_holds_under_random_edits() {
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        let mut buffer = FaceBuffer::new();
        let mut model: HashSet<(usize, usize)> = HashSet::new();
        let blocks: Vec<usize> = (0..48)
            .map(|_| {
                block_index_for_position(Point3::new(
                    rng.i32(0..16),
                    rng.i32(0..16),
                    rng.i32(0..16),
                ))
            })
            .collect();

        for _ in 0..2000 {
            let block = blocks[rng.usize(0..blocks.len())];
            let side = BlockSide::from_index(rng.usize(0..6));
            if model.contains(&(block, side.index())) || rng.bool() && !model.is_empty() {
                buffer.remove_face(block, side);
                model.remove(&(block, side.index()));
            } else {
                buffer.create_face(block, side, dirt(), false);
                model.insert((block, side.index()));
            }

            assert_eq!(buffer.live_len(), SCALARS_PER_FACE * model.len());
            assert_eq!(buffer.face_count(), model.len());
        }
        buffer.assert_invariants();

        let owners: HashSet<(usize, usize)> = (0..buffer.live_len / SCALARS_PER_ENTRY)
            .map(|entry| {
                (
                    buffer.block_for_entry(entry).unwrap(),
                    buffer.side_for_entry(entry).unwrap().index(),
                )
            })
            .collect();
        assert_eq!(owners, model);
    }
}
