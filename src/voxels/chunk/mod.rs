//! # Chunk Module
//!
//! The `Chunk` owns one 16x16x16 grid of block ids, the face buffer realizing
//! its visible geometry, and the per-edit logic deciding which faces a block
//! edit creates or destroys. Edits whose neighbor falls outside the chunk are
//! forwarded through the [`NeighborResolver`] capability rather than a
//! concrete world type, so the chunk core stays testable in isolation.
//!
//! A chunk can exist in three states: terrain not yet generated (`blocks` is
//! `None` when the generator found no solid blocks), terrain present but
//! geometry not built, and fully meshed. Face operations on an unmeshed chunk
//! are no-ops; the batch builder will see the edited grid when it runs.

use cgmath::Point3;

use crate::meshing::{BlockGrid, BoundaryLayer, FaceBuffer};
use crate::voxels::block::block_side::BlockSide;
use crate::voxels::block::{descriptor_for_id, BlockTypeSize};
use crate::voxels::coordinates::{
    block_index_for_position, position_for_block_index, position_is_within_chunk, CHUNK_DIMENSION,
    CHUNK_SIZE,
};

/// The capability a chunk needs to resolve edits that cross its boundary.
///
/// All positions are world coordinates; the implementor routes them to the
/// correct chunk and local offset. A `World` implements this, but tests can
/// substitute a stub so the chunk/face-buffer core runs without one.
pub trait NeighborResolver {
    /// Returns the block id at a world position, 0 if nothing is there.
    fn block_at(&self, world_position: Point3<i32>) -> BlockTypeSize;

    /// Creates a face for the block at a world position.
    fn create_face_at(&self, world_position: Point3<i32>, side: BlockSide);

    /// Removes a face from the block at a world position.
    fn remove_face_at(&self, world_position: Point3<i32>, side: BlockSide);
}

/// A 16x16x16 collection of voxel blocks and its incremental geometry.
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    pub position: Point3<i32>,

    /// How many of the six adjacent chunks are currently loaded.
    pub loaded_neighbors: u8,

    /// The block grid; `None` when terrain generation produced no solid
    /// blocks for this chunk.
    blocks: Option<Box<BlockGrid>>,

    /// Boundary-layer snapshots of this chunk's own six faces, handed to
    /// neighbors when they build geometry.
    sides: Option<[Box<BoundaryLayer>; 6]>,

    /// Whether each of this chunk's own faces is completely solid. A fully
    /// enclosed chunk needs no geometry of its own.
    sides_are_solid: [bool; 6],

    geometry: Option<FaceBuffer>,
    geometry_dirty: bool,
}

impl Chunk {
    /// Creates a chunk from terrain-generator output. Geometry is installed
    /// separately once the batch builder has run.
    pub fn new(
        position: Point3<i32>,
        blocks: Option<Box<BlockGrid>>,
        sides: Option<[Box<BoundaryLayer>; 6]>,
        sides_are_solid: [bool; 6],
    ) -> Self {
        Chunk {
            position,
            loaded_neighbors: 0,
            blocks,
            sides,
            sides_are_solid,
            geometry: None,
            geometry_dirty: false,
        }
    }

    /// Sets a block and updates the visible faces around it.
    ///
    /// For each of the six directions: a solid neighbor loses the face that
    /// pointed at this cell (it is now hidden), an empty neighbor means the
    /// new block gains a face. Neighbors outside the chunk are resolved
    /// through `resolver`. The new block's faces are created highlighted,
    /// since a just-placed block is the one under the cursor.
    ///
    /// # Arguments
    /// * `position` - Chunk-local coordinates of the edited cell
    /// * `block_id` - The id to store (must be a registered solid block)
    /// * `resolver` - Routes cross-boundary face operations
    pub fn place_block(
        &mut self,
        position: Point3<i32>,
        block_id: BlockTypeSize,
        resolver: &dyn NeighborResolver,
    ) {
        let grid = self
            .blocks
            .get_or_insert_with(|| Box::new([0; CHUNK_SIZE as usize]));
        grid[block_index_for_position(position)] = block_id;

        for side in BlockSide::all() {
            let adjacent = side.adjacent_position(position);
            if position_is_within_chunk(adjacent) {
                if self.block_at_position(adjacent) != 0 {
                    self.remove_block_face(adjacent, side.opposite());
                } else {
                    self.create_block_face(position, side, true);
                }
            } else {
                // The neighboring block is in a different chunk; the resolver
                // finds it for us.
                let adjacent_world = self.world_pos_from_chunk_pos(adjacent);
                if resolver.block_at(adjacent_world) != 0 {
                    resolver.remove_face_at(adjacent_world, side.opposite());
                } else {
                    self.create_block_face(position, side, true);
                }
            }
        }

        self.refresh_geometry();
    }

    /// Clears a block and updates the visible faces around it.
    ///
    /// The mirror image of [`Chunk::place_block`]: solid neighbors gain the
    /// face pointing into the now-empty cell, and the destroyed block's own
    /// faces are removed.
    pub fn destroy_block(&mut self, position: Point3<i32>, resolver: &dyn NeighborResolver) {
        for side in BlockSide::all() {
            let adjacent = side.adjacent_position(position);
            if position_is_within_chunk(adjacent) {
                if self.block_at_position(adjacent) != 0 {
                    self.create_block_face(adjacent, side.opposite(), false);
                } else {
                    self.remove_block_face(position, side);
                }
            } else {
                let adjacent_world = self.world_pos_from_chunk_pos(adjacent);
                if resolver.block_at(adjacent_world) != 0 {
                    resolver.create_face_at(adjacent_world, side.opposite());
                } else {
                    self.remove_block_face(position, side);
                }
            }
        }

        if let Some(grid) = &mut self.blocks {
            grid[block_index_for_position(position)] = 0;
        }
        self.refresh_geometry();
    }

    /// Creates one face for the block at `position`.
    ///
    /// No-op when the chunk has no grid, the cell holds an unregistered id,
    /// or geometry has not been built yet (the batch builder will pick the
    /// face up from the grid instead).
    pub fn create_block_face(&mut self, position: Point3<i32>, side: BlockSide, highlighted: bool) {
        let Some(grid) = &self.blocks else {
            return;
        };
        let block_index = block_index_for_position(position);
        let Some(descriptor) = descriptor_for_id(grid[block_index]) else {
            return;
        };
        if let Some(geometry) = &mut self.geometry {
            geometry.create_face(block_index, side, descriptor, highlighted);
        }
    }

    /// Removes one face from the block at `position`, if it exists.
    pub fn remove_block_face(&mut self, position: Point3<i32>, side: BlockSide) {
        if let Some(geometry) = &mut self.geometry {
            geometry.remove_face(block_index_for_position(position), side);
        }
    }

    /// Switches the block at `position` between its normal and highlighted
    /// palette. Only color data changes; positions are untouched.
    pub fn set_block_highlight(&mut self, position: Point3<i32>, active: bool) {
        let Some(grid) = &self.blocks else {
            return;
        };
        let block_index = block_index_for_position(position);
        let Some(descriptor) = descriptor_for_id(grid[block_index]) else {
            return;
        };
        if let Some(geometry) = &mut self.geometry {
            geometry.set_highlight(block_index, descriptor, active);
        }
    }

    /// Returns the block id at chunk-local coordinates, or 0 if the grid has
    /// not been populated.
    pub fn block_at_position(&self, position: Point3<i32>) -> BlockTypeSize {
        match &self.blocks {
            Some(grid) => grid[block_index_for_position(position)],
            None => 0,
        }
    }

    /// Converts a world position to chunk-local coordinates.
    pub fn chunk_pos_from_world_pos(&self, position: Point3<i32>) -> Point3<i32> {
        Point3::new(
            position.x - self.position.x * CHUNK_DIMENSION,
            position.y - self.position.y * CHUNK_DIMENSION,
            position.z - self.position.z * CHUNK_DIMENSION,
        )
    }

    /// Converts chunk-local coordinates to a world position.
    pub fn world_pos_from_chunk_pos(&self, position: Point3<i32>) -> Point3<i32> {
        Point3::new(
            position.x + self.position.x * CHUNK_DIMENSION,
            position.y + self.position.y * CHUNK_DIMENSION,
            position.z + self.position.z * CHUNK_DIMENSION,
        )
    }

    /// The chunk-local position of the block owning a live triangle entry.
    /// Used to turn a raycast hit back into a block target.
    pub fn position_for_face_entry(&self, entry: usize) -> Option<Point3<i32>> {
        let geometry = self.geometry.as_ref()?;
        Some(position_for_block_index(geometry.block_for_entry(entry)?))
    }

    /// The side of the block a live triangle entry realizes.
    pub fn side_for_face_entry(&self, entry: usize) -> Option<BlockSide> {
        self.geometry.as_ref()?.side_for_entry(entry)
    }

    /// Installs the face buffer produced by the batch geometry builder.
    pub fn install_geometry(&mut self, geometry: FaceBuffer) {
        self.geometry = Some(geometry);
        self.geometry_dirty = true;
    }

    /// Drops built geometry, e.g. when a neighbor unloads and the boundary
    /// visibility has to be recomputed on the next build.
    pub fn clear_geometry(&mut self) {
        self.geometry = None;
    }

    /// The face buffer, if geometry has been built.
    pub fn geometry(&self) -> Option<&FaceBuffer> {
        self.geometry.as_ref()
    }

    /// Whether this chunk holds any terrain data.
    pub fn has_blocks(&self) -> bool {
        self.blocks.is_some()
    }

    /// Whether geometry has been built for this chunk.
    pub fn has_geometry(&self) -> bool {
        self.geometry.is_some()
    }

    /// Whether this chunk needs no further loading work: either it has no
    /// terrain at all, or its geometry is built.
    pub fn is_loaded(&self) -> bool {
        self.blocks.is_none() || self.geometry.is_some()
    }

    /// A snapshot of the grid, taken when dispatching a batch build.
    pub fn blocks_snapshot(&self) -> Option<Box<BlockGrid>> {
        self.blocks.clone()
    }

    /// This chunk's own boundary layer facing `side`, as neighbors consume it
    /// during their batch builds.
    pub fn boundary_side(&self, side: BlockSide) -> Option<&BoundaryLayer> {
        Some(self.sides.as_ref()?[side.index()].as_ref())
    }

    /// Whether this chunk's face on `side` is completely solid.
    pub fn side_is_solid(&self, side: BlockSide) -> bool {
        self.sides_are_solid[side.index()]
    }

    /// Consumes the pending-refresh flag. The rendering collaborator calls
    /// this once per frame and re-uploads buffers (and recomputes normals and
    /// bounding volumes) only when an edit happened.
    pub fn take_geometry_dirty(&mut self) -> bool {
        std::mem::take(&mut self.geometry_dirty)
    }

    fn refresh_geometry(&mut self) {
        // One batched refresh per edit, not one per face.
        self.geometry_dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meshing::batch::build_chunk_geometry;
    use crate::voxels::block::block_type::BlockType;

    /// A resolver for chunks floating in an empty universe.
    struct NoNeighbors;

    impl NeighborResolver for NoNeighbors {
        fn block_at(&self, _world_position: Point3<i32>) -> BlockTypeSize {
            0
        }
        fn create_face_at(&self, _world_position: Point3<i32>, _side: BlockSide) {}
        fn remove_face_at(&self, _world_position: Point3<i32>, _side: BlockSide) {}
    }

    fn meshed_chunk(blocks: Box<BlockGrid>) -> Chunk {
        let geometry = build_chunk_geometry(&blocks, [None; 6]);
        let mut chunk = Chunk::new(Point3::new(0, 0, 0), Some(blocks), None, [false; 6]);
        chunk.install_geometry(geometry);
        chunk
    }

    fn empty_chunk() -> Chunk {
        meshed_chunk(Box::new([0; CHUNK_SIZE as usize]))
    }

    fn slab_chunk() -> Chunk {
        let mut blocks: Box<BlockGrid> = Box::new([0; CHUNK_SIZE as usize]);
        for x in 0..16 {
            for y in 0..8 {
                for z in 0..16 {
                    blocks[block_index_for_position(Point3::new(x, y, z))] = BlockType::DIRT.id();
                }
            }
        }
        meshed_chunk(blocks)
    }

    #[test]
    fn block_lookup_matches_grid() {
        let chunk = slab_chunk();
        assert_eq!(chunk.block_at_position(Point3::new(7, 0, 0)), BlockType::DIRT.id());
        assert_eq!(chunk.block_at_position(Point3::new(7, 7, 15)), BlockType::DIRT.id());
        assert_eq!(chunk.block_at_position(Point3::new(7, 8, 0)), 0);

        let unbuilt = Chunk::new(Point3::new(0, 0, 0), None, None, [false; 6]);
        assert_eq!(unbuilt.block_at_position(Point3::new(0, 0, 0)), 0);
    }

    #[test]
    fn placing_a_floating_block_creates_six_faces() {
        let mut chunk = empty_chunk();
        chunk.place_block(Point3::new(8, 8, 8), BlockType::DIRT.id(), &NoNeighbors);

        assert_eq!(chunk.geometry().unwrap().face_count(), 6);
        assert!(chunk.take_geometry_dirty());
        assert!(!chunk.take_geometry_dirty());
    }

    #[test]
    fn destroy_undoes_place() {
        let mut chunk = empty_chunk();
        chunk.place_block(Point3::new(3, 4, 5), BlockType::DIRT.id(), &NoNeighbors);
        chunk.destroy_block(Point3::new(3, 4, 5), &NoNeighbors);

        assert!(chunk.geometry().unwrap().is_empty());
        assert_eq!(chunk.block_at_position(Point3::new(3, 4, 5)), 0);
        chunk.geometry().unwrap().assert_invariants();
    }

    #[test]
    fn adjacent_blocks_hide_their_shared_faces() {
        let mut chunk = empty_chunk();
        chunk.place_block(Point3::new(8, 8, 8), BlockType::DIRT.id(), &NoNeighbors);
        chunk.place_block(Point3::new(8, 9, 8), BlockType::DIRT.id(), &NoNeighbors);

        // 12 faces for two cubes, minus the two on the shared boundary.
        assert_eq!(chunk.geometry().unwrap().face_count(), 10);
        chunk.geometry().unwrap().assert_invariants();

        // Destroying the upper block re-exposes the lower block's top face.
        chunk.destroy_block(Point3::new(8, 9, 8), &NoNeighbors);
        assert_eq!(chunk.geometry().unwrap().face_count(), 6);
    }

    #[test]
    fn placing_on_the_slab_hides_the_surface_below() {
        let mut chunk = slab_chunk();
        let before = chunk.geometry().unwrap().face_count();
        chunk.place_block(Point3::new(8, 8, 8), BlockType::DIRT.id(), &NoNeighbors);

        // The new block contributes 5 faces and hides one slab face.
        assert_eq!(chunk.geometry().unwrap().face_count(), before + 5 - 1);
        chunk.geometry().unwrap().assert_invariants();
    }

    #[test]
    fn edits_without_geometry_still_update_the_grid() {
        let mut chunk = Chunk::new(Point3::new(0, 0, 0), None, None, [false; 6]);
        chunk.place_block(Point3::new(1, 2, 3), BlockType::LOG.id(), &NoNeighbors);
        assert_eq!(chunk.block_at_position(Point3::new(1, 2, 3)), BlockType::LOG.id());
        assert!(!chunk.has_geometry());
    }

    #[test]
    fn picking_resolves_entries_to_blocks() {
        let mut chunk = empty_chunk();
        chunk.place_block(Point3::new(2, 3, 4), BlockType::DIRT.id(), &NoNeighbors);

        for entry in 0..chunk.geometry().unwrap().live_len() / 9 {
            assert_eq!(chunk.position_for_face_entry(entry), Some(Point3::new(2, 3, 4)));
        }
        assert!(chunk.side_for_face_entry(999).is_none());
    }

    #[test]
    fn coordinate_transforms_are_inverses() {
        let chunk = Chunk::new(Point3::new(2, -1, 3), None, None, [false; 6]);
        let world = Point3::new(37, -10, 50);
        assert_eq!(chunk.world_pos_from_chunk_pos(chunk.chunk_pos_from_world_pos(world)), world);
    }
}
