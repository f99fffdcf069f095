//! # World Module
//!
//! The `World` owns the sparse grid of loaded chunks and routes world
//! coordinates to the owning chunk and local offset. It is the concrete
//! [`NeighborResolver`], so a chunk edit whose neighbor lies across a chunk
//! boundary lands in the right place.
//!
//! The world also coordinates geometry building: it wires neighbor counts as
//! terrain arrives, snapshots a chunk's grid plus the six facing boundary
//! layers into a [`GeometryBuildRequest`] once the chunk qualifies, and
//! installs (or discards, if the chunk was unloaded meanwhile) the face
//! buffers the batch builder returns. At most one build is in flight per
//! chunk.

use std::collections::{HashMap, HashSet};

use cgmath::Point3;
use log::{debug, warn};

use crate::core::MtResource;
use crate::meshing::{BlockGrid, BoundaryLayer, FaceBuffer};
use crate::terrain::ChunkTerrain;
use crate::voxels::block::block_side::BlockSide;
use crate::voxels::block::BlockTypeSize;
use crate::voxels::chunk::{Chunk, NeighborResolver};
use crate::voxels::coordinates::CHUNK_DIMENSION;

/// Everything the batch geometry builder needs, snapshotted so the build can
/// run on a worker thread without touching shared state.
pub struct GeometryBuildRequest {
    /// Which chunk this build is for.
    pub position: Point3<i32>,
    /// Copy of the chunk's grid at dispatch time.
    pub blocks: Box<BlockGrid>,
    /// The six neighboring chunks' facing boundary layers, `None` where the
    /// neighbor holds no terrain.
    pub neighbor_sides: [Option<Box<BoundaryLayer>>; 6],
}

/// A sparse voxel world composed of 16x16x16 chunks.
pub struct World {
    /// A mapping from chunk coordinates to chunk data. Chunks are stored in a
    /// thread-safe reference-counted wrapper so a worker result handler and
    /// the edit path can both reach them.
    pub chunks: HashMap<Point3<i32>, MtResource<Chunk>>,

    /// Chunks with a batch build currently in flight. A second build for the
    /// same chunk must not start before the first result is consumed.
    pending_geometry: HashSet<Point3<i32>>,

    /// Running total of geometry installs, for progress logging.
    chunks_meshed: usize,
}

impl World {
    /// Creates a new, empty world.
    pub fn new() -> Self {
        World {
            chunks: HashMap::new(),
            pending_geometry: HashSet::new(),
            chunks_meshed: 0,
        }
    }

    /// The chunk coordinates containing a world position.
    pub fn chunk_coords_for_position(position: Point3<i32>) -> Point3<i32> {
        Point3::new(
            position.x.div_euclid(CHUNK_DIMENSION),
            position.y.div_euclid(CHUNK_DIMENSION),
            position.z.div_euclid(CHUNK_DIMENSION),
        )
    }

    /// Retrieves the chunk at the given chunk coordinates.
    pub fn chunk_at_coords(&self, coords: Point3<i32>) -> Option<MtResource<Chunk>> {
        self.chunks.get(&coords).cloned()
    }

    /// Runs `operation` against the chunk containing a world position,
    /// passing the chunk and the chunk-local coordinates. Returns `None` when
    /// no chunk is loaded there.
    pub fn with_chunk<R>(
        &self,
        position: Point3<i32>,
        operation: impl FnOnce(&MtResource<Chunk>, Point3<i32>) -> R,
    ) -> Option<R> {
        let coords = Self::chunk_coords_for_position(position);
        let chunk = self.chunks.get(&coords)?.clone();
        let local = Point3::new(
            position.x - coords.x * CHUNK_DIMENSION,
            position.y - coords.y * CHUNK_DIMENSION,
            position.z - coords.z * CHUNK_DIMENSION,
        );
        Some(operation(&chunk, local))
    }

    /// Places a block at a world position, updating faces on both sides of
    /// any chunk boundary the edit touches.
    pub fn place_block(&self, position: Point3<i32>, block_id: BlockTypeSize) {
        self.with_chunk(position, |chunk, local| {
            chunk.get_mut().place_block(local, block_id, self);
        });
    }

    /// Destroys the block at a world position.
    pub fn destroy_block(&self, position: Point3<i32>) {
        self.with_chunk(position, |chunk, local| {
            chunk.get_mut().destroy_block(local, self);
        });
    }

    /// Switches the block at a world position between its normal and
    /// highlighted palette.
    pub fn set_block_highlight(&self, position: Point3<i32>, active: bool) {
        self.with_chunk(position, |chunk, local| {
            chunk.get_mut().set_block_highlight(local, active);
        });
    }

    /// The block id at a world position, 0 when nothing is loaded there.
    pub fn block_at_position(&self, position: Point3<i32>) -> BlockTypeSize {
        self.with_chunk(position, |chunk, local| chunk.get().block_at_position(local))
            .unwrap_or(0)
    }

    /// Resolves a raycast hit (chunk + triangle entry) to the world position
    /// and side of the block it belongs to.
    pub fn block_target_for_entry(
        &self,
        chunk_coords: Point3<i32>,
        entry: usize,
    ) -> Option<(Point3<i32>, BlockSide)> {
        let chunk = self.chunk_at_coords(chunk_coords)?;
        let chunk = chunk.get();
        let local = chunk.position_for_face_entry(entry)?;
        let side = chunk.side_for_face_entry(entry)?;
        Some((chunk.world_pos_from_chunk_pos(local), side))
    }

    /// Installs freshly generated terrain and returns the batch builds it
    /// unlocks.
    ///
    /// Each new chunk is wired into its neighbors' `loaded_neighbors` counts;
    /// then the new chunk and all six neighbors are checked against
    /// [`World::geometry_request_for`], since any of them may just have
    /// gained its sixth neighbor.
    pub fn install_terrain(&mut self, chunks: Vec<ChunkTerrain>) -> Vec<GeometryBuildRequest> {
        let mut to_build = Vec::new();

        for terrain in chunks {
            if self.chunks.contains_key(&terrain.position) {
                continue;
            }

            let mut chunk = Chunk::new(
                terrain.position,
                terrain.blocks,
                terrain.sides,
                terrain.sides_are_solid,
            );
            for side in BlockSide::all() {
                let neighbor_coords = side.adjacent_position(terrain.position);
                if let Some(neighbor) = self.chunks.get(&neighbor_coords) {
                    chunk.loaded_neighbors += 1;
                    neighbor.get_mut().loaded_neighbors += 1;
                }
            }
            debug!(
                "installed terrain for chunk {:?} ({} neighbors loaded)",
                terrain.position, chunk.loaded_neighbors
            );
            let position = terrain.position;
            self.chunks.insert(position, MtResource::new(chunk));

            if let Some(request) = self.geometry_request_for(position) {
                to_build.push(request);
            }
            for side in BlockSide::all() {
                if let Some(request) = self.geometry_request_for(side.adjacent_position(position)) {
                    to_build.push(request);
                }
            }
        }

        to_build
    }

    /// Snapshots a batch-build request for a chunk, if it qualifies: terrain
    /// present, no geometry built or in flight, all six neighbors loaded, and
    /// at least one neighboring face not fully solid (a completely enclosed
    /// chunk has nothing visible to mesh).
    fn geometry_request_for(&mut self, coords: Point3<i32>) -> Option<GeometryBuildRequest> {
        if self.pending_geometry.contains(&coords) {
            return None;
        }
        let chunk = self.chunks.get(&coords)?.clone();
        let chunk = chunk.get();
        if !chunk.has_blocks() || chunk.has_geometry() || chunk.loaded_neighbors != 6 {
            return None;
        }

        let mut any_side_visible = false;
        let mut neighbor_sides: [Option<Box<BoundaryLayer>>; 6] = Default::default();
        for side in BlockSide::all() {
            let neighbor = self.chunks.get(&side.adjacent_position(coords))?.clone();
            let neighbor = neighbor.get();
            if !neighbor.has_blocks() || !neighbor.side_is_solid(side.opposite()) {
                any_side_visible = true;
            }
            neighbor_sides[side.index()] = neighbor
                .boundary_side(side.opposite())
                .map(|layer| Box::new(*layer));
        }
        if !any_side_visible {
            return None;
        }

        let blocks = chunk.blocks_snapshot()?;
        self.pending_geometry.insert(coords);
        Some(GeometryBuildRequest {
            position: coords,
            blocks,
            neighbor_sides,
        })
    }

    /// Installs a batch-build result, or discards it when the chunk was
    /// unloaded while the build was in flight.
    pub fn install_geometry(&mut self, position: Point3<i32>, geometry: FaceBuffer) {
        self.pending_geometry.remove(&position);
        match self.chunks.get(&position) {
            Some(chunk) => {
                chunk.get_mut().install_geometry(geometry);
                self.chunks_meshed += 1;
                debug!("installed geometry for chunk {:?}", position);
            }
            None => {
                warn!("discarding stale geometry for unloaded chunk {:?}", position);
            }
        }
    }

    /// Unloads chunks, unwiring neighbor counts. Neighbors keep their terrain
    /// but drop built geometry: their boundary visibility must be recomputed
    /// against the now-missing chunk on their next build.
    pub fn unload_chunks(&mut self, positions: &[Point3<i32>]) {
        for &coords in positions {
            if self.chunks.remove(&coords).is_none() {
                continue;
            }
            self.pending_geometry.remove(&coords);
            for side in BlockSide::all() {
                if let Some(neighbor) = self.chunks.get(&side.adjacent_position(coords)) {
                    let mut neighbor = neighbor.get_mut();
                    neighbor.loaded_neighbors -= 1;
                    if neighbor.has_geometry() {
                        neighbor.clear_geometry();
                    }
                }
            }
        }
    }

    /// Number of loaded chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Running total of installed batch builds.
    pub fn chunks_meshed(&self) -> usize {
        self.chunks_meshed
    }

    /// Total live vertices across all meshed chunks.
    pub fn total_vertex_count(&self) -> usize {
        self.chunks
            .values()
            .map(|chunk| chunk.get().geometry().map_or(0, |g| g.vertex_count()))
            .sum()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl NeighborResolver for World {
    fn block_at(&self, world_position: Point3<i32>) -> BlockTypeSize {
        self.block_at_position(world_position)
    }

    fn create_face_at(&self, world_position: Point3<i32>, side: BlockSide) {
        self.with_chunk(world_position, |chunk, local| {
            chunk.get_mut().create_block_face(local, side, false);
        });
    }

    fn remove_face_at(&self, world_position: Point3<i32>, side: BlockSide) {
        self.with_chunk(world_position, |chunk, local| {
            chunk.get_mut().remove_block_face(local, side);
        });
    }
}
