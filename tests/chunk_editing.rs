//! End-to-end tests of chunk editing through the public API: slab fixtures,
//! edits crossing chunk boundaries, and the dense-buffer guarantees a
//! renderer relies on.

use cgmath::Point3;

use voxel_mesher::core::MtResource;
use voxel_mesher::meshing::batch::build_chunk_geometry;
use voxel_mesher::meshing::BlockGrid;
use voxel_mesher::terrain::boundary_layer;
use voxel_mesher::voxels::block::block_side::BlockSide;
use voxel_mesher::voxels::block::block_type::BlockType;
use voxel_mesher::voxels::chunk::Chunk;
use voxel_mesher::voxels::coordinates::{block_index_for_position, CHUNK_SIZE};
use voxel_mesher::voxels::world::World;

const SCALARS_PER_FACE: usize = 18;

fn slab_grid(height: i32) -> Box<BlockGrid> {
    let mut blocks: Box<BlockGrid> = Box::new([0; CHUNK_SIZE as usize]);
    for x in 0..16 {
        for y in 0..height {
            for z in 0..16 {
                blocks[block_index_for_position(Point3::new(x, y, z))] = BlockType::DIRT.id();
            }
        }
    }
    blocks
}

fn install_meshed_chunk(world: &mut World, coords: Point3<i32>, blocks: Box<BlockGrid>) {
    let geometry = build_chunk_geometry(&blocks, [None; 6]);
    let mut sides_are_solid = [false; 6];
    let sides = BlockSide::all().map(|side| {
        let (layer, is_solid) = boundary_layer(&blocks, side);
        sides_are_solid[side.index()] = is_solid;
        layer
    });
    let mut chunk = Chunk::new(coords, Some(blocks), Some(sides), sides_are_solid);
    chunk.install_geometry(geometry);
    world.chunks.insert(coords, MtResource::new(chunk));
}

/// Normalizes a buffer into its set of live triangle entries (positions and
/// colors as bit patterns), insensitive to entry order.
fn face_set(geometry: &voxel_mesher::meshing::FaceBuffer) -> std::collections::BTreeSet<Vec<u32>> {
    let positions = geometry.positions();
    let colors = geometry.colors();
    (0..geometry.live_len() / 9)
        .map(|entry| {
            positions[entry * 9..(entry + 1) * 9]
                .iter()
                .chain(&colors[entry * 9..(entry + 1) * 9])
                .map(|scalar| scalar.to_bits())
                .collect()
        })
        .collect()
}

fn face_count(world: &World, coords: Point3<i32>) -> usize {
    world
        .chunk_at_coords(coords)
        .unwrap()
        .get()
        .geometry()
        .unwrap()
        .face_count()
}

#[test]
fn slab_chunk_meshes_to_the_expected_face_count() {
    let mut world = World::new();
    install_meshed_chunk(&mut world, Point3::new(0, 0, 0), slab_grid(8));

    // Top and bottom of the slab, plus four 16x8 sides.
    let expected = 2 * 16 * 16 + 4 * 16 * 8;
    assert_eq!(face_count(&world, Point3::new(0, 0, 0)), expected);

    let chunk = world.chunk_at_coords(Point3::new(0, 0, 0)).unwrap();
    let chunk = chunk.get();
    let geometry = chunk.geometry().unwrap();
    geometry.assert_invariants();
    assert_eq!(geometry.live_len(), expected * SCALARS_PER_FACE);
    assert_eq!(geometry.positions().len() % 9, 0);
}

#[test]
fn an_edit_session_returns_to_the_starting_state() {
    let mut world = World::new();
    install_meshed_chunk(&mut world, Point3::new(0, 0, 0), slab_grid(8));

    let chunk = world.chunk_at_coords(Point3::new(0, 0, 0)).unwrap();
    let baseline = face_set(chunk.get().geometry().unwrap());

    // Build a little tower on the slab, then tear it down in a different
    // order than it was built.
    for y in 8..12 {
        world.place_block(Point3::new(5, y, 5), BlockType::LOG.id());
    }
    world.set_block_highlight(Point3::new(5, 11, 5), true);
    world.set_block_highlight(Point3::new(5, 11, 5), false);
    for y in [9, 11, 8, 10] {
        world.destroy_block(Point3::new(5, y, 5));
    }

    let guard = chunk.get();
    let geometry = guard.geometry().unwrap();
    geometry.assert_invariants();
    // Swap-compaction may have reordered entries, but the set of live faces
    // (with their colors) must be exactly what it was before the session.
    assert_eq!(face_set(geometry), baseline);
}

#[test]
fn edits_across_a_chunk_boundary_stay_consistent() {
    let mut world = World::new();
    install_meshed_chunk(&mut world, Point3::new(0, 0, 0), slab_grid(8));
    install_meshed_chunk(&mut world, Point3::new(1, 0, 0), Box::new([0; CHUNK_SIZE as usize]));

    let slab_faces = face_count(&world, Point3::new(0, 0, 0));

    // A block hugging the boundary from the empty side: five new faces in
    // the empty chunk (its west face presses against the slab) and one slab
    // face hidden.
    world.place_block(Point3::new(16, 4, 8), BlockType::DIRT.id());
    assert_eq!(face_count(&world, Point3::new(1, 0, 0)), 5);
    assert_eq!(face_count(&world, Point3::new(0, 0, 0)), slab_faces - 1);

    world.destroy_block(Point3::new(16, 4, 8));
    assert_eq!(face_count(&world, Point3::new(1, 0, 0)), 0);
    assert_eq!(face_count(&world, Point3::new(0, 0, 0)), slab_faces);

    for coords in [Point3::new(0, 0, 0), Point3::new(1, 0, 0)] {
        let chunk = world.chunk_at_coords(coords).unwrap();
        chunk.get().geometry().unwrap().assert_invariants();
    }
}

#[test]
fn buffers_stay_dense_through_arbitrary_edits() {
    let mut world = World::new();
    install_meshed_chunk(&mut world, Point3::new(0, 0, 0), slab_grid(8));
    let chunk = world.chunk_at_coords(Point3::new(0, 0, 0)).unwrap();

    let mut rng = fastrand::Rng::with_seed(0x0ddba11);
    for _ in 0..500 {
        let position = Point3::new(rng.i32(0..16), rng.i32(0..16), rng.i32(0..16));
        // Edits mirror what a player can do: place into empty cells, destroy
        // solid ones.
        if world.block_at_position(position) == 0 {
            world.place_block(position, rng.u8(1..5));
        } else {
            world.destroy_block(position);
        }

        let guard = chunk.get();
        let geometry = guard.geometry().unwrap();
        assert_eq!(geometry.live_len() % 9, 0);
        assert!(geometry.live_len() <= geometry.positions().len());
    }

    chunk.get().geometry().unwrap().assert_invariants();
}

#[test]
fn picking_a_face_entry_names_its_block_and_side() {
    let mut world = World::new();
    install_meshed_chunk(&mut world, Point3::new(0, 0, 0), Box::new([0; CHUNK_SIZE as usize]));
    world.place_block(Point3::new(3, 3, 3), BlockType::GRASS.id());

    let (position, _side) = world
        .block_target_for_entry(Point3::new(0, 0, 0), 0)
        .unwrap();
    assert_eq!(position, Point3::new(3, 3, 3));
    assert!(world.block_target_for_entry(Point3::new(0, 0, 0), 9999).is_none());
}
