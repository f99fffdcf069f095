//! # Terrain Module
//!
//! Noise-driven terrain generation. Two Perlin octaves produce a rolling
//! elevation field, columns are filled with dirt capped by grass, and a
//! separate simplex field decides where trees sprout. Tree placement also
//! scans a three-block margin around the chunk so canopies spilling over from
//! neighboring columns land in this chunk's grid.
//!
//! Generation is pure with respect to its inputs, so identical configuration
//! and chunk coordinates always reproduce the same grid regardless of which
//! worker runs the job.

use cgmath::Point3;
use noise::{NoiseFn, OpenSimplex, Perlin};

use crate::config::GenerationConfig;
use crate::meshing::{BlockGrid, BoundaryLayer};
use crate::voxels::block::block_side::BlockSide;
use crate::voxels::block::block_type::BlockType;
use crate::voxels::coordinates::{
    block_index_for_position, CHUNK_DIMENSION, CHUNK_PLANE_SIZE, CHUNK_SIZE,
};

/// Everything the world needs to install one generated chunk: the grid (or
/// `None` when the chunk is pure air), plus the six boundary layers neighbors
/// will consume during their batch builds.
pub struct ChunkTerrain {
    /// Chunk coordinates this terrain belongs to.
    pub position: Point3<i32>,
    /// The generated grid, `None` when no solid block was produced.
    pub blocks: Option<Box<BlockGrid>>,
    /// Boundary layers for the chunk's own six faces, in `BlockSide` order.
    pub sides: Option<[Box<BoundaryLayer>; 6]>,
    /// Whether each boundary layer is completely solid.
    pub sides_are_solid: [bool; 6],
}

struct TerrainNoise {
    elevation: Perlin,
    trees: OpenSimplex,
}

impl TerrainNoise {
    fn new(config: &GenerationConfig) -> Self {
        // Tree noise is sampled at integer block coordinates, where Perlin is
        // identically zero, so trees use a simplex field instead.
        TerrainNoise {
            elevation: Perlin::new(config.seed),
            trees: OpenSimplex::new(config.seed.wrapping_add(1)),
        }
    }

    /// Ground elevation (in world blocks above y=0) for a block column.
    fn elevation_at(&self, config: &GenerationConfig, x: i32, z: i32, bx: i32, bz: i32) -> i32 {
        let wx = (x * CHUNK_DIMENSION + bx) as f64;
        let wz = (z * CHUNK_DIMENSION + bz) as f64;
        let detail = ((self
            .elevation
            .get([wx / config.detail_scale, wz / config.detail_scale])
            / 2.0
            + 0.5)
            * config.detail_height)
            .floor() as i32;
        let base = ((self
            .elevation
            .get([wx / config.base_scale, wz / config.base_scale])
            / 2.0
            + 0.5)
            * config.base_height)
            .floor() as i32;
        detail + base
    }

    fn has_tree(&self, config: &GenerationConfig, x: i32, z: i32, bx: i32, bz: i32) -> bool {
        let wx = (x * CHUNK_DIMENSION + bx) as f64;
        let wz = (z * CHUNK_DIMENSION + bz) as f64;
        self.trees.get([wx, wz]) > config.tree_threshold
    }
}

/// Generates a chunk's grid, or `None` when the chunk is entirely air.
pub fn generate_chunk_terrain(
    config: &GenerationConfig,
    position: Point3<i32>,
) -> Option<Box<BlockGrid>> {
    let noise = TerrainNoise::new(config);
    let mut blocks: Box<BlockGrid> = Box::new([0; CHUNK_SIZE as usize]);
    let mut contains_blocks = false;

    for bx in 0..CHUNK_DIMENSION {
        for bz in 0..CHUNK_DIMENSION {
            let elevation = noise.elevation_at(config, position.x, position.z, bx, bz)
                - position.y * CHUNK_DIMENSION;

            let mut by = 0;
            while by <= elevation && by < CHUNK_DIMENSION {
                let id = if by >= elevation - 1 {
                    BlockType::GRASS.id()
                } else {
                    BlockType::DIRT.id()
                };
                blocks[block_index_for_position(Point3::new(bx, by, bz))] = id;
                contains_blocks = true;
                by += 1;
            }
        }
    }

    // Trees whose trunks stand up to three blocks outside the chunk can still
    // drop leaves into it.
    for bx in -3..CHUNK_DIMENSION + 3 {
        for bz in -3..CHUNK_DIMENSION + 3 {
            let elevation = noise.elevation_at(config, position.x, position.z, bx, bz)
                - position.y * CHUNK_DIMENSION;

            if elevation >= -8
                && elevation < CHUNK_DIMENSION - 1
                && noise.has_tree(config, position.x, position.z, bx, bz)
            {
                add_tree(&mut blocks, bx, elevation + 1, bz);
                contains_blocks = true;
            }
        }
    }

    contains_blocks.then_some(blocks)
}

/// Writes a block only when the position lands inside the chunk.
fn add_block(blocks: &mut BlockGrid, x: i32, y: i32, z: i32, id: u8) {
    if (0..CHUNK_DIMENSION).contains(&x)
        && (0..CHUNK_DIMENSION).contains(&y)
        && (0..CHUNK_DIMENSION).contains(&z)
    {
        blocks[block_index_for_position(Point3::new(x, y, z))] = id;
    }
}

/// A leaf sphere four blocks up, on a five-block log trunk.
fn add_tree(blocks: &mut BlockGrid, x: i32, y: i32, z: i32) {
    for dx in -3..=3 {
        for dz in -3..=3 {
            for dy in 0..=3 {
                if dx * dx + dy * dy + dz * dz < 9 {
                    add_block(blocks, x + dx, y + dy + 4, z + dz, BlockType::LEAF.id());
                }
            }
        }
    }
    for dy in 0..5 {
        add_block(blocks, x, y + dy, z, BlockType::LOG.id());
    }
}

/// Extracts the 16x16 boundary layer of a grid facing `side`, along with
/// whether that layer is completely solid.
///
/// Layer indexing matches `boundary_index_for_position`: the two in-plane
/// coordinates in ascending axis order, major * 16 + minor.
pub fn boundary_layer(blocks: &BlockGrid, side: BlockSide) -> (Box<BoundaryLayer>, bool) {
    let mut layer: Box<BoundaryLayer> = Box::new([0; CHUNK_PLANE_SIZE as usize]);
    let mut is_solid = true;
    let edge = if side.is_positive() { CHUNK_DIMENSION - 1 } else { 0 };

    for major in 0..CHUNK_DIMENSION {
        for minor in 0..CHUNK_DIMENSION {
            let position = match side.axis() {
                0 => Point3::new(edge, major, minor),
                1 => Point3::new(major, edge, minor),
                _ => Point3::new(major, minor, edge),
            };
            let block = blocks[block_index_for_position(position)];
            if block == 0 {
                is_solid = false;
            }
            layer[(major * CHUNK_DIMENSION + minor) as usize] = block;
        }
    }

    (layer, is_solid)
}

/// Generates the full terrain payload for one chunk, boundary layers
/// included. This is the unit of work a terrain task runs per position.
pub fn generate_chunk(config: &GenerationConfig, position: Point3<i32>) -> ChunkTerrain {
    match generate_chunk_terrain(config, position) {
        Some(blocks) => {
            let mut sides_are_solid = [false; 6];
            let sides = BlockSide::all().map(|side| {
                let (layer, is_solid) = boundary_layer(&blocks, side);
                sides_are_solid[side.index()] = is_solid;
                layer
            });
            ChunkTerrain {
                position,
                blocks: Some(blocks),
                sides: Some(sides),
                sides_are_solid,
            }
        }
        None => ChunkTerrain {
            position,
            blocks: None,
            sides: None,
            sides_are_solid: [false; 6],
        },
    }
}

/// Generates a uniformly random grid, mostly used to stress-test meshing.
/// `sparseness` is the probability that a cell stays empty.
pub fn random_grid(rng: &mut fastrand::Rng, sparseness: f64) -> Box<BlockGrid> {
    let mut blocks: Box<BlockGrid> = Box::new([0; CHUNK_SIZE as usize]);
    for cell in blocks.iter_mut() {
        if rng.f64() >= sparseness {
            *cell = rng.u8(1..5);
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_deterministic() {
        let config = GenerationConfig::default();
        let a = generate_chunk_terrain(&config, Point3::new(3, 0, -2));
        let b = generate_chunk_terrain(&config, Point3::new(3, 0, -2));
        match (a, b) {
            (Some(a), Some(b)) => assert_eq!(a.as_slice(), b.as_slice()),
            (None, None) => {}
            _ => panic!("generation was not deterministic"),
        }
    }

    #[test]
    fn ground_chunks_fill_their_bottom_layer() {
        // Elevation is always non-negative, so a chunk at y=0 has a solid
        // block at the base of every column.
        let config = GenerationConfig::default();
        let blocks = generate_chunk_terrain(&config, Point3::new(0, 0, 0))
            .unwrap_or_else(|| panic!("ground chunk generated no blocks"));
        for x in 0..CHUNK_DIMENSION {
            for z in 0..CHUNK_DIMENSION {
                assert_ne!(blocks[block_index_for_position(Point3::new(x, 0, z))], 0);
            }
        }
    }

    #[test]
    fn sky_chunks_generate_no_terrain() {
        // Elevation tops out at detail_height + base_height blocks.
        let config = GenerationConfig {
            tree_threshold: 2.0, // simplex never exceeds this
            ..GenerationConfig::default()
        };
        let ceiling = ((config.detail_height + config.base_height) as i32)
            .div_euclid(CHUNK_DIMENSION)
            + 1;
        assert!(generate_chunk_terrain(&config, Point3::new(0, ceiling, 0)).is_none());
    }

    #[test]
    fn boundary_layers_match_the_grid_edges() {
        let mut blocks: Box<BlockGrid> = Box::new([0; CHUNK_SIZE as usize]);
        for x in 0..CHUNK_DIMENSION {
            for y in 0..8 {
                for z in 0..CHUNK_DIMENSION {
                    blocks[block_index_for_position(Point3::new(x, y, z))] = BlockType::DIRT.id();
                }
            }
        }

        let (down, down_solid) = boundary_layer(&blocks, BlockSide::DOWN);
        assert!(down_solid);
        assert!(down.iter().all(|&b| b == BlockType::DIRT.id()));

        let (up, up_solid) = boundary_layer(&blocks, BlockSide::UP);
        assert!(!up_solid);
        assert!(up.iter().all(|&b| b == 0));

        // The west face (x = 15) is solid below the slab top, air above.
        let (west, west_solid) = boundary_layer(&blocks, BlockSide::WEST);
        assert!(!west_solid);
        for y in 0..CHUNK_DIMENSION {
            for z in 0..CHUNK_DIMENSION {
                let expected = if y < 8 { BlockType::DIRT.id() } else { 0 };
                assert_eq!(west[(y * CHUNK_DIMENSION + z) as usize], expected);
            }
        }
    }

    #[test]
    fn generated_sides_agree_with_boundary_layers() {
        let config = GenerationConfig::default();
        let terrain = generate_chunk(&config, Point3::new(0, 0, 0));
        let blocks = terrain.blocks.as_ref().unwrap();
        let sides = terrain.sides.as_ref().unwrap();
        for side in BlockSide::all() {
            let (layer, is_solid) = boundary_layer(blocks, side);
            assert_eq!(sides[side.index()].as_slice(), layer.as_slice());
            assert_eq!(terrain.sides_are_solid[side.index()], is_solid);
        }
    }
}
