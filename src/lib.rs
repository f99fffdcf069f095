#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Mesher
//!
//! An incremental voxel chunk meshing core: per-chunk face buffers that
//! single block edits update in place, plus the batch builder, terrain
//! generator, and worker pool that produce chunks in the first place.
//!
//! ## Key Modules
//!
//! * `meshing` - The face buffer (a slab allocator over triangle entries
//!   with swap-compaction) and the batch geometry builder
//! * `voxels` - Block types, chunk coordinates, the chunk edit logic, and
//!   the world that routes edits across chunk boundaries
//! * `terrain` - Noise-driven terrain generation
//! * `tasks` - The worker pool running terrain and geometry jobs off the
//!   main thread
//!
//! ## Architecture
//!
//! The main thread owns the world and applies block edits synchronously;
//! terrain generation and initial geometry builds run on workers against
//! snapshotted inputs and are installed back on the main thread. Vertex
//! streams stay dense at all times, so a renderer can upload
//! `positions[..live_len]` after any edit without post-processing.
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Point3;
//! use voxel_mesher::voxels::world::World;
//!
//! let world = World::new();
//! assert_eq!(world.block_at_position(Point3::new(0, 0, 0)), 0);
//! ```

pub mod config;
pub mod core;
pub mod meshing;
pub mod tasks;
pub mod terrain;
pub mod voxels;

use std::time::Instant;

use cgmath::Point3;
use log::info;

use config::GenerationConfig;
use tasks::terrain_generation_task::TerrainGenerationTask;
use tasks::TaskManager;
use voxels::world::World;

/// How many chunk positions one terrain task generates.
const TERRAIN_BATCH_SIZE: usize = 32;

/// Runs the demo: generates the spawn area, waits for all meshes, performs a
/// few edits, and logs what happened.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = match GenerationConfig::load("config.json") {
        Ok(config) => config,
        Err(error) => {
            info!("using default configuration ({})", error);
            GenerationConfig::default()
        }
    };

    let mut world = World::new();
    let mut task_manager = TaskManager::new(config.workers);

    let started = Instant::now();
    generate_spawn_area(&config, &mut world, &mut task_manager);
    info!(
        "generated {} chunks ({} meshed, {} vertices) in {:?}",
        world.chunk_count(),
        world.chunks_meshed(),
        world.total_vertex_count(),
        started.elapsed()
    );

    demo_edits(&world, &config);
}

/// Publishes terrain tasks for every chunk column within render distance and
/// drives the task manager until all resulting geometry is installed.
fn generate_spawn_area(config: &GenerationConfig, world: &mut World, task_manager: &mut TaskManager) {
    let r = config.render_distance;
    let mut positions = Vec::new();
    for x in -r..=r {
        for z in -r..=r {
            // Terrain tops out below y=5 chunks; cover the column so every
            // surface chunk ends up with six loaded neighbors.
            for y in -1..=5 {
                positions.push(Point3::new(x, y, z));
            }
        }
    }

    for batch in positions.chunks(TERRAIN_BATCH_SIZE) {
        task_manager.publish_task(Box::new(TerrainGenerationTask::new(
            config.clone(),
            batch.to_vec(),
        )));
    }

    while task_manager.has_work() {
        task_manager.process_completed_tasks(world);
        task_manager.process_queued_tasks();
        std::thread::yield_now();
    }
    task_manager.process_completed_tasks(world);
}

/// A few block edits against the generated world, exercising the incremental
/// path the way an interactive session would.
fn demo_edits(world: &World, config: &GenerationConfig) {
    use voxels::block::block_type::BlockType;

    // Stack two blocks in the air above the spawn column, then knock the
    // lower one out.
    let base = Point3::new(0, (config.detail_height + config.base_height) as i32 + 4, 0);
    let above = Point3::new(base.x, base.y + 1, base.z);

    world.place_block(base, BlockType::LOG.id());
    world.place_block(above, BlockType::LEAF.id());
    world.set_block_highlight(above, true);
    world.destroy_block(base);

    info!(
        "after edits: block above spawn is id {}, {} vertices live",
        world.block_at_position(above),
        world.total_vertex_count()
    );
}
