//! Terrain generation as a background task. One task generates a batch of
//! chunk positions; its result installs the terrain and spawns the geometry
//! builds that installation unlocks.

use cgmath::Point3;

use crate::config::GenerationConfig;
use crate::tasks::geometry_build_task::GeometryBuildTask;
use crate::tasks::task::{Task, TaskResult};
use crate::terrain::{generate_chunk, ChunkTerrain};
use crate::voxels::world::World;

/// Generates terrain for a batch of chunk positions.
pub struct TerrainGenerationTask {
    config: GenerationConfig,
    positions: Vec<Point3<i32>>,
}

impl TerrainGenerationTask {
    /// Creates a terrain task for a batch of chunk positions.
    ///
    /// # Arguments
    /// * `config` - The generation settings; cloned so the task is
    ///   self-contained
    /// * `positions` - Chunk coordinates to generate
    pub fn new(config: GenerationConfig, positions: Vec<Point3<i32>>) -> Self {
        TerrainGenerationTask { config, positions }
    }
}

impl Task for TerrainGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let chunks = self
            .positions
            .iter()
            .map(|&position| generate_chunk(&self.config, position))
            .collect();
        Box::new(TerrainGenerationResult { chunks })
    }
}

/// The generated terrain, handed back to the main thread for installation.
pub struct TerrainGenerationResult {
    chunks: Vec<ChunkTerrain>,
}

impl TaskResult for TerrainGenerationResult {
    fn handle_result(self: Box<Self>, world: &mut World) -> Vec<Box<dyn Task + Send>> {
        world
            .install_terrain(self.chunks)
            .into_iter()
            .map(|request| Box::new(GeometryBuildTask::new(request)) as Box<dyn Task + Send>)
            .collect()
    }
}
