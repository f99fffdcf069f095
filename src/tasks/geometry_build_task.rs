//! Batch geometry building as a background task. The request was snapshotted
//! by the world when the chunk qualified, so the build runs against frozen
//! inputs while the main thread keeps editing.

use crate::meshing::batch::build_chunk_geometry;
use crate::meshing::{BoundaryLayer, FaceBuffer};
use crate::tasks::task::{Task, TaskResult};
use crate::voxels::world::{GeometryBuildRequest, World};

/// Builds the initial face buffer for one chunk.
pub struct GeometryBuildTask {
    request: GeometryBuildRequest,
}

impl GeometryBuildTask {
    /// Wraps a snapshotted build request.
    pub fn new(request: GeometryBuildRequest) -> Self {
        GeometryBuildTask { request }
    }
}

impl Task for GeometryBuildTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let neighbor_sides: [Option<&BoundaryLayer>; 6] =
            std::array::from_fn(|i| self.request.neighbor_sides[i].as_deref());
        let geometry = build_chunk_geometry(&self.request.blocks, neighbor_sides);
        Box::new(GeometryBuildResult {
            position: self.request.position,
            geometry,
        })
    }
}

/// A finished face buffer on its way back to the main thread.
pub struct GeometryBuildResult {
    position: cgmath::Point3<i32>,
    geometry: FaceBuffer,
}

impl TaskResult for GeometryBuildResult {
    fn handle_result(self: Box<Self>, world: &mut World) -> Vec<Box<dyn Task + Send>> {
        world.install_geometry(self.position, self.geometry);
        Vec::new()
    }
}
