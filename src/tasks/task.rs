//! # Task System Core Traits
//!
//! The two halves of a unit of background work: a `Task` runs on a worker
//! thread and produces a `TaskResult`, which is consumed on the main thread
//! where it may mutate the world and spawn follow-up tasks.
//!
//! Tasks own all the data they need; nothing is shared with the main thread
//! while a task runs. This is what lets terrain generation and batch geometry
//! builds proceed while the main thread keeps applying block edits.

use crate::voxels::world::World;

/// A unit of work executed on a worker thread.
///
/// Implementations must be self-contained: everything `process` reads was
/// snapshotted when the task was created.
pub trait Task: Send {
    /// Performs the work and returns the result to hand back to the main
    /// thread.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// The main-thread half of a completed task.
///
/// `handle_result` is the only place worker output touches shared state. It
/// may return follow-up tasks; terrain results spawn the geometry builds they
/// unlock, geometry results spawn nothing.
pub trait TaskResult: Send {
    /// Applies this result to the world and returns any follow-up tasks.
    fn handle_result(self: Box<Self>, world: &mut World) -> Vec<Box<dyn Task + Send>>;
}
