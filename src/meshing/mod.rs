//! # Meshing Module
//!
//! Everything that turns voxel grids into dense, GPU-uploadable vertex
//! streams: the face geometry table, the incremental face buffer, and the
//! batch builder used when a chunk's geometry is first produced.

pub mod batch;
pub mod face_buffer;
pub mod face_geometry;

pub use batch::{build_chunk_geometry, BlockGrid, BoundaryLayer};
pub use face_buffer::FaceBuffer;
