//! # Voxels Module
//!
//! The voxel domain: block types and palettes, chunk coordinates, the chunk
//! itself, and the world that routes edits between chunks.

pub mod block;
pub mod chunk;
pub mod coordinates;
pub mod world;
