//! # Voxel Mesher Entry Point
//!
//! Generates the spawn area, performs a handful of block edits, and logs the
//! resulting mesh statistics.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

fn main() {
    voxel_mesher::run();
}
