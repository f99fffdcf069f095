//! # Core Module
//!
//! Small shared primitives with no domain knowledge of their own.

pub mod mt_resource;

pub use mt_resource::MtResource;
