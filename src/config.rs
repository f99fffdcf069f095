//! # Configuration Module
//!
//! Terrain-generation and runtime settings, loadable from a JSON file. Every
//! field has a default so a missing or partial file still yields a working
//! configuration.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Settings shared by terrain generation and the worker pool.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Seed for the terrain noise functions.
    pub seed: u32,

    /// Horizontal scale of the high-frequency elevation octave.
    pub detail_scale: f64,

    /// Height contribution of the high-frequency octave, in blocks.
    pub detail_height: f64,

    /// Horizontal scale of the low-frequency elevation octave.
    pub base_scale: f64,

    /// Height contribution of the low-frequency octave, in blocks.
    pub base_height: f64,

    /// Tree-noise threshold; samples above it sprout a tree.
    pub tree_threshold: f64,

    /// How many chunks out from the spawn column to generate.
    pub render_distance: i32,

    /// Number of worker threads for terrain and geometry tasks.
    pub workers: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            seed: 0,
            detail_scale: 64.0,
            detail_height: 8.0,
            base_scale: 256.0,
            base_height: 64.0,
            tree_threshold: 0.98,
            render_distance: 3,
            workers: 4,
        }
    }
}

impl GenerationConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// # Arguments
    /// * `path` - Path to the JSON file
    ///
    /// # Returns
    /// The parsed configuration, or a [`ConfigError`] describing what failed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Why a configuration file could not be loaded.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io(io::Error),
    /// The file was read but is not valid JSON for [`GenerationConfig`].
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read configuration file: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse configuration file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}
