//! # Engine Errors
//!
//! The voxel core itself cannot fail: out-of-range accesses degrade to air or
//! no-ops and generation/meshing are total. The errors here only cover the
//! edges of the engine, where data comes in from outside: configuration files,
//! save stores and adopted grid buffers.

use std::path::PathBuf;

use crate::config::WorldDimensions;

/// Errors produced while loading or validating an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Errors reported by the persistence layer before a save is ever handed to the grid.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("no saved entry under key {0:?}")]
    Missing(&'static str),

    #[error("world buffer has {actual} bytes, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("save was written for a {saved:?} world, expected {expected:?}")]
    DimensionMismatch {
        expected: WorldDimensions,
        saved: WorldDimensions,
    },

    #[error("save store failure: {0}")]
    Store(String),

    #[error("save store I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed save metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

/// Top-level error type of the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("grid buffer has {actual} cells, dimensions require {expected}")]
    GridBufferMismatch { expected: usize, actual: usize },
}

/// Convenience alias used across the crate.
pub type EngineResult<T> = Result<T, EngineError>;
