//! Error types for maze loading, setup and policy output validation.
//!
//! Search-level outcomes (nothing reachable, no threat in sight) are ordinary
//! data and never show up here. Only malformed external input is an error.

use std::path::PathBuf;

use thiserror::Error;

/// ASCII maze parsing failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MazeError {
    #[error("Empty maze")]
    Empty,

    #[error("Maze has zero width")]
    ZeroWidth,

    #[error("Unknown tile character '{ch}' at ({x}, {y})")]
    UnknownTile { ch: char, x: usize, y: usize },

    #[error("Multiple player spawns at ({x}, {y})")]
    MultiplePlayerSpawns { x: usize, y: usize },

    #[error("No player spawn ('P') found in maze")]
    NoPlayerSpawn,
}

/// Fatal setup errors, reported before the first tick.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("at least one target category must be configured")]
    NoTargetCategories,

    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// The policy produced something no direction can be chosen from.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PolicyOutputError {
    #[error("policy returned {actual} outputs, expected {expected}")]
    WrongLength { expected: usize, actual: usize },

    #[error("policy output {index} is not finite ({value})")]
    NonFinite { index: usize, value: f32 },
}

/// Anything that can go wrong during one decision tick.
#[derive(Debug, Error)]
pub enum AutopilotError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    PolicyOutput(#[from] PolicyOutputError),
}
