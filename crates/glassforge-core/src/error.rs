//! Engine errors
//!
//! Only construction-time problems are errors. Malformed draws, unknown
//! spawn tokens and bad level targets during play are logged and skipped.

use thiserror::Error;

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown object kind: {0}")]
    UnknownKind(String),

    #[error("Invalid parameters for {kind}: {reason}")]
    InvalidParams { kind: String, reason: String },

    #[error("Unknown sprite: {0}")]
    UnknownSprite(String),

    #[error("Level index {index} out of range ({count} levels)")]
    LevelOutOfRange { index: usize, count: usize },

    #[error("No levels registered")]
    NoLevels,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
