//! Error types for root pointer operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or moving the root pointer.
#[derive(Debug, Error)]
pub enum RefError {
    /// The pointer file exists but does not hold a valid content id.
    #[error("corrupt root pointer at {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// A lock guarding the pointer was poisoned.
    #[error("root pointer unavailable: {0}")]
    Unavailable(String),

    /// I/O error during file-based pointer operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for pointer operations.
pub type Result<T> = std::result::Result<T, RefError>;
