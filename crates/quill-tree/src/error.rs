//! Error types for tree operations.

use quill_store::StoreError;
use quill_types::ContentId;

use crate::kind::NodeKind;

/// Errors that can occur while loading, resolving or rewriting a tree.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// A linked block is missing from the store.
    #[error("block not found: {0}")]
    NotFound(ContentId),

    /// A path segment did not match any child.
    #[error("{kind} not found: {name}")]
    PathNotFound { kind: NodeKind, name: String },

    /// Caller input failed validation (empty author, empty name, bad path).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The store failed for a reason other than absence.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    /// A block exists but does not decode as the expected node kind.
    #[error("cannot decode {kind} block {id}: {reason}")]
    Decode {
        id: ContentId,
        kind: NodeKind,
        reason: String,
    },

    /// A node could not be serialized.
    #[error("cannot encode {kind} {name}: {reason}")]
    Encode {
        kind: NodeKind,
        name: String,
        reason: String,
    },

    /// A parent was serialized while one of its children had no content id.
    #[error("{kind} {name} has not been written")]
    Unwritten { kind: NodeKind, name: String },

    /// A spine step referred to a child slot that does not exist.
    #[error("{kind} has no child at index {index}")]
    MissingSlot { kind: NodeKind, index: usize },
}

/// Coarse classification surfaced to callers deciding how to respond.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing block or unresolvable path.
    NotFound,
    /// Invalid caller input.
    BadRequest,
    /// Store I/O failure or unreadable data; a retry may help.
    StoreUnavailable,
    /// An internal invariant was violated.
    Internal,
}

impl TreeError {
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound(_) | Self::PathNotFound { .. } => ErrorCategory::NotFound,
            Self::BadRequest(_) => ErrorCategory::BadRequest,
            Self::StoreUnavailable(_) | Self::Decode { .. } => ErrorCategory::StoreUnavailable,
            Self::Encode { .. } | Self::Unwritten { .. } | Self::MissingSlot { .. } => {
                ErrorCategory::Internal
            }
        }
    }
}

impl From<StoreError> for TreeError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::StoreUnavailable(other),
        }
    }
}

/// Convenience alias for tree results.
pub type TreeResult<T> = Result<T, TreeError>;
