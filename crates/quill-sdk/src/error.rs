use std::path::PathBuf;

use quill_tree::{ErrorCategory, TreeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("no root configured; run init first")]
    NoRoot,

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("store error: {0}")]
    Store(#[from] quill_store::StoreError),

    #[error("ref error: {0}")]
    Ref(#[from] quill_refs::RefError),

    #[error("invalid config {path}: {reason}")]
    Config { path: PathBuf, reason: String },
}

impl SdkError {
    /// Classify this error for callers mapping it to a response.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NoRoot => ErrorCategory::NotFound,
            Self::Tree(e) => e.category(),
            Self::Store(e) if e.is_not_found() => ErrorCategory::NotFound,
            Self::Store(_) | Self::Ref(_) => ErrorCategory::StoreUnavailable,
            Self::Config { .. } => ErrorCategory::BadRequest,
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
