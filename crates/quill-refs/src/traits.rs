//! The [`RootPointer`] trait defining the head storage interface.

use quill_types::ContentId;

use crate::error::Result;

/// The single mutable reference naming the current tree version.
///
/// Implementations must be thread-safe and make `set_current_root` durable
/// before returning. They do not serialize read-modify-write sequences:
/// callers that load the current root, derive a new one and store it must
/// hold their own lock across the whole sequence, or concurrent updates
/// silently overwrite each other.
pub trait RootPointer: Send + Sync {
    /// Read the current root id, or `None` if no tree has been published.
    fn current_root(&self) -> Result<Option<ContentId>>;

    /// Publish `root` as the current tree version.
    fn set_current_root(&self, root: &ContentId) -> Result<()>;
}
