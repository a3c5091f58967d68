use quill_types::ContentId;

use crate::error::StoreResult;

/// Content-addressed block store.
///
/// All implementations must satisfy these invariants:
/// - `put` is deterministic and idempotent: equal bytes yield an equal id,
///   and storing the same bytes twice is a no-op.
/// - `get` returns exactly the bytes that were `put`, or
///   [`StoreError::NotFound`](crate::StoreError::NotFound).
/// - Blocks are never deleted through this interface.
/// - All I/O errors are propagated, never silently ignored.
pub trait ContentStore: Send + Sync {
    /// Store a block and return its content-addressed id.
    fn put(&self, data: &[u8]) -> StoreResult<ContentId>;

    /// Fetch a block by id.
    ///
    /// Returns `Err(StoreError::NotFound)` if the block does not exist.
    fn get(&self, id: &ContentId) -> StoreResult<Vec<u8>>;

    /// Check whether a block exists.
    fn contains(&self, id: &ContentId) -> StoreResult<bool>;
}
