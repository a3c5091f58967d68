use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use quill_crypto::ContentHasher;
use quill_types::ContentId;

use crate::error::{StoreError, StoreResult};
use crate::traits::ContentStore;

/// In-memory, HashMap-based block store.
///
/// Intended for tests and embedding. Blocks are held behind a `RwLock` and
/// cloned on read.
pub struct InMemoryContentStore {
    blocks: RwLock<HashMap<ContentId, Vec<u8>>>,
}

impl InMemoryContentStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blocks currently stored.
    pub fn len(&self) -> usize {
        self.blocks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bytes across all stored blocks.
    pub fn total_bytes(&self) -> u64 {
        self.blocks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|b| b.len() as u64)
            .sum()
    }

    /// Return a sorted list of all block ids in the store.
    pub fn ids(&self) -> Vec<ContentId> {
        let map = self.blocks.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<ContentId> = map.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore for InMemoryContentStore {
    fn put(&self, data: &[u8]) -> StoreResult<ContentId> {
        let id = ContentHasher::BLOCK.hash(data);
        let mut map = self
            .blocks
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))?;
        map.entry(id).or_insert_with(|| data.to_vec());
        Ok(id)
    }

    fn get(&self, id: &ContentId) -> StoreResult<Vec<u8>> {
        let map = self
            .blocks
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))?;
        map.get(id).cloned().ok_or(StoreError::NotFound(*id))
    }

    fn contains(&self, id: &ContentId) -> StoreResult<bool> {
        let map = self
            .blocks
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))?;
        Ok(map.contains_key(id))
    }
}

impl std::fmt::Debug for InMemoryContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryContentStore")
            .field("block_count", &self.len())
            .finish()
    }
}
