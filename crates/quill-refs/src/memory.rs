//! In-memory root pointer for testing and ephemeral use.

use std::sync::RwLock;

use quill_types::ContentId;

use crate::error::{RefError, Result};
use crate::traits::RootPointer;

/// An in-memory implementation of [`RootPointer`].
///
/// The value lives behind a `RwLock` and is lost when dropped.
#[derive(Debug, Default)]
pub struct InMemoryRootPointer {
    root: RwLock<Option<ContentId>>,
}

impl InMemoryRootPointer {
    /// Create an empty pointer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pointer already naming `root`.
    pub fn with_root(root: ContentId) -> Self {
        Self {
            root: RwLock::new(Some(root)),
        }
    }
}

impl RootPointer for InMemoryRootPointer {
    fn current_root(&self) -> Result<Option<ContentId>> {
        let root = self
            .root
            .read()
            .map_err(|e| RefError::Unavailable(format!("lock poisoned: {e}")))?;
        Ok(*root)
    }

    fn set_current_root(&self, root: &ContentId) -> Result<()> {
        let mut current = self
            .root
            .write()
            .map_err(|e| RefError::Unavailable(format!("lock poisoned: {e}")))?;
        *current = Some(*root);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let pointer = InMemoryRootPointer::new();
        assert_eq!(pointer.current_root().unwrap(), None);
    }

    #[test]
    fn set_then_read() {
        let pointer = InMemoryRootPointer::new();
        let id = ContentId::from_bytes(b"root-1");
        pointer.set_current_root(&id).unwrap();
        assert_eq!(pointer.current_root().unwrap(), Some(id));
    }

    #[test]
    fn last_write_wins() {
        let pointer = InMemoryRootPointer::with_root(ContentId::from_bytes(b"a"));
        let b = ContentId::from_bytes(b"b");
        pointer.set_current_root(&b).unwrap();
        assert_eq!(pointer.current_root().unwrap(), Some(b));
    }
}
