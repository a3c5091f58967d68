use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use quill_crypto::ContentHasher;
use quill_types::ContentId;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::ContentStore;

/// Filesystem block store.
///
/// Blocks live at `{root}/blocks/{hex[0..2]}/{hex}`. Writes go to a
/// temporary file in the shard directory and are renamed into place, so a
/// reader never observes a half-written block. Every `get` re-hashes the
/// bytes and reports [`StoreError::Corrupt`] on mismatch.
#[derive(Debug)]
pub struct FsContentStore {
    root: PathBuf,
}

impl FsContentStore {
    /// Open (or create) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("blocks"))?;
        Ok(Self { root })
    }

    /// The root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn block_path(&self, id: &ContentId) -> PathBuf {
        let hex = id.to_hex();
        self.root.join("blocks").join(&hex[..2]).join(hex)
    }

    /// `Ok(false)` only when the block is genuinely absent.
    fn block_exists(&self, id: &ContentId) -> StoreResult<bool> {
        match fs::metadata(self.block_path(id)) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl ContentStore for FsContentStore {
    fn put(&self, data: &[u8]) -> StoreResult<ContentId> {
        let id = ContentHasher::BLOCK.hash(data);
        let path = self.block_path(&id);
        if self.block_exists(&id)? {
            return Ok(id);
        }

        let shard = path
            .parent()
            .ok_or_else(|| StoreError::Unavailable(format!("no shard directory for {id}")))?;
        fs::create_dir_all(shard)?;

        let mut tmp = NamedTempFile::new_in(shard)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(id = %id.short_hex(), bytes = data.len(), "stored block");
        Ok(id)
    }

    fn get(&self, id: &ContentId) -> StoreResult<Vec<u8>> {
        let data = match fs::read(self.block_path(id)) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StoreError::NotFound(*id)),
            Err(e) => return Err(e.into()),
        };

        let computed = ContentHasher::BLOCK.hash(&data);
        if computed != *id {
            return Err(StoreError::Corrupt { id: *id, computed });
        }
        Ok(data)
    }

    fn contains(&self, id: &ContentId) -> StoreResult<bool> {
        self.block_exists(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn put_and_get() {
        let dir = TempDir::new().unwrap();
        let store = FsContentStore::open(dir.path()).unwrap();
        let id = store.put(b"block bytes").unwrap();
        assert_eq!(store.get(&id).unwrap(), b"block bytes");
        assert!(store.contains(&id).unwrap());
    }

    #[test]
    fn layout_is_sharded_by_prefix() {
        let dir = TempDir::new().unwrap();
        let store = FsContentStore::open(dir.path()).unwrap();
        let id = store.put(b"sharded").unwrap();
        let hex = id.to_hex();
        assert!(dir.path().join("blocks").join(&hex[..2]).join(&hex).is_file());
    }

    #[test]
    fn put_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = FsContentStore::open(dir.path()).unwrap();
        let id1 = store.put(b"same").unwrap();
        let id2 = store.put(b"same").unwrap();
        assert_eq!(id1, id2);

        let shard = dir.path().join("blocks").join(&id1.to_hex()[..2]);
        assert_eq!(fs::read_dir(shard).unwrap().count(), 1);
    }

    #[test]
    fn ids_agree_with_memory_store() {
        use crate::InMemoryContentStore;

        let dir = TempDir::new().unwrap();
        let fs_store = FsContentStore::open(dir.path()).unwrap();
        let mem_store = InMemoryContentStore::new();
        assert_eq!(
            fs_store.put(b"portable").unwrap(),
            mem_store.put(b"portable").unwrap()
        );
    }

    #[test]
    fn missing_block_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = FsContentStore::open(dir.path()).unwrap();
        let id = ContentId::from_bytes(b"never written");
        assert!(store.get(&id).unwrap_err().is_not_found());
        assert!(!store.contains(&id).unwrap());
    }

    #[test]
    fn unreadable_shard_is_an_error_not_absence() {
        let dir = TempDir::new().unwrap();
        let store = FsContentStore::open(dir.path()).unwrap();
        let id = ContentHasher::BLOCK.hash(b"shadowed");
        // A plain file where the shard directory should be.
        let shard = dir.path().join("blocks").join(&id.to_hex()[..2]);
        fs::write(&shard, b"not a directory").unwrap();

        assert!(matches!(store.contains(&id), Err(StoreError::Io(_))));
        assert!(matches!(store.put(b"shadowed"), Err(StoreError::Io(_))));
    }

    #[test]
    fn tampered_block_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = FsContentStore::open(dir.path()).unwrap();
        let id = store.put(b"original").unwrap();
        fs::write(store.block_path(&id), b"tampered").unwrap();

        let err = store.get(&id).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { id: bad, .. } if bad == id));
    }

    #[test]
    fn reopen_sees_existing_blocks() {
        let dir = TempDir::new().unwrap();
        let id = FsContentStore::open(dir.path())
            .unwrap()
            .put(b"durable")
            .unwrap();
        let reopened = FsContentStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get(&id).unwrap(), b"durable");
    }
}
