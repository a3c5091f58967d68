use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use quill_refs::{FileRootPointer, InMemoryRootPointer, RootPointer};
use quill_store::{ContentStore, FsContentStore, InMemoryContentStore};
use quill_tree::{
    newest_first, verify_closed, Commit, CommentDto, NewComment, PathCopyWriter, PathResolver,
    PostPath, RootNode, TreeLoader, TreeResult, TreeStats,
};
use quill_types::ContentId;
use tracing::{debug, info, instrument};

use crate::clock::{Clock, SystemClock};
use crate::config::QuillConfig;
use crate::error::{SdkError, SdkResult};

/// High-level quill API.
///
/// Reads take no lock: they load whatever root the pointer names at that
/// moment. Writes are serialized through one lock held from loading the
/// current root until the pointer has been moved, so two concurrent
/// `add_comment` calls never derive from the same root.
pub struct Quill {
    store: Arc<dyn ContentStore>,
    pointer: Arc<dyn RootPointer>,
    write_lock: Mutex<()>,
    clock: Arc<dyn Clock>,
}

impl Quill {
    pub fn new(store: Arc<dyn ContentStore>, pointer: Arc<dyn RootPointer>) -> Self {
        Self {
            store,
            pointer,
            write_lock: Mutex::new(()),
            clock: Arc::new(SystemClock),
        }
    }

    /// A throwaway instance backed entirely by memory.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryContentStore::new()),
            Arc::new(InMemoryRootPointer::new()),
        )
    }

    /// Open the on-disk store and pointer file named by `config`.
    pub fn open(config: &QuillConfig) -> SdkResult<Self> {
        Self::open_at(&config.store_dir, &config.root_file)
    }

    pub fn open_at(store_dir: &Path, root_file: &Path) -> SdkResult<Self> {
        let store = FsContentStore::open(store_dir)?;
        debug!(store = %store_dir.display(), root = %root_file.display(), "opened quill");
        Ok(Self::new(
            Arc::new(store),
            Arc::new(FileRootPointer::new(root_file)),
        ))
    }

    /// Replace the timestamp source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn store(&self) -> &dyn ContentStore {
        self.store.as_ref()
    }

    // ---- Root ----

    /// Write an empty root and publish it, unless a root already exists.
    ///
    /// Returns the current root id either way.
    pub fn init(&self, root_name: &str) -> SdkResult<ContentId> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = self.pointer.current_root()? {
            debug!(root = %existing.short_hex(), "already initialized");
            return Ok(existing);
        }
        let mut root = RootNode::named(root_name)?;
        let id = root.write(self.store.as_ref())?;
        self.pointer.set_current_root(&id)?;
        info!(root = %id.short_hex(), name = root_name, "initialized");
        Ok(id)
    }

    /// The currently published root id, if any.
    pub fn head(&self) -> SdkResult<Option<ContentId>> {
        Ok(self.pointer.current_root()?)
    }

    /// Load the tree named by the current root.
    pub fn tree(&self) -> SdkResult<RootNode> {
        let root_id = self.require_root()?;
        Ok(TreeLoader::new(self.store.as_ref()).load(&root_id)?)
    }

    pub fn stats(&self) -> SdkResult<TreeStats> {
        Ok(TreeStats::of(&self.tree()?))
    }

    /// Check that every block reachable from the current root is present.
    pub fn verify(&self) -> SdkResult<BTreeSet<ContentId>> {
        let root_id = self.require_root()?;
        Ok(verify_closed(self.store.as_ref(), &root_id)?)
    }

    // ---- Comments ----

    /// Comments under `path`, newest first. Never writes.
    #[instrument(skip_all, fields(path = %path))]
    pub fn get_comments(&self, path: &PostPath) -> SdkResult<Vec<CommentDto>> {
        let root = self.tree()?;
        let spine = PathResolver::find(&root, path)?;
        Ok(newest_first(spine.post()))
    }

    /// Append a comment under `path` and publish the new root.
    #[instrument(skip_all, fields(path = %path))]
    pub fn add_comment(&self, path: &PostPath, comment: NewComment) -> SdkResult<CommentDto> {
        let commit = self.commit(|store, root| {
            let spine = PathResolver::find(root, path)?;
            PathCopyWriter::new(store).add_comment(&spine, comment, self.clock.now())
        })?;
        Ok(CommentDto::from(&commit.created))
    }

    // ---- Structure ----

    pub fn add_site(&self, site: &str) -> SdkResult<ContentId> {
        let commit = self.commit(|store, root| PathCopyWriter::new(store).add_site(root, site))?;
        Ok(commit.root_id)
    }

    pub fn add_blog(&self, site: &str, blog: &str) -> SdkResult<ContentId> {
        let commit = self.commit(|store, root| {
            let spine = PathResolver::find_site(root, site)?;
            PathCopyWriter::new(store).add_blog(&spine, blog)
        })?;
        Ok(commit.root_id)
    }

    /// Create the post named by `path` under its existing site and blog.
    pub fn add_post(&self, path: &PostPath) -> SdkResult<ContentId> {
        let commit = self.commit(|store, root| {
            let spine = PathResolver::find_blog(root, &path.site, &path.blog)?;
            PathCopyWriter::new(store).add_post(&spine, &path.post)
        })?;
        Ok(commit.root_id)
    }

    /// Load, rewrite and publish under the write lock.
    ///
    /// The pointer moves only after `rewrite` has stored every block; any
    /// error before that leaves the published root unchanged.
    fn commit<N>(
        &self,
        rewrite: impl FnOnce(&dyn ContentStore, &RootNode) -> TreeResult<Commit<N>>,
    ) -> SdkResult<Commit<N>> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = self.require_root()?;
        let root = TreeLoader::new(self.store.as_ref()).load(&previous)?;
        let commit = rewrite(self.store.as_ref(), &root)?;
        self.pointer.set_current_root(&commit.root_id)?;
        info!(
            from = %previous.short_hex(),
            to = %commit.root_id.short_hex(),
            blocks = commit.written.len(),
            "published root"
        );
        Ok(commit)
    }

    fn require_root(&self) -> SdkResult<ContentId> {
        self.pointer.current_root()?.ok_or(SdkError::NoRoot)
    }
}

impl std::fmt::Debug for Quill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Quill").finish_non_exhaustive()
    }
}
