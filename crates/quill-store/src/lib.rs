//! Content-addressed block storage for quill.
//!
//! A block store accepts bytes and returns a deterministic [`ContentId`];
//! it resolves an id back to the bytes it was computed from. The comment
//! tree is built entirely on this contract.
//!
//! # Storage Backends
//!
//! All backends implement the [`ContentStore`] trait:
//!
//! - [`InMemoryContentStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsContentStore`] -- one file per block under a sharded directory
//!
//! # Design Rules
//!
//! 1. Blocks are immutable once written (content-addressing guarantees this).
//! 2. `put` is idempotent: the same bytes always map to the same id.
//! 3. There is no delete. Superseded blocks simply become unreferenced.
//! 4. Concurrent reads are always safe.
//! 5. The store never interprets block contents.
//! 6. All I/O errors are propagated, never silently ignored.
//!
//! [`ContentId`]: quill_types::ContentId

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsContentStore;
pub use memory::InMemoryContentStore;
pub use traits::ContentStore;
