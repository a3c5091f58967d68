//! High-level API for quill.
//!
//! [`Quill`] ties a [`ContentStore`] to a [`RootPointer`] and is the one
//! place where the current root moves. Reads load the tree named by the
//! pointer; writes run load, resolve, path-copy and publish under a single
//! write lock, and move the pointer only after every block is stored.
//!
//! ```no_run
//! use quill_sdk::{NewComment, PostPath, Quill};
//!
//! # fn main() -> quill_sdk::SdkResult<()> {
//! let quill = Quill::in_memory();
//! quill.init("root")?;
//! quill.add_site("s1")?;
//! quill.add_blog("s1", "b1")?;
//! let path = PostPath::new("s1", "b1", "p1");
//! quill.add_post(&path)?;
//! quill.add_comment(&path, NewComment::new("alice", "hi"))?;
//! assert_eq!(quill.get_comments(&path)?.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! [`ContentStore`]: quill_store::ContentStore
//! [`RootPointer`]: quill_refs::RootPointer

pub mod clock;
pub mod config;
pub mod error;
pub mod repository;

pub use clock::{Clock, SteppingClock, SystemClock};
pub use config::QuillConfig;
pub use error::{SdkError, SdkResult};
pub use repository::Quill;

// Re-export key types
pub use quill_tree::{CommentDto, ErrorCategory, NewComment, PostPath, RootNode, TreeStats};
pub use quill_types::ContentId;
