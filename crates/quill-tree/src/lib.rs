//! The persistent comment tree.
//!
//! A quill tree has five fixed levels: Root → Site → Blog → Post → Comment.
//! Every node is serialized to JSON and stored as an immutable block in a
//! [`ContentStore`](quill_store::ContentStore); parents refer to children by
//! [`ContentId`](quill_types::ContentId) only, so the stored form is a
//! Merkle DAG whose root id names one complete version of the tree.
//!
//! # Reading
//!
//! [`TreeLoader`] hydrates a whole tree from a root id and fails closed: a
//! single missing block aborts the load. [`PathResolver`] then locates a
//! post (or a site/blog) by exact name, first match in insertion order, and
//! returns the explicit chain of ancestors it walked through.
//!
//! # Writing
//!
//! [`PathCopyWriter`] consumes such a chain. It writes the new leaf, then
//! rewrites exactly the ancestors on the path back to the root and returns
//! the new root id. Every subtree off that path keeps its id and is shared
//! with the previous version by reference; nothing off the path is
//! re-serialized. Publishing the new root is left to the caller.
//!
//! # Modules
//!
//! - [`kind`]: [`NodeKind`], the closed set of levels
//! - [`node`]: node types and the Transient → Written lifecycle
//! - [`record`]: the serialized block shapes
//! - [`loader`]: [`TreeLoader`]
//! - [`path`]: [`PostPath`], [`PathResolver`] and spines
//! - [`writer`]: [`PathCopyWriter`]
//! - [`walker`]: depth-first visits, stats and closure verification
//! - [`comments`]: comment DTOs and read ordering

pub mod comments;
pub mod error;
pub mod kind;
pub mod loader;
pub mod node;
pub mod path;
pub mod record;
pub mod walker;
pub mod writer;

pub use comments::{newest_first, CommentDto, NewComment};
pub use error::{ErrorCategory, TreeError, TreeResult};
pub use kind::NodeKind;
pub use loader::TreeLoader;
pub use node::{
    BlogLevel, BlogNode, BranchNode, CommentNode, Entry, Level, NodeRef, PostLevel, PostNode,
    RootLevel, RootNode, SiteLevel, SiteNode, TreeChild,
};
pub use path::{BlogSpine, PathResolver, PostPath, SiteSpine, Spine, Step};
pub use walker::{find_missing, verify_closed, TreeStats, Visit};
pub use writer::{Commit, PathCopyWriter, WrittenBlock};
