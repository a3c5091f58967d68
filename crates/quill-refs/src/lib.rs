//! Root pointer management for quill.
//!
//! Blocks in the content store are immutable, so "the current tree" needs
//! exactly one mutable reference: the root pointer. Publishing a new tree
//! version means writing every block first and moving the pointer last.
//!
//! # Modules
//!
//! - [`error`]: Error types for pointer operations
//! - [`traits`]: The [`RootPointer`] trait
//! - [`memory`]: In-memory [`InMemoryRootPointer`] for tests
//! - [`file`]: Durable [`FileRootPointer`] backed by a single file

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{RefError, Result};
pub use file::FileRootPointer;
pub use memory::InMemoryRootPointer;
pub use traits::RootPointer;
