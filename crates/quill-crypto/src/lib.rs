//! Hashing primitives for quill.
//!
//! Provides domain-separated BLAKE3 hashing. Block ids and comment display
//! ids are computed here so that the store and the tree agree on them.
//!
//! All hashing goes through the `blake3` crate.

pub mod hasher;

pub use hasher::ContentHasher;
