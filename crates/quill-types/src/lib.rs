//! Foundation types for quill.
//!
//! Every other quill crate depends on `quill-types` for the identifier that
//! names a block in the content-addressed store.
//!
//! # Key Types
//!
//! - [`ContentId`]: Content-addressed identifier (BLAKE3 digest, hex on the wire)
//! - [`TypeError`]: Parse failures for identifiers

pub mod content;
pub mod error;

pub use content::ContentId;
pub use error::TypeError;
