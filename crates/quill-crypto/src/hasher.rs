use quill_types::ContentId;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g. `"quill-block-v1"`) that is
/// prepended to every hash computation, so a block id can never collide with
/// a comment display id computed over the same bytes.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for stored blocks. The store keys every block with this.
    pub const BLOCK: Self = Self {
        domain: "quill-block-v1",
    };
    /// Hasher for comment display ids.
    pub const COMMENT_ID: Self = Self {
        domain: "quill-comment-id-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> ContentId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        ContentId::from_hash(*hasher.finalize().as_bytes())
    }

    /// Hash a sequence of string fields, each terminated by a NUL byte.
    ///
    /// The terminator keeps `("ab", "c")` and `("a", "bc")` distinct.
    pub fn hash_fields(&self, fields: &[&str]) -> ContentId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        for field in fields {
            hasher.update(field.as_bytes());
            hasher.update(&[0]);
        }
        ContentId::from_hash(*hasher.finalize().as_bytes())
    }

    /// Verify that data produces the expected id.
    pub fn verify(&self, data: &[u8], expected: &ContentId) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}
