//! Content hashing for stable identifiers

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Hash a string (stable within a build, used for node ids)
pub fn hash_content(content: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}

/// Hash raw bytes, e.g. an image file's contents
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(hash_content("a/b.md"), hash_content("a/b.md"));
        assert_ne!(hash_content("a/b.md"), hash_content("a/c.md"));
    }
}
