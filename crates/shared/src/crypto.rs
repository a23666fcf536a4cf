//! Cryptographic utilities for photo integrity hashing.

use sha2::{Digest, Sha256};

/// Computes SHA-256 of raw bytes and returns it as a lowercase hex string.
///
/// Used to fingerprint uploaded checkpoint photos so the stored record can
/// later be checked against the stored object.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_vector() {
        let hash = sha256_hex(b"test");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_sha256_hex_empty() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_hex_deterministic() {
        let payload = vec![0xde, 0xad, 0xbe, 0xef];
        assert_eq!(sha256_hex(&payload), sha256_hex(&payload));
    }

    #[test]
    fn test_sha256_hex_different_inputs() {
        assert_ne!(sha256_hex(b"photo-a"), sha256_hex(b"photo-b"));
    }

    #[test]
    fn test_sha256_hex_large_input() {
        let blob = vec![0xabu8; 1_000_000];
        assert_eq!(sha256_hex(&blob).len(), 64);
    }
}
