//! Digest primitives for the mortgage ledger

use sha2::{Digest, Sha256};

/// SHA-256 of `bytes`, hex encoded (lowercase).
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Shortened digest for display, e.g. `"3f2a9c01b7de..."`.
pub fn hash_preview(hash: &str, len: usize) -> String {
    let cut = hash
        .char_indices()
        .nth(len)
        .map_or(hash.len(), |(i, _)| i);
    format!("{}...", &hash[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_preview() {
        let hash = sha256_hex(b"abc");
        assert_eq!(hash_preview(&hash, 12), "ba7816bf8f01...");
        assert_eq!(hash_preview("0", 12), "0...");
    }
}
