//! Content hashing for caption records.

use blake3::Hasher;

/// BLAKE3 hex digest of an in-memory payload.
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize().to_hex().to_string()
}
