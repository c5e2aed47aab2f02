//! Content fingerprints for cache keys.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `text`, the recommended key for embedding inputs.
///
/// ```
/// use flowgate_cache::fingerprint;
///
/// assert_eq!(
///     fingerprint("abc"),
///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
/// );
/// ```
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
