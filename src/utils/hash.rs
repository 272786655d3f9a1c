//! Content checksums.

use sha2::{Digest, Sha256};

pub const CHECKSUM_PREFIX: &str = "sha256:";

/// `sha256:<hex>` digest of `bytes`.
#[must_use]
pub fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{CHECKSUM_PREFIX}{}", hex::encode(hasher.finalize()))
}
