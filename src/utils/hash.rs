// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Content digest helpers.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 of an in-memory blob and return its lowercase hex digest.
///
/// # Examples
///
/// ```rust
/// let digest = notepack::utils::hash_bytes(b"");
/// assert!(digest.starts_with("e3b0c442"));
/// ```
pub fn hash_bytes(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(&digest[..])
}
