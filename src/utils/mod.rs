// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Shared helper utilities reused by the store and front ends.

pub mod file_icons;
pub mod hash;

/// Icon lookup for attachment extensions.
pub use file_icons::{FileIcon, FileIcons, IconRegistry};
/// Compute the SHA-256 hash of a blob.
pub use hash::hash_bytes;
