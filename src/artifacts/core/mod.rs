//! Core utilities and shared types
//!
//! This module contains small helpers shared by the ignore matcher, the diff
//! engine and the report.

use std::path::Path;

/// Render a relative path with `/` separators regardless of platform
///
/// Ignore rules and report grouping both operate on this form.
pub fn slash_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// First `len` characters of a digest, or all of it when shorter
pub fn short_hash(hash: &str, len: usize) -> &str {
    match hash.char_indices().nth(len) {
        Some((idx, _)) => &hash[..idx],
        None => hash,
    }
}
