//! Tree entries as produced by the walker
//!
//! A `FileEntry` is an immutable snapshot of one path below a comparison
//! root. Entries are unique by `relative_path` within one scan, and scans are
//! sorted by it.

use crate::artifacts::diff::file_mode::FileMode;
use chrono::{DateTime, Local};
use derive_new::new;
use std::fs::Metadata;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct FileEntry {
    /// Path relative to the comparison root
    pub relative_path: PathBuf,
    /// Size in bytes as reported by the filesystem
    pub size: u64,
    /// Type and permission bits
    pub mode: FileMode,
    /// Last modification time
    pub modified: DateTime<Local>,
    /// Hex content digest, present only when hashing was requested
    pub hash: Option<String>,
}

impl FileEntry {
    pub fn from_metadata(relative_path: &Path, metadata: &Metadata, hash: Option<String>) -> Self {
        let modified = metadata
            .modified()
            .map(DateTime::<Local>::from)
            .unwrap_or_default();

        FileEntry {
            relative_path: relative_path.to_path_buf(),
            size: metadata.len(),
            mode: FileMode::from(metadata),
            modified,
            hash,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.mode.is_dir()
    }
}
