use crate::artifacts::archive::differ::{ArchiveLabel, ArchiveMemberDiff};
use crate::artifacts::core::short_hash;
use crate::artifacts::diff::file_entry::FileEntry;
use crate::artifacts::diff::file_mode::FileMode;
use chrono::{DateTime, Local};
use std::fmt;
use std::path::PathBuf;

const HASH_PREFIX_LEN: usize = 12;
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiffKind {
    OnlyA,
    OnlyB,
    Changed,
    Synced,
}

/// One observed difference between the two sides of a changed entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detail {
    Mode { a: FileMode, b: FileMode },
    Hash { a: String, b: String },
    Size { a: u64, b: u64 },
    Archive(ArchiveLabel),
    Modified { a: DateTime<Local>, b: DateTime<Local> },
}

impl Detail {
    /// Compact form used in summaries and for sorting
    pub fn short(&self) -> &'static str {
        match self {
            Detail::Mode { .. } => "mode",
            Detail::Hash { .. } => "hash",
            Detail::Size { .. } => "size",
            Detail::Archive(label) => label.as_str(),
            Detail::Modified { .. } => "date",
        }
    }

    pub fn is_mode(&self) -> bool {
        matches!(self, Detail::Mode { .. })
    }

    /// Hash and size differences say the bytes differ; an archive label
    /// explains how.
    pub fn is_content(&self) -> bool {
        matches!(self, Detail::Hash { .. } | Detail::Size { .. })
    }
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Detail::Mode { a, b } => write!(f, "mode: {a} vs {b}"),
            Detail::Hash { a, b } => write!(
                f,
                "hash: {} vs {}",
                short_hash(a, HASH_PREFIX_LEN),
                short_hash(b, HASH_PREFIX_LEN)
            ),
            Detail::Size { a, b } => write!(f, "size: {a} vs {b}"),
            Detail::Archive(label) => write!(f, "{label}"),
            Detail::Modified { a, b } => write!(
                f,
                "modified: {} vs {}",
                a.format(TIME_FORMAT),
                b.format(TIME_FORMAT)
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    pub kind: DiffKind,
    pub relative_path: PathBuf,
    pub entry_a: Option<FileEntry>,
    pub entry_b: Option<FileEntry>,
    pub details: Vec<Detail>,
    pub archive_details: Option<Vec<ArchiveMemberDiff>>,
}

impl DiffEntry {
    pub fn only_a(entry: FileEntry) -> Self {
        DiffEntry {
            kind: DiffKind::OnlyA,
            relative_path: entry.relative_path.clone(),
            entry_a: Some(entry),
            entry_b: None,
            details: Vec::new(),
            archive_details: None,
        }
    }

    pub fn only_b(entry: FileEntry) -> Self {
        DiffEntry {
            kind: DiffKind::OnlyB,
            relative_path: entry.relative_path.clone(),
            entry_a: None,
            entry_b: Some(entry),
            details: Vec::new(),
            archive_details: None,
        }
    }

    pub fn changed(
        a: FileEntry,
        b: FileEntry,
        details: Vec<Detail>,
        archive_details: Option<Vec<ArchiveMemberDiff>>,
    ) -> Self {
        DiffEntry {
            kind: DiffKind::Changed,
            relative_path: a.relative_path.clone(),
            entry_a: Some(a),
            entry_b: Some(b),
            details,
            archive_details,
        }
    }

    pub fn archive_label(&self) -> Option<ArchiveLabel> {
        self.details.iter().find_map(|detail| match detail {
            Detail::Archive(label) => Some(*label),
            _ => None,
        })
    }

    pub fn has_mode_change(&self) -> bool {
        self.details.iter().any(Detail::is_mode)
    }

    /// Short details joined by spaces; `size` is left out when an archive
    /// label already describes the content difference.
    pub fn summary(&self) -> String {
        self.short_details().join(" ")
    }

    pub fn short_details(&self) -> Vec<&'static str> {
        let has_archive = self.archive_label().is_some();

        self.details
            .iter()
            .filter(|detail| !(has_archive && matches!(detail, Detail::Size { .. })))
            .map(Detail::short)
            .collect()
    }

    pub fn is_dir(&self) -> bool {
        self.entry_a
            .as_ref()
            .or(self.entry_b.as_ref())
            .is_some_and(FileEntry::is_dir)
    }
}
