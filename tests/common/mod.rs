#![allow(dead_code)]

pub mod archive;
pub mod command;
pub mod file;

use differ::areas::workspace::Workspace;
use differ::artifacts::diff::diff_entry::DiffEntry;
use differ::artifacts::diff::engine::{CompareFlags, DiffEngine};
use differ::artifacts::ignore::matcher::IgnoreMatcher;
use std::path::Path;

pub fn scan(root: &Path, hash: bool) -> Vec<differ::artifacts::diff::file_entry::FileEntry> {
    let mut matcher = IgnoreMatcher::new(root, [".git"]);
    Workspace::new(root.into())
        .scan(&mut matcher, hash)
        .unwrap_or_else(|e| panic!("Failed to scan {:?}: {:#}", root, e))
}

pub fn diff_trees(root_a: &Path, root_b: &Path, flags: CompareFlags) -> Vec<DiffEntry> {
    let hash = flags.contains(CompareFlags::HASH);
    DiffEngine::new(root_a, root_b, flags).diff(&scan(root_a, hash), &scan(root_b, hash))
}
