use crate::artifacts::diff::file_entry::FileEntry;
use crate::artifacts::ignore::matcher::IgnoreMatcher;
use anyhow::Context;
use sha1::{Digest, Sha1};
use std::path::Path;
use walkdir::WalkDir;

/// One comparison root on disk
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    /// Walks the tree below the root and returns one entry per non-excluded
    /// path, sorted by relative path. The root itself is not listed.
    ///
    /// An excluded directory prunes its whole subtree. Entries that cannot be
    /// read are skipped; only an unreadable root is an error.
    pub fn scan(&self, matcher: &mut IgnoreMatcher, hash: bool) -> anyhow::Result<Vec<FileEntry>> {
        std::fs::read_dir(&self.path)
            .with_context(|| format!("Failed to read directory: {:?}", self.path))?;

        let mut entries = Vec::new();
        let mut walker = WalkDir::new(&self.path)
            .min_depth(1)
            .follow_links(false)
            .into_iter();

        while let Some(next) = walker.next() {
            let entry = match next {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(%err, "skipping unreadable entry");
                    continue;
                }
            };

            let Ok(relative_path) = entry.path().strip_prefix(&self.path) else {
                continue;
            };
            let is_dir = entry.file_type().is_dir();

            if matcher.is_excluded(relative_path, is_dir) {
                if is_dir {
                    walker.skip_current_dir();
                }
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(err) => {
                    tracing::debug!(path = %entry.path().display(), %err, "skipping entry without metadata");
                    continue;
                }
            };

            let digest = if hash && entry.file_type().is_file() {
                Self::hash_file(entry.path())
                    .inspect_err(|err| {
                        tracing::debug!(path = %entry.path().display(), "{err:#}");
                    })
                    .ok()
            } else {
                None
            };

            entries.push(FileEntry::from_metadata(relative_path, &metadata, digest));
        }

        entries.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        Ok(entries)
    }

    pub fn hash_file(path: &Path) -> anyhow::Result<String> {
        let mut file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open file: {:?}", path))?;

        let mut hasher = Sha1::new();
        std::io::copy(&mut file, &mut hasher)
            .with_context(|| format!("Failed to read file: {:?}", path))?;

        Ok(format!("{:x}", hasher.finalize()))
    }
}
