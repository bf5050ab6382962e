use crate::artifacts::archive::differ::{ArchiveDiffer, ArchiveMemberDiff, is_archive};
use crate::artifacts::diff::diff_entry::{Detail, DiffEntry};
use crate::artifacts::diff::file_entry::FileEntry;
use bitflags::bitflags;
use std::collections::{HashMap, HashSet};
use std::path::Path;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CompareFlags: u32 {
        /// Compare content hashes instead of sizes
        const HASH = 0b0001;
        /// Report modification-time differences
        const DATE = 0b0010;
    }
}

/// Classifies two sorted scans into only-in-A, only-in-B and changed entries.
///
/// Output order follows the scans: A's entries (only-in-A and changed, in
/// A's order), then B's unmatched entries in B's order.
#[derive(Debug)]
pub struct DiffEngine<'r> {
    root_a: &'r Path,
    root_b: &'r Path,
    flags: CompareFlags,
    archive_differ: ArchiveDiffer,
}

impl<'r> DiffEngine<'r> {
    pub fn new(root_a: &'r Path, root_b: &'r Path, flags: CompareFlags) -> Self {
        DiffEngine {
            root_a,
            root_b,
            flags,
            archive_differ: ArchiveDiffer,
        }
    }

    pub fn diff(&self, entries_a: &[FileEntry], entries_b: &[FileEntry]) -> Vec<DiffEntry> {
        let index_b = entries_b
            .iter()
            .map(|entry| (entry.relative_path.as_path(), entry))
            .collect::<HashMap<_, _>>();
        let mut seen = HashSet::with_capacity(entries_a.len());
        let mut diffs = Vec::new();

        for a in entries_a {
            seen.insert(a.relative_path.as_path());

            let Some(b) = index_b.get(a.relative_path.as_path()) else {
                diffs.push(DiffEntry::only_a(a.clone()));
                continue;
            };

            let (details, archive_details) = self.compare_entries(a, b);
            if !details.is_empty() {
                diffs.push(DiffEntry::changed(
                    a.clone(),
                    (*b).clone(),
                    details,
                    archive_details,
                ));
            }
        }

        diffs.extend(
            entries_b
                .iter()
                .filter(|b| !seen.contains(b.relative_path.as_path()))
                .map(|b| DiffEntry::only_b(b.clone())),
        );

        diffs
    }

    fn compare_entries(
        &self,
        a: &FileEntry,
        b: &FileEntry,
    ) -> (Vec<Detail>, Option<Vec<ArchiveMemberDiff>>) {
        let mut details = Vec::new();
        let mut archive_details = None;

        if a.mode != b.mode {
            details.push(Detail::Mode {
                a: a.mode,
                b: b.mode,
            });
        }

        let mut size_differs = false;
        if a.mode.is_regular() && b.mode.is_regular() {
            if self.flags.contains(CompareFlags::HASH) {
                if a.hash != b.hash {
                    details.push(Detail::Hash {
                        a: a.hash.clone().unwrap_or_default(),
                        b: b.hash.clone().unwrap_or_default(),
                    });
                    size_differs = a.size != b.size;
                }
            } else {
                size_differs = a.size != b.size;
            }

            if size_differs {
                details.push(Detail::Size {
                    a: a.size,
                    b: b.size,
                });
            }
        }

        if size_differs && is_archive(&a.relative_path) {
            let analysis = self.archive_differ.analyze(
                &self.root_a.join(&a.relative_path),
                &self.root_b.join(&b.relative_path),
            );
            details.push(Detail::Archive(analysis.label));
            archive_details = Some(analysis.members);
        }

        if self.flags.contains(CompareFlags::DATE) && a.modified != b.modified {
            details.push(Detail::Modified {
                a: a.modified,
                b: b.modified,
            });
        }

        (details, archive_details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::archive::differ::ArchiveLabel;
    use crate::artifacts::diff::diff_entry::DiffKind;
    use crate::artifacts::diff::file_mode::{FileKind, FileMode};
    use chrono::{DateTime, Local, TimeZone};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};
    use std::path::PathBuf;

    fn at(secs: i64) -> DateTime<Local> {
        Local.timestamp_opt(secs, 0).unwrap()
    }

    fn file(path: &str, size: u64, mode: u32) -> FileEntry {
        FileEntry::new(PathBuf::from(path), size, FileMode::regular(mode), at(0), None)
    }

    fn dir(path: &str) -> FileEntry {
        FileEntry::new(PathBuf::from(path), 4096, FileMode::directory(0o755), at(0), None)
    }

    fn link(path: &str, target_len: u64) -> FileEntry {
        FileEntry::new(
            PathBuf::from(path),
            target_len,
            FileMode::new(FileKind::Symlink, 0o777),
            at(0),
            None,
        )
    }

    fn hashed(mut entry: FileEntry, hash: &str) -> FileEntry {
        entry.hash = Some(hash.to_string());
        entry
    }

    #[fixture]
    fn engine() -> DiffEngine<'static> {
        DiffEngine::new(Path::new("/a"), Path::new("/b"), CompareFlags::empty())
    }

    fn kinds(diffs: &[DiffEntry]) -> Vec<(DiffKind, &str)> {
        diffs
            .iter()
            .map(|d| (d.kind, d.relative_path.to_str().unwrap_or_default()))
            .collect()
    }

    #[rstest]
    fn identical_scans_have_no_differences(engine: DiffEngine<'static>) {
        let scan = vec![dir("src"), file("src/lib.rs", 10, 0o644)];

        assert!(engine.diff(&scan, &scan).is_empty());
    }

    #[rstest]
    fn one_empty_side_makes_everything_one_sided(engine: DiffEngine<'static>) {
        let scan = vec![dir("src"), file("src/lib.rs", 10, 0o644)];

        assert_eq!(
            kinds(&engine.diff(&scan, &[])),
            vec![(DiffKind::OnlyA, "src"), (DiffKind::OnlyA, "src/lib.rs")]
        );
        assert_eq!(
            kinds(&engine.diff(&[], &scan)),
            vec![(DiffKind::OnlyB, "src"), (DiffKind::OnlyB, "src/lib.rs")]
        );
    }

    #[rstest]
    fn output_follows_a_then_unmatched_b(engine: DiffEngine<'static>) {
        let a = vec![file("a.txt", 1, 0o644), file("b.txt", 1, 0o644), file("c.txt", 1, 0o644)];
        let b = vec![file("0.txt", 1, 0o644), file("b.txt", 2, 0o644), file("d.txt", 1, 0o644)];

        assert_eq!(
            kinds(&engine.diff(&a, &b)),
            vec![
                (DiffKind::OnlyA, "a.txt"),
                (DiffKind::Changed, "b.txt"),
                (DiffKind::OnlyA, "c.txt"),
                (DiffKind::OnlyB, "0.txt"),
                (DiffKind::OnlyB, "d.txt"),
            ]
        );
    }

    #[rstest]
    fn mode_difference_with_equal_size(engine: DiffEngine<'static>) {
        let diffs = engine.diff(&[file("script.sh", 5, 0o755)], &[file("script.sh", 5, 0o644)]);

        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DiffKind::Changed);
        assert_eq!(
            diffs[0].details.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["mode: -rwxr-xr-x vs -rw-r--r--"]
        );
    }

    #[rstest]
    fn directories_ignore_size(engine: DiffEngine<'static>) {
        let mut bigger = dir("src");
        bigger.size = 8192;

        assert!(engine.diff(&[dir("src")], &[bigger]).is_empty());
    }

    #[rstest]
    fn symlinks_are_not_compared_on_size(engine: DiffEngine<'static>) {
        assert!(engine.diff(&[link("l", 5)], &[link("l", 20)]).is_empty());
    }

    #[rstest]
    fn symlinked_archive_is_not_inspected(engine: DiffEngine<'static>) {
        let diffs = engine.diff(&[file("doc.docx", 10, 0o644)], &[link("doc.docx", 40)]);

        assert_eq!(diffs[0].archive_label(), None);
        assert_eq!(diffs[0].summary(), "mode");
    }

    #[test]
    fn hashing_reports_hash_then_size() {
        let engine = DiffEngine::new(Path::new("/a"), Path::new("/b"), CompareFlags::HASH);

        let same_size = engine.diff(
            &[hashed(file("x.bin", 4, 0o644), "aaaa")],
            &[hashed(file("x.bin", 4, 0o644), "bbbb")],
        );
        assert_eq!(
            same_size[0].details,
            vec![Detail::Hash {
                a: "aaaa".to_string(),
                b: "bbbb".to_string()
            }]
        );

        let resized = engine.diff(
            &[hashed(file("x.bin", 4, 0o644), "aaaa")],
            &[hashed(file("x.bin", 5, 0o644), "bbbb")],
        );
        assert_eq!(resized[0].summary(), "hash size");
    }

    #[test]
    fn hashing_ignores_size_when_hashes_match() {
        let engine = DiffEngine::new(Path::new("/a"), Path::new("/b"), CompareFlags::HASH);

        let diffs = engine.diff(
            &[hashed(file("x.bin", 4, 0o644), "same")],
            &[hashed(file("x.bin", 9, 0o644), "same")],
        );

        assert!(diffs.is_empty());
    }

    #[test]
    fn dates_are_compared_only_when_enabled() {
        let a = file("x.txt", 1, 0o644);
        let mut b = a.clone();
        b.modified = at(3600);

        let quiet = DiffEngine::new(Path::new("/a"), Path::new("/b"), CompareFlags::empty());
        assert!(quiet.diff(&[a.clone()], &[b.clone()]).is_empty());

        let dated = DiffEngine::new(Path::new("/a"), Path::new("/b"), CompareFlags::DATE);
        let diffs = dated.diff(&[a], &[b]);
        assert_eq!(diffs[0].summary(), "date");
    }

    #[rstest]
    fn unreadable_archive_is_labelled_as_error(engine: DiffEngine<'static>) {
        let diffs = engine.diff(&[file("doc.docx", 10, 0o644)], &[file("doc.docx", 12, 0o644)]);

        assert_eq!(diffs[0].archive_label(), Some(ArchiveLabel::Error));
        assert_eq!(diffs[0].summary(), "docx:err");
        assert_eq!(diffs[0].archive_details, Some(Vec::new()));
    }

    fn scan() -> impl Strategy<Value = Vec<FileEntry>> {
        prop::collection::btree_map("[a-d]{1,3}", (0u64..4, prop::bool::ANY), 0..10).prop_map(
            |entries| {
                entries
                    .into_iter()
                    .map(|(path, (size, exec))| file(&path, size, if exec { 0o755 } else { 0o644 }))
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn diff_with_itself_is_empty(entries in scan()) {
            let engine = DiffEngine::new(Path::new("/a"), Path::new("/b"), CompareFlags::all());
            prop_assert!(engine.diff(&entries, &entries).is_empty());
        }

        #[test]
        fn every_path_is_reported_at_most_once(a in scan(), b in scan()) {
            let engine = DiffEngine::new(Path::new("/a"), Path::new("/b"), CompareFlags::empty());
            let diffs = engine.diff(&a, &b);

            let paths = diffs.iter().map(|d| d.relative_path.clone()).collect::<HashSet<_>>();
            prop_assert_eq!(paths.len(), diffs.len());
            for d in &diffs {
                prop_assert_eq!(d.entry_a.is_some(), d.kind != DiffKind::OnlyB);
                prop_assert_eq!(d.entry_b.is_some(), d.kind != DiffKind::OnlyA);
            }
        }
    }
}
