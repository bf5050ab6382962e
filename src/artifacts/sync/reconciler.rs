use crate::artifacts::diff::diff_entry::{Detail, DiffEntry, DiffKind};
use crate::artifacts::diff::file_mode::{FileKind, FileMode};
use anyhow::Context;
use derive_new::new;
use std::fmt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncAction {
    CopyArchive,
    ChangeMode,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAction::CopyArchive => write!(f, "sync"),
            SyncAction::ChangeMode => write!(f, "chmod"),
        }
    }
}

#[derive(Debug)]
pub struct SyncFailure {
    pub relative_path: PathBuf,
    pub action: SyncAction,
    pub error: anyhow::Error,
}

/// Outcome of one reconciliation run
///
/// `entries` is the reclassified copy of the input list; the input itself is
/// left untouched.
#[derive(Debug, Default)]
pub struct Reconciliation {
    pub entries: Vec<DiffEntry>,
    pub copied: Vec<PathBuf>,
    pub modes_fixed: Vec<(PathBuf, FileMode)>,
    pub failures: Vec<SyncFailure>,
}

/// Resolves the two auto-fixable kinds of difference by pushing the primary
/// tree's state onto the mirror:
///
/// 1. document archives whose differences are not textual are copied over
/// 2. permission differences are fixed with a chmod
///
/// Failures are collected and the affected entry keeps its prior state.
#[derive(Debug, new)]
pub struct SyncReconciler<'r> {
    root_a: &'r Path,
    root_b: &'r Path,
}

impl<'r> SyncReconciler<'r> {
    pub fn reconcile(&self, entries: &[DiffEntry]) -> Reconciliation {
        let mut result = Reconciliation {
            entries: entries.to_vec(),
            ..Default::default()
        };

        self.sync_archives(&mut result);
        self.sync_modes(&mut result);

        result
    }

    /// The archive label is cosmetic and every other detail is a plain
    /// content difference the label already accounts for.
    pub fn is_cosmetic_archive(entry: &DiffEntry) -> bool {
        entry.archive_label().is_some_and(|label| label.is_cosmetic())
            && entry
                .details
                .iter()
                .all(|detail| detail.is_content() || matches!(detail, Detail::Archive(_)))
    }

    /// Both sides have the same file type and the mirror side is not a
    /// symlink. Anything else is a structural difference left for review.
    pub fn is_mode_fixable(entry: &DiffEntry) -> bool {
        match (&entry.entry_a, &entry.entry_b) {
            (Some(a), Some(b)) => a.mode.kind() == b.mode.kind() && !b.mode.is_symlink(),
            _ => false,
        }
    }

    fn sync_archives(&self, result: &mut Reconciliation) {
        for entry in result
            .entries
            .iter_mut()
            .filter(|entry| entry.kind == DiffKind::Changed && Self::is_cosmetic_archive(entry))
        {
            match self.copy_file(&entry.relative_path) {
                Ok(()) => {
                    tracing::info!(path = %entry.relative_path.display(), "synced archive A -> B");
                    entry.kind = DiffKind::Synced;
                    result.copied.push(entry.relative_path.clone());
                }
                Err(error) => {
                    tracing::warn!(path = %entry.relative_path.display(), "archive sync failed: {error:#}");
                    result.failures.push(SyncFailure {
                        relative_path: entry.relative_path.clone(),
                        action: SyncAction::CopyArchive,
                        error,
                    });
                }
            }
        }
    }

    fn sync_modes(&self, result: &mut Reconciliation) {
        for entry in result
            .entries
            .iter_mut()
            .filter(|entry| {
                entry.kind == DiffKind::Changed
                    && entry.has_mode_change()
                    && Self::is_mode_fixable(entry)
            })
        {
            let Some(mode) = entry.entry_a.as_ref().map(|a| a.mode) else {
                continue;
            };

            match apply_mode(&self.root_b.join(&entry.relative_path), mode) {
                Ok(()) => {
                    tracing::info!(path = %entry.relative_path.display(), %mode, "fixed mode A -> B");
                    entry.details.retain(|detail| !detail.is_mode());
                    if entry.details.is_empty() {
                        entry.kind = DiffKind::Synced;
                    }
                    result.modes_fixed.push((entry.relative_path.clone(), mode));
                }
                Err(error) => {
                    tracing::warn!(path = %entry.relative_path.display(), "mode sync failed: {error:#}");
                    result.failures.push(SyncFailure {
                        relative_path: entry.relative_path.clone(),
                        action: SyncAction::ChangeMode,
                        error,
                    });
                }
            }
        }
    }

    fn copy_file(&self, relative_path: &Path) -> anyhow::Result<()> {
        let source_path = self.root_a.join(relative_path);
        let target_path = self.root_b.join(relative_path);

        let mut source = std::fs::File::open(&source_path)
            .with_context(|| format!("Failed to open source file: {:?}", source_path))?;
        let permissions = source
            .metadata()
            .with_context(|| format!("Failed to get metadata for file: {:?}", source_path))?
            .permissions();

        ensure_kind(&target_path, FileKind::Regular)?;
        let mut target = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&target_path)
            .with_context(|| format!("Failed to open file: {:?}", target_path))?;

        std::io::copy(&mut source, &mut target)
            .with_context(|| format!("Failed to write to file: {:?}", target_path))?;

        std::fs::set_permissions(&target_path, permissions)
            .with_context(|| format!("Failed to set permissions for file: {:?}", target_path))?;

        Ok(())
    }
}

/// Checks the on-disk type without following symlinks
fn ensure_kind(path: &Path, expected: FileKind) -> anyhow::Result<()> {
    let metadata = std::fs::symlink_metadata(path)
        .with_context(|| format!("Failed to get metadata for file: {:?}", path))?;
    let found = FileMode::from(&metadata).kind();
    if found != expected {
        anyhow::bail!(
            "{:?} is a {} entry, expected {}",
            path,
            found.as_char(),
            expected.as_char()
        );
    }

    Ok(())
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: FileMode) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    ensure_kind(path, mode.kind())?;
    let permissions = std::fs::Permissions::from_mode(mode.permissions());
    std::fs::set_permissions(path, permissions)
        .with_context(|| format!("Failed to set permissions for file: {:?}", path))
}

#[cfg(not(unix))]
fn apply_mode(path: &Path, mode: FileMode) -> anyhow::Result<()> {
    ensure_kind(path, mode.kind())?;
    let mut permissions = std::fs::metadata(path)
        .with_context(|| format!("Failed to get metadata for file: {:?}", path))?
        .permissions();
    permissions.set_readonly(mode.permissions() & 0o200 == 0);
    std::fs::set_permissions(path, permissions)
        .with_context(|| format!("Failed to set permissions for file: {:?}", path))
}
