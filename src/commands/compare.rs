use crate::areas::config::Config;
use crate::areas::mirror::mirror_path;
use crate::areas::workspace::Workspace;
use crate::artifacts::diff::diff_entry::{DiffEntry, DiffKind};
use crate::artifacts::diff::engine::{CompareFlags, DiffEngine};
use crate::artifacts::diff::file_entry::FileEntry;
use crate::artifacts::ignore::matcher::IgnoreMatcher;
use crate::artifacts::sync::reconciler::{Reconciliation, SyncAction, SyncReconciler};
use crate::commands::report::{Report, ReportOptions};
use anyhow::Context;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CompareOptions {
    pub path: PathBuf,
    pub suffix: u32,
    /// Overrides the configured path component when set
    pub component: Option<String>,
    pub flags: CompareFlags,
    pub sync: bool,
    pub report: ReportOptions,
}

#[derive(Debug)]
pub struct Outcome {
    pub diffs: Vec<DiffEntry>,
    pub sync_failures: usize,
}

impl Outcome {
    /// Anything other than a synced entry still needs attention
    pub fn has_differences(&self) -> bool {
        self.diffs.iter().any(|diff| diff.kind != DiffKind::Synced)
    }
}

/// Compares a tree with its mirror: walk both, diff, optionally reconcile,
/// then render.
#[derive(Debug)]
pub struct Compare {
    root_a: Box<Path>,
    root_b: Box<Path>,
    always_exclude: Vec<String>,
    options: CompareOptions,
}

impl Compare {
    /// Resolves both roots. Every error here is a usage or path error.
    pub fn new(options: CompareOptions, config: &Config) -> anyhow::Result<Self> {
        let root_a = std::path::absolute(&options.path)
            .with_context(|| format!("cannot resolve path {:?}", options.path))?;
        if !root_a.exists() {
            anyhow::bail!("path does not exist: {}", root_a.display());
        }

        let component = options
            .component
            .as_deref()
            .unwrap_or(&config.path_component);
        let root_b = mirror_path(&root_a, options.suffix, component)?;
        if !root_b.exists() {
            anyhow::bail!("mirror path does not exist: {}", root_b.display());
        }

        Ok(Compare {
            root_a: root_a.into_boxed_path(),
            root_b: root_b.into_boxed_path(),
            always_exclude: config.always_exclude.clone(),
            options,
        })
    }

    pub fn root_a(&self) -> &Path {
        &self.root_a
    }

    pub fn root_b(&self) -> &Path {
        &self.root_b
    }

    /// Writes the report to `out`, and scan and reconciliation progress to
    /// `progress`.
    pub fn run<O: Write, P: Write>(&self, out: O, progress: &mut P) -> anyhow::Result<Outcome> {
        let hash = self.options.flags.contains(CompareFlags::HASH);
        let entries_a = self.scan(&self.root_a, "A", hash, progress)?;
        let entries_b = self.scan(&self.root_b, "B", hash, progress)?;

        let mut diffs =
            DiffEngine::new(&self.root_a, &self.root_b, self.options.flags).diff(&entries_a, &entries_b);
        let mut sync_failures = 0;

        if self.options.sync && !diffs.is_empty() {
            let reconciliation = SyncReconciler::new(&self.root_a, &self.root_b).reconcile(&diffs);
            Self::print_progress(&reconciliation, progress)?;
            sync_failures = reconciliation.failures.len();
            diffs = reconciliation.entries;
        }

        let mut report = Report::new(out, self.options.report);
        report.render(&diffs)?;

        Ok(Outcome {
            diffs,
            sync_failures,
        })
    }

    fn scan<P: Write>(
        &self,
        root: &Path,
        label: &str,
        hash: bool,
        progress: &mut P,
    ) -> anyhow::Result<Vec<FileEntry>> {
        let mut matcher = IgnoreMatcher::new(root, self.always_exclude.iter().cloned());
        let entries = Workspace::new(root.into()).scan(&mut matcher, hash)?;
        tracing::debug!(root = %root.display(), entries = entries.len(), rule_dirs = matcher.cache().len(), "scanned");

        if !entries.is_empty() {
            let hashing = if hash { " (hashed)" } else { "" };
            writeln!(progress, "  Scanning {}: {} files{}... done.", label, entries.len(), hashing)?;
        }

        Ok(entries)
    }

    fn print_progress<P: Write>(reconciliation: &Reconciliation, progress: &mut P) -> anyhow::Result<()> {
        for path in &reconciliation.copied {
            writeln!(progress, "  synced: {}", path.display())?;
        }
        Self::print_failures(reconciliation, SyncAction::CopyArchive, "sync error", progress)?;
        if !reconciliation.copied.is_empty() {
            writeln!(
                progress,
                "  {} files synced (A → B)\n",
                reconciliation.copied.len()
            )?;
        }

        for (path, mode) in &reconciliation.modes_fixed {
            writeln!(progress, "  chmod: {} → {}", path.display(), mode)?;
        }
        Self::print_failures(reconciliation, SyncAction::ChangeMode, "chmod error", progress)?;
        if !reconciliation.modes_fixed.is_empty() {
            writeln!(
                progress,
                "  {} modes fixed (A → B)\n",
                reconciliation.modes_fixed.len()
            )?;
        }

        Ok(())
    }

    fn print_failures<P: Write>(
        reconciliation: &Reconciliation,
        action: SyncAction,
        label: &str,
        progress: &mut P,
    ) -> anyhow::Result<()> {
        for failure in reconciliation
            .failures
            .iter()
            .filter(|failure| failure.action == action)
        {
            writeln!(
                progress,
                "  {}: {}: {:#}",
                label,
                failure.relative_path.display(),
                failure.error
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    struct Mirror {
        _dir: TempDir,
        data: PathBuf,
        mirror: PathBuf,
    }

    #[fixture]
    fn mirror() -> Mirror {
        let dir = TempDir::new().expect("Failed to create temp dir");
        dir.child("data/notes.txt").write_str("same").unwrap();
        dir.child("data.2/notes.txt").write_str("same").unwrap();
        Mirror {
            data: dir.path().join("data"),
            mirror: dir.path().join("data.2"),
            _dir: dir,
        }
    }

    fn options(path: &Path) -> CompareOptions {
        CompareOptions {
            path: path.to_path_buf(),
            suffix: 2,
            component: None,
            flags: CompareFlags::empty(),
            sync: false,
            report: ReportOptions::default(),
        }
    }

    fn run(compare: &Compare) -> (Outcome, String, String) {
        let mut out = Vec::new();
        let mut progress = Vec::new();
        let outcome = compare.run(&mut out, &mut progress).unwrap();
        (
            outcome,
            String::from_utf8(out).unwrap(),
            String::from_utf8(progress).unwrap(),
        )
    }

    #[rstest]
    fn resolves_the_mirror_root(mirror: Mirror) -> anyhow::Result<()> {
        let compare = Compare::new(options(&mirror.data), &Config::default())?;

        assert_eq!(compare.root_a(), mirror.data.as_path());
        assert_eq!(compare.root_b(), mirror.mirror.as_path());

        Ok(())
    }

    #[rstest]
    fn missing_mirror_is_an_error(mirror: Mirror) {
        let mut opts = options(&mirror.data);
        opts.suffix = 3;

        assert!(Compare::new(opts, &Config::default()).is_err());
    }

    #[rstest]
    fn component_override_takes_precedence(mirror: Mirror) {
        let mut opts = options(&mirror.data);
        opts.component = Some("elsewhere".to_string());

        assert!(Compare::new(opts, &Config::default()).is_err());
    }

    #[rstest]
    fn identical_trees_report_no_differences(mirror: Mirror) -> anyhow::Result<()> {
        let compare = Compare::new(options(&mirror.data), &Config::default())?;

        let (outcome, out, progress) = run(&compare);

        assert!(!outcome.has_differences());
        assert_eq!(out, "No differences found.\n");
        assert_eq!(
            progress,
            "  Scanning A: 1 files... done.\n  Scanning B: 1 files... done.\n"
        );

        Ok(())
    }

    #[rstest]
    fn differences_are_rendered(mirror: Mirror) -> anyhow::Result<()> {
        std::fs::write(mirror.mirror.join("extra.txt"), "b")?;
        let compare = Compare::new(options(&mirror.data), &Config::default())?;

        let (outcome, out, _) = run(&compare);

        assert!(outcome.has_differences());
        assert!(out.contains("=== Only in B ==="));
        assert!(out.ends_with("Summary: 0 only in A, 1 only in B, 0 changed\n"));

        Ok(())
    }

    #[rstest]
    fn hashed_scans_are_announced(mirror: Mirror) -> anyhow::Result<()> {
        let mut opts = options(&mirror.data);
        opts.flags = CompareFlags::HASH;
        let compare = Compare::new(opts, &Config::default())?;

        let (_, _, progress) = run(&compare);

        assert_eq!(
            progress,
            "  Scanning A: 1 files (hashed)... done.\n  Scanning B: 1 files (hashed)... done.\n"
        );

        Ok(())
    }

    #[cfg(unix)]
    #[rstest]
    fn sync_fixes_modes_and_reports_progress(mirror: Mirror) -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let script = mirror.data.join("run.sh");
        std::fs::write(&script, "x")?;
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))?;
        let copy = mirror.mirror.join("run.sh");
        std::fs::write(&copy, "x")?;
        std::fs::set_permissions(&copy, std::fs::Permissions::from_mode(0o644))?;

        let mut opts = options(&mirror.data);
        opts.sync = true;
        let compare = Compare::new(opts, &Config::default())?;

        let (outcome, out, progress) = run(&compare);

        assert!(!outcome.has_differences());
        assert_eq!(outcome.sync_failures, 0);
        assert!(progress.starts_with("  Scanning A: 2 files... done.\n  Scanning B: 2 files... done.\n"));
        assert!(progress.ends_with("  chmod: run.sh → -rwxr-xr-x\n  1 modes fixed (A → B)\n\n"));
        assert_eq!(out, "Summary: 0 only in A, 0 only in B, 0 changed, 1 synced\n");

        Ok(())
    }
}
