use crate::artifacts::core::slash_path;
use crate::artifacts::diff::diff_entry::{DiffEntry, DiffKind};
use crate::artifacts::diff::lcs::Edit;
use colored::{Color, Colorize};
use is_terminal::IsTerminal;
use std::io::Write;

const DEFAULT_WIDTH: usize = 80;
const MIN_WIDTH: usize = 40;
const MIN_DETAIL_WIDTH: usize = 6;
const MAX_DETAIL_WIDTH: usize = 24;
const GROUP_WIDTH: usize = 18;
const MIN_FILE_WIDTH: usize = 10;
// status, separators and the two size columns
const FIXED_WIDTH: usize = 29;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    Always,
    #[default]
    Never,
}

impl ColorChoice {
    pub fn detect() -> Self {
        if std::io::stdout().is_terminal() {
            ColorChoice::Always
        } else {
            ColorChoice::Never
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, ColorChoice::Always)
    }
}

pub fn terminal_width() -> usize {
    match crossterm::terminal::size() {
        Ok((width, _)) if width as usize >= MIN_WIDTH => width as usize,
        _ => DEFAULT_WIDTH,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub verbose: bool,
    pub width: usize,
    pub color: ColorChoice,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            verbose: false,
            width: DEFAULT_WIDTH,
            color: ColorChoice::Never,
        }
    }
}

struct Columns {
    detail: usize,
    group: usize,
    file: usize,
}

/// Tabular rendering of a diff list, grouped into only-in-A, only-in-B and
/// changed sections followed by a summary line.
pub struct Report<W: Write> {
    writer: W,
    options: ReportOptions,
}

impl<W: Write> Report<W> {
    pub fn new(writer: W, options: ReportOptions) -> Self {
        Report { writer, options }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn render(&mut self, diffs: &[DiffEntry]) -> anyhow::Result<()> {
        if diffs.is_empty() {
            writeln!(self.writer, "No differences found.")?;
            return Ok(());
        }

        let mut only_a = Self::select(diffs, DiffKind::OnlyA);
        let mut only_b = Self::select(diffs, DiffKind::OnlyB);
        let mut changed = Self::select(diffs, DiffKind::Changed);
        let synced = diffs
            .iter()
            .filter(|diff| diff.kind == DiffKind::Synced)
            .count();

        for section in [&mut only_a, &mut only_b, &mut changed] {
            section.sort_by_cached_key(|diff| {
                let path = slash_path(&diff.relative_path);
                let (group, file) = split_group(&path);
                (diff.summary(), group.to_string(), file.to_string())
            });
        }

        let columns = self.columns(only_a.iter().chain(&only_b).chain(&changed).copied());

        if !only_a.is_empty() {
            self.header("=== Only in A ===", &columns)?;
            for diff in &only_a {
                let size = diff.entry_a.as_ref().map_or(0, |entry| entry.size);
                self.row(diff, "-", "", &size.to_string(), "-", Color::Red, &columns)?;
            }
            writeln!(self.writer)?;
        }

        if !only_b.is_empty() {
            self.header("=== Only in B ===", &columns)?;
            for diff in &only_b {
                let size = diff.entry_b.as_ref().map_or(0, |entry| entry.size);
                self.row(diff, "+", "", "-", &size.to_string(), Color::Green, &columns)?;
            }
            writeln!(self.writer)?;
        }

        if !changed.is_empty() {
            self.header("=== Changed ===", &columns)?;
            for diff in &changed {
                let mut detail = diff.summary();
                if detail.chars().count() > columns.detail {
                    detail = diff
                        .short_details()
                        .first()
                        .map(|short| short.to_string())
                        .unwrap_or_default();
                }
                let size_a = diff.entry_a.as_ref().map_or(0, |entry| entry.size);
                let size_b = diff.entry_b.as_ref().map_or(0, |entry| entry.size);
                self.row(
                    diff,
                    "~",
                    &detail,
                    &size_a.to_string(),
                    &size_b.to_string(),
                    Color::Yellow,
                    &columns,
                )?;

                if self.options.verbose {
                    self.members(diff)?;
                }
            }
            writeln!(self.writer)?;
        }

        write!(
            self.writer,
            "Summary: {} only in A, {} only in B, {} changed",
            only_a.len(),
            only_b.len(),
            changed.len()
        )?;
        if synced > 0 {
            write!(self.writer, ", {} synced", synced)?;
        }
        writeln!(self.writer)?;

        Ok(())
    }

    fn select(diffs: &[DiffEntry], kind: DiffKind) -> Vec<&DiffEntry> {
        diffs.iter().filter(|diff| diff.kind == kind).collect()
    }

    fn columns<'d>(&self, diffs: impl Iterator<Item = &'d DiffEntry>) -> Columns {
        let detail = diffs
            .map(|diff| diff.summary().chars().count())
            .fold(MIN_DETAIL_WIDTH, usize::max)
            .min(MAX_DETAIL_WIDTH);
        let file = self
            .options
            .width
            .saturating_sub(FIXED_WIDTH + detail + GROUP_WIDTH)
            .max(MIN_FILE_WIDTH);

        Columns {
            detail,
            group: GROUP_WIDTH,
            file,
        }
    }

    fn header(&mut self, title: &str, columns: &Columns) -> anyhow::Result<()> {
        let header = format!(
            "  {}  {:<dw$}  {:<gw$}  {:<fw$}  {:>8}  {:>8}",
            "S",
            "DETAIL",
            "GROUP",
            "FILE",
            "SIZE_A",
            "SIZE_B",
            dw = columns.detail,
            gw = columns.group,
            fw = columns.file,
        );
        let separator = "-".repeat(self.options.width);

        for line in [title, header.as_str(), separator.as_str()] {
            let line = self.paint(line, Color::Cyan);
            writeln!(self.writer, "{}", line)?;
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn row(
        &mut self,
        diff: &DiffEntry,
        status: &str,
        detail: &str,
        size_a: &str,
        size_b: &str,
        color: Color,
        columns: &Columns,
    ) -> anyhow::Result<()> {
        let mut path = slash_path(&diff.relative_path);
        if diff.is_dir() {
            path.push('/');
        }
        let (group, file) = split_group(&path);

        let line = format!(
            "  {}  {:<dw$}  {:<gw$}  {:<fw$}  {:>8}  {:>8}",
            status,
            detail,
            truncate_path(group, columns.group),
            truncate_path(file, columns.file),
            size_a,
            size_b,
            dw = columns.detail,
            gw = columns.group,
            fw = columns.file,
        );
        let line = self.paint(&line, color);
        writeln!(self.writer, "{}", line)?;

        Ok(())
    }

    fn members(&mut self, diff: &DiffEntry) -> anyhow::Result<()> {
        let Some(members) = &diff.archive_details else {
            return Ok(());
        };

        for member in members {
            let line = format!(
                "      {:<8}  {}  ({})",
                member.category.label(),
                member.member_name,
                member.reason
            );
            let line = self.paint(&line, Color::Yellow);
            writeln!(self.writer, "{}", line)?;

            for edit in member.text_edits.iter().flatten() {
                let line = match edit {
                    Edit::Delete { .. } => self.paint(&edit.to_string(), Color::Red),
                    Edit::Insert { .. } => self.paint(&edit.to_string(), Color::Green),
                    Edit::Equal { .. } => edit.to_string(),
                };
                writeln!(self.writer, "{}", line)?;
            }
        }

        Ok(())
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.options.color.is_enabled() {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }
}

/// First component is the group; top-level paths fall into `.`
fn split_group(path: &str) -> (&str, &str) {
    match path.split_once('/') {
        Some((group, file)) => (group, file),
        None => (".", path),
    }
}

/// Keeps the tail of `path`, marking the cut with `...`
fn truncate_path(path: &str, max_len: usize) -> String {
    let len = path.chars().count();
    if len <= max_len {
        return path.to_string();
    }
    if max_len <= 3 {
        return path.chars().take(max_len).collect();
    }

    let tail = path.chars().skip(len - (max_len - 3)).collect::<String>();
    format!("...{}", tail)
}
