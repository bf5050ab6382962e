//! Member-level comparison of two document archives
//!
//! Two archives are compared member by member using content hashes. Members
//! that carry document text get a second look: their plain text is extracted
//! on both sides so that a member whose bytes changed only because of
//! markup (run splitting, attributes, formatting) is demoted to `Style`,
//! while a genuine text edit stays `Text` and carries an edit script.
//!
//! The resulting label drives reconciliation: only `docx:not-text` and
//! `docx:identical` archives may be copied over the mirror.

use crate::artifacts::archive::category::{Category, is_text_bearing};
use crate::artifacts::archive::extractor::ArchiveTextExtractor;
use crate::artifacts::diff::lcs::{Edit, text_diff};
use std::fmt;
use std::io::{Read, Seek};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveLabel {
    /// At least one text-bearing member differs in its plain text
    Text,
    /// Members differ, but none in plain text
    NotText,
    /// No member differs
    Identical,
    /// One of the archives could not be opened
    Error,
}

impl ArchiveLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveLabel::Text => "docx:text",
            ArchiveLabel::NotText => "docx:not-text",
            ArchiveLabel::Identical => "docx:identical",
            ArchiveLabel::Error => "docx:err",
        }
    }

    /// Whether the difference is safe to resolve by copying the primary file
    pub fn is_cosmetic(&self) -> bool {
        matches!(self, ArchiveLabel::NotText | ArchiveLabel::Identical)
    }
}

impl fmt::Display for ArchiveLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMemberDiff {
    pub member_name: String,
    pub category: Category,
    pub reason: String,
    pub text_edits: Option<Vec<Edit<String>>>,
}

impl ArchiveMemberDiff {
    fn new(member_name: &str, category: Category, reason: impl Into<String>) -> Self {
        ArchiveMemberDiff {
            member_name: member_name.to_string(),
            category,
            reason: reason.into(),
            text_edits: None,
        }
    }

    fn with_edits(mut self, edits: Vec<Edit<String>>) -> Self {
        self.text_edits = Some(edits);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveAnalysis {
    pub label: ArchiveLabel,
    pub members: Vec<ArchiveMemberDiff>,
}

impl ArchiveAnalysis {
    fn error() -> Self {
        ArchiveAnalysis {
            label: ArchiveLabel::Error,
            members: Vec::new(),
        }
    }

    fn from_members(members: Vec<ArchiveMemberDiff>) -> Self {
        let label = if members.is_empty() {
            ArchiveLabel::Identical
        } else if members.iter().any(|m| m.category == Category::Text) {
            ArchiveLabel::Text
        } else {
            ArchiveLabel::NotText
        };

        ArchiveAnalysis { label, members }
    }
}

#[derive(Debug, Clone, Copy)]
enum Side {
    A,
    B,
}

impl Side {
    fn name(&self) -> &'static str {
        match self {
            Side::A => "A",
            Side::B => "B",
        }
    }
}

/// Whether a path names a document archive, by extension
pub fn is_archive(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("docx"))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveDiffer;

impl ArchiveDiffer {
    pub fn analyze(&self, path_a: &Path, path_b: &Path) -> ArchiveAnalysis {
        let opened = ArchiveTextExtractor::open(path_a)
            .and_then(|a| Ok((a, ArchiveTextExtractor::open(path_b)?)));

        match opened {
            Ok((mut a, mut b)) => self.compare(&mut a, &mut b),
            Err(err) => {
                tracing::warn!(a = %path_a.display(), b = %path_b.display(), "archive inspection failed: {err:#}");
                ArchiveAnalysis::error()
            }
        }
    }

    pub fn compare<R: Read + Seek>(
        &self,
        a: &mut ArchiveTextExtractor<R>,
        b: &mut ArchiveTextExtractor<R>,
    ) -> ArchiveAnalysis {
        let members_a = a.members();
        let members_b = b.members();
        let mut diffs = Vec::new();

        for (name, info_a) in &members_a {
            match members_b.get(name) {
                None => diffs.push(Self::one_sided(a, name, Side::A)),
                Some(info_b) if info_a.hash != info_b.hash => {
                    diffs.push(Self::changed(a, b, name));
                }
                Some(_) => {}
            }
        }

        for name in members_b.keys().filter(|name| !members_a.contains_key(*name)) {
            diffs.push(Self::one_sided(b, name, Side::B));
        }

        ArchiveAnalysis::from_members(diffs)
    }

    fn one_sided<R: Read + Seek>(
        extractor: &mut ArchiveTextExtractor<R>,
        name: &str,
        side: Side,
    ) -> ArchiveMemberDiff {
        let category = Category::of(name);
        let reason = format!("only in {}", side.name());

        if category != Category::Text || !is_text_bearing(name) {
            return ArchiveMemberDiff::new(name, category, reason);
        }

        match extractor.member_text(name) {
            Ok(text) if text.is_empty() => {
                ArchiveMemberDiff::new(name, Category::Meta, format!("{reason} (empty)"))
            }
            Ok(text) => {
                let edits = match side {
                    Side::A => text_diff(&text, ""),
                    Side::B => text_diff("", &text),
                };
                ArchiveMemberDiff::new(name, category, reason).with_edits(edits)
            }
            Err(err) => {
                tracing::debug!(member = name, "text extraction failed: {err:#}");
                ArchiveMemberDiff::new(name, category, reason)
            }
        }
    }

    fn changed<R: Read + Seek>(
        a: &mut ArchiveTextExtractor<R>,
        b: &mut ArchiveTextExtractor<R>,
        name: &str,
    ) -> ArchiveMemberDiff {
        let category = Category::of(name);

        if category != Category::Text || !is_text_bearing(name) {
            return ArchiveMemberDiff::new(name, category, "hash differs");
        }

        match (a.member_text(name), b.member_text(name)) {
            (Ok(text_a), Ok(text_b)) if text_a == text_b => {
                ArchiveMemberDiff::new(name, Category::Style, "markup only (text identical)")
            }
            (Ok(text_a), Ok(text_b)) => {
                ArchiveMemberDiff::new(name, category, "text content differs")
                    .with_edits(text_diff(&text_a, &text_b))
            }
            _ => ArchiveMemberDiff::new(name, category, "hash differs"),
        }
    }
}
