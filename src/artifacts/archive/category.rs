use std::fmt;

/// What a member of a document archive carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Text,
    Meta,
    Style,
    Media,
    Other,
}

impl Category {
    /// Classify a member by its name inside the archive.
    pub fn of(member_name: &str) -> Self {
        let name = member_name.to_lowercase();

        match name.as_str() {
            "word/document.xml" | "word/footnotes.xml" | "word/endnotes.xml"
            | "word/comments.xml" => Category::Text,
            _ if name.starts_with("word/header") || name.starts_with("word/footer") => {
                Category::Text
            }
            "[content_types].xml" | "_rels/.rels" => Category::Meta,
            _ if name.starts_with("docprops/") || name.starts_with("word/_rels/") => {
                Category::Meta
            }
            "word/styles.xml" | "word/settings.xml" | "word/fonttable.xml"
            | "word/numbering.xml" | "word/websettings.xml" => Category::Style,
            _ if name.starts_with("word/theme/") => Category::Style,
            _ if name.starts_with("word/media/") => Category::Media,
            _ => Category::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Text => "text",
            Category::Meta => "meta",
            Category::Style => "style",
            Category::Media => "media",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Members whose plain text is extracted and compared: the body, notes,
/// comments, and headers/footers 1 through 9.
pub fn is_text_bearing(member_name: &str) -> bool {
    let name = member_name.to_lowercase();

    match name.as_str() {
        "word/document.xml" | "word/footnotes.xml" | "word/endnotes.xml"
        | "word/comments.xml" => true,
        _ => ["word/header", "word/footer"].iter().any(|prefix| {
            name.strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix(".xml"))
                .is_some_and(|n| n.len() == 1 && matches!(n.as_bytes()[0], b'1'..=b'9'))
        }),
    }
}
