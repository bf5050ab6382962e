use crate::artifacts::ignore::glob::Glob;

/// How a pattern is evaluated against a path, decided once at parse time
#[derive(Debug, Clone)]
enum Rule {
    /// `**`
    Everything,
    /// `**/rest`: the full path or any suffix of it matches `rest`
    AnySuffix(Glob),
    /// `prefix/**`: the prefix itself or anything below it
    Under(String),
    /// `prefix/**/rest`: below the prefix, then `rest` against any suffix
    UnderThenSuffix { prefix: String, rest: Glob },
    /// any other use of `**`
    Never,
    /// contains `/`: the full relative path
    Anchored(Glob),
    /// the base name, then every path suffix
    Name(Glob),
}

impl Rule {
    fn compile(pattern: &str, anchored: bool) -> Self {
        if pattern.contains("**") {
            if pattern == "**" {
                return Rule::Everything;
            }
            if let Some(rest) = pattern.strip_prefix("**/") {
                return Rule::AnySuffix(Glob::new(rest));
            }
            if let Some(prefix) = pattern.strip_suffix("/**") {
                return Rule::Under(prefix.to_string());
            }
            if let Some((prefix, rest)) = pattern.split_once("/**/") {
                return Rule::UnderThenSuffix {
                    prefix: prefix.to_string(),
                    rest: Glob::new(rest),
                };
            }
            return Rule::Never;
        }

        if anchored {
            Rule::Anchored(Glob::new(pattern))
        } else {
            Rule::Name(Glob::new(pattern))
        }
    }
}

/// One parsed line of an ignore file
#[derive(Debug, Clone)]
pub struct IgnorePattern {
    pub pattern: String,
    pub negated: bool,
    pub dir_only: bool,
    pub anchored: bool,
    rule: Rule,
}

impl IgnorePattern {
    /// Parse a single line; blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let negated = match line.strip_prefix('!') {
            Some(rest) => {
                line = rest;
                true
            }
            None => false,
        };

        let dir_only = match line.strip_suffix('/') {
            Some(rest) => {
                line = rest;
                true
            }
            None => false,
        };

        let anchored = line.contains('/');

        Some(IgnorePattern {
            pattern: line.to_string(),
            negated,
            dir_only,
            anchored,
            rule: Rule::compile(line, anchored),
        })
    }

    pub fn parse_rules(content: &str) -> Vec<Self> {
        content.lines().filter_map(Self::parse).collect()
    }

    /// `path` is `/`-separated and relative to the comparison root.
    pub fn matches(&self, path: &str, base_name: &str) -> bool {
        match &self.rule {
            Rule::Everything => true,
            Rule::AnySuffix(rest) => rest.matches(path) || suffixes(path).any(|s| rest.matches(s)),
            Rule::Under(prefix) => is_under(path, prefix),
            Rule::UnderThenSuffix { prefix, rest } => {
                if !is_under(path, prefix) {
                    return false;
                }
                let remainder = path
                    .strip_prefix(prefix.as_str())
                    .and_then(|r| r.strip_prefix('/'))
                    .unwrap_or(path);

                rest.matches(remainder) || suffixes(remainder).any(|s| rest.matches(s))
            }
            Rule::Never => false,
            Rule::Anchored(glob) => glob.matches(path),
            Rule::Name(glob) => glob.matches(base_name) || suffixes(path).any(|s| glob.matches(s)),
        }
    }
}

fn is_under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// `a/b/c` yields `a/b/c`, `b/c`, `c`.
fn suffixes(path: &str) -> impl Iterator<Item = &str> {
    std::iter::once(path).chain(
        path.match_indices('/')
            .map(move |(idx, _)| &path[idx + 1..]),
    )
}
