use crate::artifacts::core::slash_path;
use crate::artifacts::ignore::pattern::IgnorePattern;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

pub const RULES_FILE_NAME: &str = ".gitignore";

/// Per-directory rule lists, keyed by the directory's path relative to the
/// comparison root (the root itself is the empty path).
///
/// Directories without a readable rules file are cached as empty lists so
/// they are only probed once.
#[derive(Debug, Default)]
pub struct PatternCache {
    rules: HashMap<PathBuf, Vec<IgnorePattern>>,
}

impl PatternCache {
    pub fn load(&mut self, root: &Path, dir: &Path) {
        if self.rules.contains_key(dir) {
            return;
        }

        let rules_path = root.join(dir).join(RULES_FILE_NAME);
        let patterns = match std::fs::read_to_string(&rules_path) {
            Ok(content) => IgnorePattern::parse_rules(&content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                tracing::debug!(path = %rules_path.display(), %err, "unreadable rules file treated as empty");
                Vec::new()
            }
        };

        self.rules.insert(dir.to_path_buf(), patterns);
    }

    pub fn get(&self, dir: &Path) -> &[IgnorePattern] {
        self.rules.get(dir).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Decides whether a path below one comparison root is excluded.
///
/// Base names in the always-exclude set are excluded unconditionally. Any
/// other path is run through the rules of every ancestor directory, root
/// first and top to bottom within a file; the last matching rule wins.
#[derive(Debug)]
pub struct IgnoreMatcher {
    root: Box<Path>,
    always_exclude: HashSet<String>,
    cache: PatternCache,
}

impl IgnoreMatcher {
    pub fn new<I, S>(root: &Path, always_exclude: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        IgnoreMatcher {
            root: root.into(),
            always_exclude: always_exclude.into_iter().map(Into::into).collect(),
            cache: PatternCache::default(),
        }
    }

    pub fn cache(&self) -> &PatternCache {
        &self.cache
    }

    pub fn is_excluded(&mut self, relative_path: &Path, is_dir: bool) -> bool {
        let base_name = relative_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        if self.always_exclude.contains(&base_name) {
            return true;
        }

        let ancestors = Self::ancestor_dirs(relative_path);
        for dir in &ancestors {
            self.cache.load(&self.root, dir);
        }

        let path = slash_path(relative_path);
        let mut excluded = false;

        for dir in &ancestors {
            for pattern in self.cache.get(dir) {
                if pattern.dir_only && !is_dir {
                    continue;
                }
                if pattern.matches(&path, &base_name) {
                    excluded = !pattern.negated;
                }
            }
        }

        excluded
    }

    /// `a/b/c.txt` yields ``, `a`, `a/b`.
    fn ancestor_dirs(relative_path: &Path) -> Vec<PathBuf> {
        let mut dirs = vec![PathBuf::new()];
        let Some(parent) = relative_path.parent() else {
            return dirs;
        };

        let mut current = PathBuf::new();
        for component in parent.components() {
            current.push(component);
            dirs.push(current.clone());
        }

        dirs
    }
}
