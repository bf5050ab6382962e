//! Path exclusion
//!
//! - `glob`: shell-glob compilation (`*`, `?`, `[...]`)
//! - `pattern`: one parsed ignore-file line and its matching rules
//! - `matcher`: the per-root matcher with its per-directory rule cache

pub mod glob;
pub mod matcher;
pub mod pattern;
