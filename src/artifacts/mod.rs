//! Tree comparison data structures and algorithms
//!
//! - `archive`: document archive inspection and member-level diffing
//! - `core`: shared path and hash helpers
//! - `diff`: file entries, the diff engine and the LCS text diff
//! - `ignore`: gitignore-style exclusion rules
//! - `sync`: reconciliation of auto-fixable differences

pub mod archive;
pub mod core;
pub mod diff;
pub mod ignore;
pub mod sync;
