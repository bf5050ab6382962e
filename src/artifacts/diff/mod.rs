//! Tree comparison and text diffing
//!
//! This module implements the comparison of two scanned trees:
//!
//! - `file_mode`: permission and type bits with `ls`-style rendering
//! - `file_entry`: one scanned path with its metadata
//! - `diff_entry`: diff results and their detail descriptors
//! - `engine`: classification of two scans into only-A, only-B and changed
//! - `lcs`: longest-common-subsequence text diff used for archive members
//!
//! Archive members are compared by `artifacts::archive`, which the engine
//! invokes for changed document archives.

pub mod diff_entry;
pub mod engine;
pub mod file_entry;
pub mod file_mode;
pub mod lcs;
