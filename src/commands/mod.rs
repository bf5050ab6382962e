//! Command implementations
//!
//! - `compare`: walks a tree and its mirror, diffs them and optionally
//!   reconciles the auto-fixable differences
//! - `report`: tabular rendering of the resulting diff list

pub mod compare;
pub mod report;
