//! Filesystem-facing components
//!
//! - `config`: user configuration loading
//! - `mirror`: resolution of the mirror tree from the primary path
//! - `workspace`: tree walking, exclusion and content hashing

pub mod config;
pub mod mirror;
pub mod workspace;
