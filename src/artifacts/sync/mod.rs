//! Reconciliation of auto-fixable differences from A onto B
//!
//! - `reconciler`: archive copy and permission fix passes

pub mod reconciler;
