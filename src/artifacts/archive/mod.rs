//! Zip-packaged XML document archives
//!
//! - `category`: member classification (text, meta, style, media, other)
//! - `extractor`: member hashing and plain-text extraction
//! - `differ`: member-level comparison and the overall archive label

pub mod category;
pub mod differ;
pub mod extractor;
