//! Data models: configuration, documents, and run statistics.

pub mod config;
pub mod document;
pub mod stats;

pub use config::SortConfig;
pub use document::{Classification, Document, ExtractedDate, KeywordMatch, PageText, RecognizerClass};
pub use stats::{RunReport, RunStats};
