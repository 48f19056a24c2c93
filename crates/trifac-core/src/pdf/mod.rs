//! PDF text acquisition: the text-source seam of the pipeline.
//!
//! The classifier never opens a PDF itself; it consumes a [`Document`]
//! produced by a [`TextSource`]. The production implementation extracts
//! native text and falls back to OCR for pages without any.

mod extractor;

pub use extractor::PdfTextSource;

use std::path::Path;

use crate::error::AcquisitionError;
use crate::models::document::Document;

/// Yields per-page text for a candidate file.
pub trait TextSource: Send + Sync {
    /// Acquire all page texts for the file at `path`.
    fn acquire(&self, path: &Path) -> Result<Document, AcquisitionError>;
}
