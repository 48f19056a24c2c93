//! Core library for sorting loose PDF invoices into date-derived
//! folders.
//!
//! This crate provides:
//! - Keyword matching and multi-format, multi-language date extraction
//! - The classification decision (dated invoice vs. commande bucket)
//! - PDF text acquisition with a page-level OCR fallback seam
//! - Destination resolution with collision handling
//! - A bounded-parallel orchestrator with per-document failure isolation

pub mod classify;
pub mod error;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod sort;

pub use error::{Result, SortError};
pub use models::{
    Classification, Document, ExtractedDate, KeywordMatch, RunReport, RunStats, SortConfig,
};
pub use classify::{classify, DateExtractor, KeywordMatcher};
pub use ocr::OcrEngine;
pub use pdf::{PdfTextSource, TextSource};
pub use sort::{Sorter, COMMANDE_DIR, SUPPLIER_DIR};

#[cfg(feature = "ocr")]
pub use ocr::PureOcrEngine;
