//! Error types for the trifac-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the trifac library.
#[derive(Error, Debug)]
pub enum SortError {
    /// Text acquisition error.
    #[error("acquisition error: {0}")]
    Acquisition(#[from] AcquisitionError),

    /// File move error.
    #[error("move error: {0}")]
    Move(#[from] MoveError),

    /// ZIP archive error.
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while acquiring text for a document.
///
/// "No date found" is deliberately not here: an undated document is a
/// valid classification, not a failure.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// OCR fallback failed for a page with no native text.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// I/O error reading the source file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the OCR engine seam.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),
}

/// Errors raised while moving a file to its destination.
#[derive(Error, Debug)]
pub enum MoveError {
    /// Ran out of collision-retry attempts at the destination.
    #[error("no collision-free name found for {0} after {1} attempts")]
    CollisionRetriesExhausted(PathBuf, usize),

    /// Failed to create the destination directory.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The rename (or copy fallback) failed.
    #[error("failed to move {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

/// Errors raised while expanding a ZIP archive.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Failed to open the archive file.
    #[error("failed to open archive: {0}")]
    Open(String),

    /// Failed to extract the archive contents.
    #[error("failed to extract archive: {0}")]
    Extract(String),
}

/// Result type for the trifac library.
pub type Result<T> = std::result::Result<T, SortError>;
