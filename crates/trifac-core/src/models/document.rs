//! Document and classification data models.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Text acquired for a single PDF page.
#[derive(Debug, Clone)]
pub struct PageText {
    /// Page number (1-indexed).
    pub number: u32,
    /// Text extracted from this page (native or OCR).
    pub text: String,
    /// Whether OCR was required because the page had no native text.
    pub ocr_used: bool,
}

/// A discovered PDF document with its acquired page texts.
///
/// Immutable once the text source has produced it.
#[derive(Debug, Clone)]
pub struct Document {
    /// Source file path.
    pub path: PathBuf,
    /// Per-page text in page order.
    pub pages: Vec<PageText>,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, pages: Vec<PageText>) -> Self {
        Self {
            path: path.into(),
            pages,
        }
    }

    /// Concatenated lowercase text of all pages, newlines collapsed to
    /// spaces. This is the single haystack the keyword matcher and date
    /// extractor both scan, so page order is preserved.
    pub fn full_text(&self) -> String {
        let mut text = String::new();
        for page in &self.pages {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&page.text.replace('\n', " ").to_lowercase());
        }
        text
    }

    /// Whether any page needed the OCR fallback.
    pub fn ocr_used(&self) -> bool {
        self.pages.iter().any(|p| p.ocr_used)
    }
}

/// Result of scanning a document's text against the keyword set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordMatch {
    /// Configured keywords found in the text (deduplicated).
    pub matched: BTreeSet<String>,
    /// A deny phrase was found; the document is an explicit non-invoice.
    pub denied: bool,
}

impl KeywordMatch {
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }
}

/// Which recognizer class produced a date candidate, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecognizerClass {
    /// `yyyy-mm-dd`, least ambiguous.
    IsoYmd,
    /// `dd/mm/yyyy` with `/`, `-` or `.` separators.
    NumericDmy,
    /// `dd/mm/yy`, two-digit year windowed into the 2000s.
    NumericDmyShort,
    /// `dd <month name> yyyy` (French or English month names).
    MonthName,
}

impl RecognizerClass {
    /// All classes in cascade priority order.
    pub const CASCADE: [RecognizerClass; 4] = [
        RecognizerClass::IsoYmd,
        RecognizerClass::NumericDmy,
        RecognizerClass::NumericDmyShort,
        RecognizerClass::MonthName,
    ];
}

/// A normalized date selected from a document's text.
///
/// Only year and month survive downstream; folder granularity is monthly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDate {
    /// Four-digit year within the plausible bound.
    pub year: i32,
    /// Month of year, 1-12.
    pub month: u32,
    /// The raw substring the date was parsed from.
    pub raw: String,
    /// Recognizer class that produced the candidate.
    pub recognizer: RecognizerClass,
}

/// Classification outcome for a document whose text was acquired.
///
/// Acquisition failures never reach classification; they are recorded as
/// per-document errors by the orchestrator and the file stays put.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// An in-bound date was found; file under the year/month hierarchy.
    Dated { year: i32, month: u32 },
    /// No date found (or explicit non-invoice); file under the commande
    /// bucket.
    Undated,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_text_lowercases_and_joins() {
        let doc = Document::new(
            "a.pdf",
            vec![
                PageText {
                    number: 1,
                    text: "FACTURE\nNo. 42".to_string(),
                    ocr_used: false,
                },
                PageText {
                    number: 2,
                    text: "Total 12 EUR".to_string(),
                    ocr_used: true,
                },
            ],
        );
        assert_eq!(doc.full_text(), "facture no. 42 total 12 eur");
        assert!(doc.ocr_used());
    }
}
