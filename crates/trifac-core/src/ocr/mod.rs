//! OCR seam.
//!
//! OCR inference is an external collaborator: the pipeline only defines
//! how recognized text, once produced, participates in classification.
//! Callers supply an [`OcrEngine`]; without one, pages lacking native
//! text simply contribute no characters.

#[cfg(feature = "ocr")]
mod engine;

#[cfg(feature = "ocr")]
pub use engine::PureOcrEngine;

use image::DynamicImage;

use crate::error::OcrError;

/// Recognizes text on a page image, in reading order.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}
