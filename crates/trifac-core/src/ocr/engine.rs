//! OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX
//! runtime).

use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use image::DynamicImage;
use tracing::{debug, info};

use super::OcrEngine;
use crate::error::OcrError;

/// `pure-onnx-ocr` wrapper loading detection/recognition models from a
/// directory.
pub struct PureOcrEngine {
    // `pure_onnx_ocr::engine::OcrEngine` is not `Sync` (interior
    // `RefCell` plan caches), so serialize access to satisfy the
    // `OcrEngine: Send + Sync` bound.
    engine: Mutex<pure_onnx_ocr::engine::OcrEngine>,
}

// SAFETY: the inner engine is `!Send + !Sync` only because its inference
// sessions cache execution plans in `Arc<RefCell<..>>`. Those `Arc`s are
// created in `OcrEngineBuilder::build` and never escape the engine, and
// the `Mutex` guarantees at most one thread touches them at a time.
unsafe impl Send for PureOcrEngine {}
unsafe impl Sync for PureOcrEngine {}

impl PureOcrEngine {
    /// Load an engine from `det.onnx`, `latin_rec.onnx` and
    /// `latin_dict.txt` in `model_dir`.
    pub fn from_dir(model_dir: &Path) -> Result<Self, OcrError> {
        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&model_dir.join("det.onnx"))
            .rec_model_path(&model_dir.join("latin_rec.onnx"))
            .dictionary_path(&model_dir.join("latin_dict.txt"))
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("loaded OCR models from {}", model_dir.display());
        Ok(Self {
            engine: Mutex::new(engine),
        })
    }
}

impl OcrEngine for PureOcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let start = Instant::now();

        let results = self
            .engine
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        // Reading order: coarse rows top to bottom, then left to right.
        let mut regions: Vec<(i32, f32, String)> = results
            .iter()
            .map(|r| {
                let (x, y) = r
                    .bounding_box
                    .exterior()
                    .coords()
                    .next()
                    .map(|c| (c.x as f32, c.y as f32))
                    .unwrap_or((0.0, 0.0));
                ((y / 20.0) as i32, x, r.text.replace("[UNK]", " "))
            })
            .collect();

        regions.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then(a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        });

        let text = regions
            .iter()
            .map(|(_, _, t)| t.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        debug!(
            "OCR: {} text regions in {}ms",
            regions.len(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }
}
