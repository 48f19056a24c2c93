//! PDF text source backed by lopdf and pdf-extract, with page-level OCR
//! fallback over embedded images.

use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, ImageBuffer, Rgba};
use lopdf::{Dictionary, Object, ObjectId};
use tracing::{debug, trace};

use super::TextSource;
use crate::error::AcquisitionError;
use crate::models::document::{Document, PageText};
use crate::ocr::OcrEngine;

/// Production text source: native PDF text first, OCR on pages without
/// any.
pub struct PdfTextSource {
    ocr: Option<Arc<dyn OcrEngine>>,
}

impl PdfTextSource {
    /// Text source without OCR fallback; pages lacking native text stay
    /// empty.
    pub fn new() -> Self {
        Self { ocr: None }
    }

    /// Attach an OCR engine for pages without native text.
    pub fn with_ocr(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.ocr = Some(engine);
        self
    }
}

impl Default for PdfTextSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSource for PdfTextSource {
    fn acquire(&self, path: &Path) -> Result<Document, AcquisitionError> {
        let data = std::fs::read(path)?;
        let (doc, raw) = load_document(&data)?;

        let page_count = doc.get_pages().len() as u32;
        if page_count == 0 {
            return Err(AcquisitionError::NoPages);
        }

        // A scanned PDF can make pdf-extract fail outright; that is not
        // fatal here, the pages then go through OCR.
        let full_text = pdf_extract::extract_text_from_mem(&raw).unwrap_or_else(|e| {
            debug!("native text extraction failed, relying on OCR: {}", e);
            String::new()
        });

        let mut pages = Vec::with_capacity(page_count as usize);
        for (index, text) in split_pages(&full_text, page_count).into_iter().enumerate() {
            let number = index as u32 + 1;

            if !text.trim().is_empty() {
                debug!("page {}: {} characters of native text", number, text.len());
                pages.push(PageText {
                    number,
                    text,
                    ocr_used: false,
                });
                continue;
            }

            let (text, ocr_used) = self.ocr_page(&doc, number)?;
            pages.push(PageText {
                number,
                text,
                ocr_used,
            });
        }

        Ok(Document::new(path, pages))
    }
}

impl PdfTextSource {
    /// Run OCR over every image on a page with no native text. Without a
    /// configured engine the page simply contributes nothing.
    fn ocr_page(&self, doc: &lopdf::Document, page: u32) -> Result<(String, bool), AcquisitionError> {
        let Some(engine) = &self.ocr else {
            debug!("page {}: no native text and no OCR engine configured", page);
            return Ok((String::new(), false));
        };

        let images = page_images(doc, page);
        if images.is_empty() {
            debug!("page {}: no native text and no decodable images", page);
            return Ok((String::new(), false));
        }

        debug!("page {}: no native text, OCR over {} image(s)", page, images.len());
        let mut text = String::new();
        for image in &images {
            let recognized = engine.recognize(image)?;
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&recognized);
        }
        Ok((text, true))
    }
}

/// Load a PDF, decrypting empty-password encryption the way viewers do.
fn load_document(data: &[u8]) -> Result<(lopdf::Document, Vec<u8>), AcquisitionError> {
    let mut doc = lopdf::Document::load_mem(data)
        .map_err(|e| AcquisitionError::Parse(e.to_string()))?;

    if !doc.is_encrypted() {
        return Ok((doc, data.to_vec()));
    }

    if doc.decrypt("").is_err() {
        return Err(AcquisitionError::Encrypted);
    }
    debug!("decrypted PDF with empty password");

    let mut decrypted = Vec::new();
    doc.save_to(&mut decrypted)
        .map_err(|e| AcquisitionError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
    Ok((doc, decrypted))
}

/// Divide the full extracted text into per-page chunks.
///
/// pdf-extract emits form feeds between pages for most producers; when
/// they are absent, fall back to an even split by line count.
fn split_pages(full_text: &str, page_count: u32) -> Vec<String> {
    let page_count = page_count as usize;

    if full_text.contains('\u{0c}') {
        let mut chunks: Vec<String> = full_text.split('\u{0c}').map(str::to_string).collect();
        chunks.resize(page_count.max(chunks.len()), String::new());
        if chunks.len() > page_count {
            // Merge any trailing overflow into the last page.
            let tail = chunks.split_off(page_count).join(" ");
            if let Some(last) = chunks.last_mut() {
                if !tail.trim().is_empty() {
                    last.push(' ');
                    last.push_str(&tail);
                }
            }
        }
        return chunks;
    }

    let lines: Vec<&str> = full_text.lines().collect();
    let per_page = (lines.len() / page_count.max(1)).max(1);

    (0..page_count)
        .map(|i| {
            let start = (i * per_page).min(lines.len());
            let end = if i + 1 == page_count {
                lines.len()
            } else {
                ((i + 1) * per_page).min(lines.len())
            };
            lines[start..end].join("\n")
        })
        .collect()
}

/// Decodable images on a page, page XObjects first, whole document as a
/// fallback for producers that reference images indirectly.
fn page_images(doc: &lopdf::Document, page: u32) -> Vec<DynamicImage> {
    let pages = doc.get_pages();
    let Some(page_id) = pages.get(&page) else {
        return Vec::new();
    };

    let mut images = Vec::new();
    if let Some(resources) = page_resources(doc, *page_id) {
        if let Ok(xobjects) = resources.get(b"XObject") {
            if let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) {
                for (_name, obj_ref) in xobj_dict.iter() {
                    if let Ok((_, obj)) = doc.dereference(obj_ref) {
                        if let Some(img) = decode_image_object(doc, obj) {
                            images.push(img);
                        }
                    }
                }
            }
        }
    }

    if images.is_empty() {
        trace!("page {}: no XObject images, scanning all objects", page);
        for (_id, object) in doc.objects.iter() {
            if let Some(img) = decode_image_object(doc, object) {
                images.push(img);
            }
        }
    }

    images
}

/// Resources dictionary for a page, walking up the page tree for
/// inherited entries.
fn page_resources(doc: &lopdf::Document, node_id: ObjectId) -> Option<Dictionary> {
    let node = doc.get_object(node_id).ok()?;
    let Object::Dictionary(dict) = node else {
        return None;
    };

    if let Ok(resources) = dict.get(b"Resources") {
        if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
            return Some(res_dict.clone());
        }
    }

    if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent") {
        return page_resources(doc, *parent_id);
    }
    None
}

/// Decode an image XObject stream into a `DynamicImage`.
///
/// Handles DCTDecode (JPEG) and uncompressed 8-bit RGB/grayscale data;
/// exotic encodings (JPX, CCITT, JBIG2) are skipped.
fn decode_image_object(doc: &lopdf::Document, obj: &Object) -> Option<DynamicImage> {
    let Object::Stream(stream) = obj else {
        return None;
    };
    let dict = &stream.dict;

    let subtype = dict.get(b"Subtype").ok()?;
    if subtype.as_name().ok()? != b"Image" {
        return None;
    }

    let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
    let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;
    trace!("image object: {}x{}", width, height);

    let filter_name = dict.get(b"Filter").ok().and_then(|filter| match filter {
        Object::Name(name) => Some(name.clone()),
        Object::Array(arr) => arr
            .first()
            .and_then(|o| o.as_name().ok())
            .map(|n| n.to_vec()),
        _ => None,
    });

    match filter_name.as_deref() {
        Some(b"DCTDecode") => {
            // JPEG data: the raw stream content is the compressed image.
            return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                .ok();
        }
        Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
            trace!("unsupported image encoding, skipping");
            return None;
        }
        _ => {}
    }

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());

    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| match o {
            Object::Name(name) => Some(name.clone()),
            Object::Array(arr) => arr
                .first()
                .and_then(|o| o.as_name().ok())
                .map(|n| n.to_vec()),
            Object::Reference(r) => doc
                .get_object(*r)
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| n.to_vec()),
            _ => None,
        })
        .unwrap_or_else(|| b"DeviceRGB".to_vec());

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);
    if bits != 8 {
        trace!("unsupported bits per component: {}", bits);
        return None;
    }

    decode_raw_image(&data, width, height, &color_space)
}

fn decode_raw_image(data: &[u8], width: u32, height: u32, color_space: &[u8]) -> Option<DynamicImage> {
    // Dimensions come straight from an untrusted dictionary; reject
    // anything whose pixel count does not fit instead of overflowing.
    let pixels = (width as usize).checked_mul(height as usize)?;
    let rgb_len = pixels.checked_mul(3)?;

    if matches!(color_space, b"DeviceRGB" | b"RGB") && data.len() >= rgb_len {
        let mut rgba = Vec::with_capacity(pixels * 4);
        for chunk in data[..rgb_len].chunks_exact(3) {
            rgba.extend_from_slice(chunk);
            rgba.push(255);
        }
        return ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba)
            .map(DynamicImage::ImageRgba8);
    }

    if matches!(color_space, b"DeviceGray" | b"G") && data.len() >= pixels {
        let mut rgba = Vec::with_capacity(pixels * 4);
        for &gray in &data[..pixels] {
            rgba.extend_from_slice(&[gray, gray, gray, 255]);
        }
        return ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba)
            .map(DynamicImage::ImageRgba8);
    }

    trace!(
        "could not decode raw image: len={}, {}x{}, colorspace={:?}",
        data.len(),
        width,
        height,
        String::from_utf8_lossy(color_space)
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pages_form_feed() {
        let pages = split_pages("page one\u{0c}page two", 2);
        assert_eq!(pages, vec!["page one".to_string(), "page two".to_string()]);
    }

    #[test]
    fn test_split_pages_line_heuristic() {
        let pages = split_pages("a\nb\nc\nd", 2);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0], "a\nb");
        assert_eq!(pages[1], "c\nd");
    }

    #[test]
    fn test_split_pages_pads_missing() {
        let pages = split_pages("only\u{0c}", 3);
        assert_eq!(pages.len(), 3);
        assert!(pages[2].is_empty());
    }

    #[test]
    fn test_decode_raw_image_rejects_absurd_dimensions() {
        // Declared dimensions from a broken dictionary must not wrap the
        // pixel-count arithmetic.
        assert!(decode_raw_image(&[], u32::MAX, u32::MAX, b"DeviceRGB").is_none());
        assert!(decode_raw_image(&[0; 12], u32::MAX, 2, b"DeviceGray").is_none());
    }

    #[test]
    fn test_acquire_missing_file_is_acquisition_error() {
        let source = PdfTextSource::new();
        let err = source.acquire(Path::new("/nonexistent/x.pdf")).unwrap_err();
        assert!(matches!(err, AcquisitionError::Io(_)));
    }
}
