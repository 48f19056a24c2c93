//! Configuration structures for the sorting pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for a sorting run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    /// Keyword matching configuration.
    pub keywords: KeywordConfig,

    /// Directory scanning configuration.
    pub scan: ScanConfig,

    /// ZIP archive handling configuration.
    pub archive: ArchiveConfig,

    /// Filename collision handling configuration.
    pub collision: CollisionConfig,

    /// OCR model location for scanned PDFs.
    pub ocr: OcrModelConfig,

    /// Number of parallel workers (0 = available parallelism).
    pub workers: usize,

    /// Only file invoices dated this year; everything else stays put.
    pub year_filter: Option<i32>,

    /// Compute classifications and destinations without touching the
    /// filesystem.
    pub dry_run: bool,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            keywords: KeywordConfig::default(),
            scan: ScanConfig::default(),
            archive: ArchiveConfig::default(),
            collision: CollisionConfig::default(),
            ocr: OcrModelConfig::default(),
            workers: 0,
            year_filter: None,
            dry_run: false,
        }
    }
}

impl SortConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Effective worker count.
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }
}

/// Keyword matching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    /// Extra keywords added to the built-in multi-language set.
    pub extra: Vec<String>,

    /// Extra deny phrases added to the built-in deny list.
    pub extra_deny: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            extra: Vec::new(),
            extra_deny: Vec::new(),
        }
    }
}

/// Directory scanning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// How many directory levels below the root to descend into.
    pub max_depth: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { max_depth: 2 }
    }
}

/// ZIP archive handling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Expand top-level ZIP archives before scanning.
    pub expand: bool,

    /// Delete each archive after a successful expansion.
    pub remove_after_extract: bool,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            expand: true,
            remove_after_extract: false,
        }
    }
}

/// Filename collision handling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Length of the random alphanumeric suffix appended to the stem.
    pub suffix_len: usize,

    /// Maximum suffix attempts before the move is reported as an error.
    pub max_attempts: usize,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            suffix_len: 3,
            max_attempts: 8,
        }
    }
}

/// Optional OCR model location for the CLI wiring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrModelConfig {
    /// Directory containing `det.onnx`, `latin_rec.onnx` and
    /// `latin_dict.txt`.
    pub model_dir: Option<PathBuf>,
}
