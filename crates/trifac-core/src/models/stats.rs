//! Run statistics and the end-of-run report.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Counters for a sorting run.
///
/// Owned by the orchestrator and mutated only inside its critical
/// sections; read once at the end to produce the report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// PDF files discovered by the scan.
    pub files_found: usize,
    /// Dated documents filed under a year/month directory.
    pub sorted: usize,
    /// Undated documents routed to the commande bucket.
    pub commande: usize,
    /// Documents left in place after a per-document error.
    pub unsorted: usize,
    /// Documents left in place because of the year filter.
    pub skipped: usize,
    /// Error events (acquisition, move, archive).
    pub errors: usize,
    /// Documents where at least one page went through OCR.
    pub ocr_processed: usize,
    /// ZIP archives expanded (or counted as would-extract in dry-run).
    pub archives_extracted: usize,
    /// Empty directories removed by the post-run cleanup.
    pub empty_dirs_removed: usize,
}

impl RunStats {
    /// Moved documents over discovered documents, as a percentage.
    pub fn success_rate(&self) -> f64 {
        if self.files_found == 0 {
            0.0
        } else {
            (self.sorted + self.commande) as f64 / self.files_found as f64 * 100.0
        }
    }
}

/// Everything a finished run reports back to the caller.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Final counters.
    pub stats: RunStats,
    /// Files left in place after an error, in no particular order.
    pub unsorted: Vec<PathBuf>,
    /// Per-document error reasons.
    pub failures: Vec<(PathBuf, String)>,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl RunReport {
    /// Average wall-clock time per discovered file.
    pub fn avg_per_file(&self) -> Duration {
        if self.stats.files_found == 0 {
            Duration::ZERO
        } else {
            self.elapsed / self.stats.files_found as u32
        }
    }
}
