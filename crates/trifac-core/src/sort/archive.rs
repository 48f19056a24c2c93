//! Expansion of top-level ZIP archives before PDF discovery.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::ArchiveError;

/// Outcome of the archive expansion phase.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Archives expanded successfully.
    pub extracted: usize,
    /// Archives that failed to open or extract.
    pub failed: usize,
}

/// ZIP files directly under `root`, in name order.
pub fn top_level_zips(root: &Path) -> Vec<PathBuf> {
    let mut zips: Vec<PathBuf> = fs::read_dir(root)
        .into_iter()
        .flatten()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .map(|ext| ext.eq_ignore_ascii_case("zip"))
                    .unwrap_or(false)
        })
        .collect();
    zips.sort();
    zips
}

/// Expand each top-level archive into `root`. A failing archive is
/// recorded and skipped; it never aborts the run.
pub fn expand_archives(root: &Path, remove_after: bool) -> ArchiveSummary {
    let mut summary = ArchiveSummary::default();

    for path in top_level_zips(root) {
        match expand_one(&path, root) {
            Ok(()) => {
                info!("extracted {}", path.display());
                summary.extracted += 1;
                if remove_after {
                    if let Err(e) = fs::remove_file(&path) {
                        warn!("failed to remove {}: {}", path.display(), e);
                    }
                }
            }
            Err(e) => {
                warn!("failed to extract {}: {}", path.display(), e);
                summary.failed += 1;
            }
        }
    }

    summary
}

/// Count what expansion would do without extracting anything: each
/// top-level archive is opened to check it is readable, so a corrupt
/// ZIP produces the same error count as a real expansion.
pub fn survey_archives(root: &Path) -> ArchiveSummary {
    let mut summary = ArchiveSummary::default();

    for path in top_level_zips(root) {
        let readable = fs::File::open(&path)
            .map_err(|e| ArchiveError::Open(e.to_string()))
            .and_then(|f| zip::ZipArchive::new(f).map_err(|e| ArchiveError::Open(e.to_string())));
        match readable {
            Ok(_) => summary.extracted += 1,
            Err(e) => {
                warn!("unreadable archive {}: {}", path.display(), e);
                summary.failed += 1;
            }
        }
    }

    summary
}

fn expand_one(path: &Path, dest: &Path) -> Result<(), ArchiveError> {
    let file = fs::File::open(path).map_err(|e| ArchiveError::Open(e.to_string()))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| ArchiveError::Open(e.to_string()))?;
    archive
        .extract(dest)
        .map_err(|e| ArchiveError::Extract(e.to_string()))
}
