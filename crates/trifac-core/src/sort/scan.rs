//! Bounded-depth discovery of candidate PDF files.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::classify::patterns::YEAR_DIR;
use crate::sort::resolver::COMMANDE_DIR;

/// Enumerate PDF files up to `max_depth` directory levels below `root`.
///
/// Directories named after a year in [2000, 2099] and the commande bucket
/// are never descended into, so already-sorted files are not reprocessed
/// on subsequent runs.
pub fn find_pdfs(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth + 1)
        .into_iter()
        .filter_entry(|entry| {
            if !entry.file_type().is_dir() {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !YEAR_DIR.is_match(&name) && !name.eq_ignore_ascii_case(COMMANDE_DIR)
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false)
        })
        .collect();

    // Deterministic order keeps logs and reports stable; processing
    // itself has no ordering dependency.
    files.sort();

    for file in &files {
        debug!("found {}", file.display());
    }
    files
}
