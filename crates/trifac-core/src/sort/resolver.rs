//! Destination resolution: directory mapping, filename collisions, and
//! the actual move.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;
use uuid::Uuid;

use crate::error::MoveError;
use crate::models::document::Classification;

/// Directory under each year folder for dated invoices.
pub const SUPPLIER_DIR: &str = "Facture fournisseur";

/// Catch-all bucket for documents with no extractable date.
pub const COMMANDE_DIR: &str = "commande";

/// Maps classifications to destinations and hands out collision-free
/// final paths.
///
/// Owns the only cross-document shared state besides the run counters:
/// the directory-creation cache and the claimed-destination set. Each is
/// guarded by its own mutex and touched in one coarse critical section
/// per operation.
pub struct PathResolver {
    root: PathBuf,
    dry_run: bool,
    suffix_len: usize,
    max_attempts: usize,
    created: Mutex<HashSet<PathBuf>>,
    claimed: Mutex<HashSet<PathBuf>>,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            root: root.into(),
            dry_run,
            suffix_len: 3,
            max_attempts: 8,
            created: Mutex::new(HashSet::new()),
            claimed: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_collision_policy(mut self, suffix_len: usize, max_attempts: usize) -> Self {
        self.suffix_len = suffix_len.max(1);
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Destination directory for a classification.
    pub fn target_dir(&self, classification: &Classification) -> PathBuf {
        match classification {
            Classification::Dated { year, month } => self
                .root
                .join(year.to_string())
                .join(SUPPLIER_DIR)
                .join(format!("{:02}", month)),
            Classification::Undated => self.root.join(COMMANDE_DIR),
        }
    }

    /// Ensure the destination directory exists and claim a collision-free
    /// final path for the file.
    pub fn resolve(
        &self,
        classification: &Classification,
        source: &Path,
    ) -> Result<PathBuf, MoveError> {
        let dir = self.target_dir(classification);
        self.ensure_dir(&dir)?;

        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());

        // One critical section covers the existence check and the claim
        // so two workers can never pick the same destination. Claims also
        // stand in for files a dry run would have moved.
        let mut claimed = self.claimed.lock().expect("claimed set lock poisoned");

        let preferred = dir.join(&file_name);
        if !preferred.exists() && !claimed.contains(&preferred) {
            claimed.insert(preferred.clone());
            return Ok(preferred);
        }

        let (stem, extension) = split_name(&file_name);
        for _ in 0..self.max_attempts {
            let candidate = dir.join(format!(
                "{}_{}{}",
                stem,
                random_suffix(self.suffix_len),
                extension
            ));
            if !candidate.exists() && !claimed.contains(&candidate) {
                debug!(
                    "duplicate name, renamed to {}",
                    candidate.file_name().unwrap_or_default().to_string_lossy()
                );
                claimed.insert(candidate.clone());
                return Ok(candidate);
            }
        }

        Err(MoveError::CollisionRetriesExhausted(
            preferred,
            self.max_attempts,
        ))
    }

    /// Move the file to its claimed destination. Either the file lands at
    /// `dest`, or it stays at `source` and the error is reported.
    pub fn move_file(&self, source: &Path, dest: &Path) -> Result<(), MoveError> {
        if self.dry_run {
            return Ok(());
        }

        if fs::rename(source, dest).is_ok() {
            return Ok(());
        }

        // Rename fails across filesystems; fall back to copy + delete.
        fs::copy(source, dest)
            .and_then(|_| fs::remove_file(source))
            .map_err(|e| {
                let _ = fs::remove_file(dest);
                MoveError::Rename {
                    from: source.to_path_buf(),
                    to: dest.to_path_buf(),
                    source: e,
                }
            })
    }

    fn ensure_dir(&self, dir: &Path) -> Result<(), MoveError> {
        let mut created = self.created.lock().expect("dir cache lock poisoned");
        if created.contains(dir) {
            return Ok(());
        }
        if !self.dry_run {
            fs::create_dir_all(dir).map_err(|e| MoveError::CreateDir {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }
        created.insert(dir.to_path_buf());
        Ok(())
    }
}

fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) if i > 0 => name.split_at(i),
        _ => (name, ""),
    }
}

fn random_suffix(len: usize) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    hex[..len.min(hex.len())].to_string()
}
