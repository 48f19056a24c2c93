//! Run orchestration: discovery, bounded-parallel dispatch, statistics,
//! and post-run cleanup.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::classify::{classify, diagnostic_snippet, DateExtractor, KeywordMatcher};
use crate::error::Result;
use crate::models::config::SortConfig;
use crate::models::document::Classification;
use crate::models::stats::{RunReport, RunStats};
use crate::pdf::TextSource;
use crate::sort::archive::{expand_archives, survey_archives};
use crate::sort::resolver::PathResolver;
use crate::sort::scan::find_pdfs;

type ProgressFn = dyn Fn(usize, usize) + Send + Sync;

/// What happened to one document.
///
/// States per document: Discovered -> TextAcquired -> Classified ->
/// Moved | RoutedToCommande | Errored; `Skipped` covers year-filter
/// misses, which never reach the resolver.
#[derive(Debug)]
enum Outcome {
    Sorted(PathBuf),
    Commande(PathBuf),
    Skipped,
    Errored(String),
}

/// Drives the full pipeline over a directory tree.
pub struct Sorter {
    config: SortConfig,
    source: Arc<dyn TextSource>,
    matcher: KeywordMatcher,
    dates: DateExtractor,
    progress: Option<Arc<ProgressFn>>,
}

impl Sorter {
    pub fn new(config: SortConfig, source: Arc<dyn TextSource>) -> Self {
        let matcher = KeywordMatcher::new()
            .with_extra(&config.keywords.extra)
            .with_extra_deny(&config.keywords.extra_deny);
        Self {
            config,
            source,
            matcher,
            dates: DateExtractor::new(),
            progress: None,
        }
    }

    /// Report (completed, total) after each document.
    pub fn with_progress(mut self, f: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(f));
        self
    }

    /// Run the pipeline over `root`. Per-document failures are recorded,
    /// never propagated; the returned report is a pure function of the
    /// input set regardless of scheduling order.
    pub async fn run(&self, root: &Path) -> Result<RunReport> {
        let start = Instant::now();
        let mut initial = RunStats::default();

        if self.config.archive.expand {
            if self.config.dry_run {
                // Expansion mutates the tree; a dry run opens each
                // archive to count what it would have extracted, so the
                // statistics match a real run even on a corrupt ZIP.
                let summary = survey_archives(root);
                initial.archives_extracted = summary.extracted;
                initial.errors += summary.failed;
            } else {
                let summary =
                    expand_archives(root, self.config.archive.remove_after_extract);
                initial.archives_extracted = summary.extracted;
                initial.errors += summary.failed;
            }
        }

        let files = find_pdfs(root, self.config.scan.max_depth);
        initial.files_found = files.len();
        info!("found {} PDF file(s) to process", files.len());

        let total = files.len();
        let stats = Arc::new(Mutex::new(initial));
        let unsorted = Arc::new(Mutex::new(Vec::new()));
        let failures = Arc::new(Mutex::new(Vec::new()));
        let completed = Arc::new(Mutex::new(0usize));

        let resolver = Arc::new(
            PathResolver::new(root, self.config.dry_run).with_collision_policy(
                self.config.collision.suffix_len,
                self.config.collision.max_attempts,
            ),
        );
        let semaphore = Arc::new(Semaphore::new(self.config.effective_workers()));

        let mut set = JoinSet::new();
        for path in files {
            let semaphore = semaphore.clone();
            let source = self.source.clone();
            let matcher = self.matcher.clone();
            let dates = self.dates.clone();
            let resolver = resolver.clone();
            let year_filter = self.config.year_filter;
            let stats = stats.clone();
            let unsorted = unsorted.clone();
            let failures = failures.clone();
            let completed = completed.clone();
            let progress = self.progress.clone();

            set.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("semaphore never closed");

                // Text extraction, OCR and the move are all blocking;
                // keep them off the async workers so one slow OCR pass
                // never stalls the others.
                let fallback_path = path.clone();
                let (path, outcome, ocr_used) = match tokio::task::spawn_blocking(move || {
                    process_document(path, source.as_ref(), &matcher, &dates, &resolver, year_filter)
                })
                .await
                {
                    Ok(result) => result,
                    Err(e) => (
                        fallback_path,
                        Outcome::Errored(format!("worker panicked: {}", e)),
                        false,
                    ),
                };

                {
                    let mut stats = stats.lock().expect("stats lock poisoned");
                    if ocr_used {
                        stats.ocr_processed += 1;
                    }
                    match &outcome {
                        Outcome::Sorted(dest) => {
                            stats.sorted += 1;
                            info!("moved {} -> {}", path.display(), dest.display());
                        }
                        Outcome::Commande(dest) => {
                            stats.commande += 1;
                            info!("routed {} -> {}", path.display(), dest.display());
                        }
                        Outcome::Skipped => {
                            stats.skipped += 1;
                            debug!("skipped {} (year filter)", path.display());
                        }
                        Outcome::Errored(reason) => {
                            stats.errors += 1;
                            stats.unsorted += 1;
                            warn!("error on {}: {}", path.display(), reason);
                            unsorted
                                .lock()
                                .expect("unsorted lock poisoned")
                                .push(path.clone());
                            failures
                                .lock()
                                .expect("failures lock poisoned")
                                .push((path.clone(), reason.clone()));
                        }
                    }
                }

                let done = {
                    let mut completed = completed.lock().expect("completed lock poisoned");
                    *completed += 1;
                    *completed
                };
                if let Some(progress) = progress {
                    progress(done, total);
                }
            });
        }

        while let Some(joined) = set.join_next().await {
            if let Err(e) = joined {
                // The inner spawn_blocking already converts panics; this
                // only fires if the bookkeeping task itself dies.
                warn!("worker task failed: {}", e);
            }
        }

        let mut stats = stats.lock().expect("stats lock poisoned").clone();
        if !self.config.dry_run {
            stats.empty_dirs_removed = remove_empty_dirs(root);
        }

        let mut unsorted = unsorted.lock().expect("unsorted lock poisoned").clone();
        unsorted.sort();
        let mut failures = failures.lock().expect("failures lock poisoned").clone();
        failures.sort();

        Ok(RunReport {
            stats,
            unsorted,
            failures,
            elapsed: start.elapsed(),
        })
    }
}

/// The per-document pipeline: acquire text, match keywords, extract a
/// date, classify, resolve and move. Every failure is folded into the
/// outcome; nothing escapes the document boundary.
fn process_document(
    path: PathBuf,
    source: &dyn TextSource,
    matcher: &KeywordMatcher,
    dates: &DateExtractor,
    resolver: &PathResolver,
    year_filter: Option<i32>,
) -> (PathBuf, Outcome, bool) {
    debug!("processing {}", path.display());

    let document = match source.acquire(&path) {
        Ok(d) => d,
        Err(e) => return (path, Outcome::Errored(e.to_string()), false),
    };
    let ocr_used = document.ocr_used();
    debug!("{}: {} page(s)", path.display(), document.pages.len());

    let text = document.full_text();
    let keywords = matcher.matches(&text);
    if !keywords.is_empty() {
        debug!("{}: keywords {:?}", path.display(), keywords.matched);
    }

    let date = dates.extract(&text);
    if date.is_none() {
        debug!(
            "{}: no date found, text starts: {:?}",
            path.display(),
            diagnostic_snippet(&text)
        );
    }

    let classification = classify(&keywords, date.as_ref());

    if let Some(filter) = year_filter {
        let in_filter =
            matches!(classification, Classification::Dated { year, .. } if year == filter);
        if !in_filter {
            return (path, Outcome::Skipped, ocr_used);
        }
    }

    let dest = match resolver.resolve(&classification, &path) {
        Ok(d) => d,
        Err(e) => return (path, Outcome::Errored(e.to_string()), ocr_used),
    };
    if let Err(e) = resolver.move_file(&path, &dest) {
        return (path, Outcome::Errored(e.to_string()), ocr_used);
    }

    let outcome = match classification {
        Classification::Dated { .. } => Outcome::Sorted(dest),
        Classification::Undated => Outcome::Commande(dest),
    };
    (path, outcome, ocr_used)
}

/// Remove directories left empty by the run, bottom-up so newly-empty
/// parents go too. The root itself is never removed.
fn remove_empty_dirs(root: &Path) -> usize {
    let mut removed = 0;
    for entry in WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_dir() {
            continue;
        }
        let is_empty = fs::read_dir(entry.path())
            .map(|mut it| it.next().is_none())
            .unwrap_or(false);
        if is_empty && fs::remove_dir(entry.path()).is_ok() {
            debug!("removed empty directory {}", entry.path().display());
            removed += 1;
        }
    }
    removed
}
