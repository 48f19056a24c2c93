//! End-to-end orchestrator tests over temporary trees with a stubbed
//! text source.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use trifac_core::error::AcquisitionError;
use trifac_core::models::document::{Document, PageText};
use trifac_core::{SortConfig, Sorter, TextSource, COMMANDE_DIR};

/// Serves canned page text keyed by file name; unknown names fail like
/// a corrupt PDF would. Names starting with `scan_` simulate pages that
/// needed the OCR fallback.
struct StubSource {
    texts: HashMap<String, String>,
}

impl StubSource {
    fn new(entries: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            texts: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        })
    }
}

impl TextSource for StubSource {
    fn acquire(&self, path: &Path) -> Result<Document, AcquisitionError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match self.texts.get(&name) {
            Some(text) => Ok(Document::new(
                path,
                vec![PageText {
                    number: 1,
                    text: text.clone(),
                    ocr_used: name.starts_with("scan_"),
                }],
            )),
            None => Err(AcquisitionError::Parse("unreadable stub".to_string())),
        }
    }
}

fn touch(root: &Path, name: &str) {
    let path = root.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"%PDF-1.4").unwrap();
}

#[tokio::test]
async fn dated_invoice_lands_in_year_month_folder() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "a.pdf");
    let source = StubSource::new(&[("a.pdf", "FACTURE No.123, date 15/01/2024, total 230€")]);

    let report = Sorter::new(SortConfig::default(), source)
        .run(dir.path())
        .await
        .unwrap();

    assert_eq!(report.stats.files_found, 1);
    assert_eq!(report.stats.sorted, 1);
    assert_eq!(report.stats.errors, 0);
    assert!(dir
        .path()
        .join("2024/Facture fournisseur/01/a.pdf")
        .is_file());
    assert!(!dir.path().join("a.pdf").exists());
}

#[tokio::test]
async fn space_separated_date_files_under_year_month() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "ocr_output.pdf");
    let source = StubSource::new(&[("ocr_output.pdf", "facture du 15 01 2024")]);

    let report = Sorter::new(SortConfig::default(), source)
        .run(dir.path())
        .await
        .unwrap();

    assert_eq!(report.stats.sorted, 1);
    assert!(dir
        .path()
        .join("2024/Facture fournisseur/01/ocr_output.pdf")
        .is_file());
}

#[tokio::test]
async fn undated_document_routes_to_commande() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "b.pdf");
    let source = StubSource::new(&[("b.pdf", "bon de livraison sans la moindre date")]);

    let report = Sorter::new(SortConfig::default(), source)
        .run(dir.path())
        .await
        .unwrap();

    assert_eq!(report.stats.commande, 1);
    assert_eq!(report.stats.sorted, 0);
    assert!(dir.path().join(COMMANDE_DIR).join("b.pdf").is_file());
}

#[tokio::test]
async fn deny_phrase_overrides_a_valid_date() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "c.pdf");
    let source = StubSource::new(&[(
        "c.pdf",
        "Ceci n'est pas une facture. Bon de commande du 15/01/2024.",
    )]);

    let report = Sorter::new(SortConfig::default(), source)
        .run(dir.path())
        .await
        .unwrap();

    assert_eq!(report.stats.commande, 1);
    assert!(dir.path().join(COMMANDE_DIR).join("c.pdf").is_file());
    assert!(!dir.path().join("2024").exists());
}

#[tokio::test]
async fn unreadable_document_is_errored_and_left_in_place() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "broken.pdf");
    let source = StubSource::new(&[]);

    let report = Sorter::new(SortConfig::default(), source)
        .run(dir.path())
        .await
        .unwrap();

    assert_eq!(report.stats.errors, 1);
    assert_eq!(report.stats.unsorted, 1);
    assert!(dir.path().join("broken.pdf").is_file());
    assert_eq!(report.unsorted, vec![dir.path().join("broken.pdf")]);
    assert!(report.failures[0].1.contains("unreadable"));
}

#[tokio::test]
async fn colliding_names_both_survive() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "fournisseur-a/invoice.pdf");
    touch(dir.path(), "fournisseur-b/invoice.pdf");
    let text = "invoice dated 2024-01-15";
    let source = StubSource::new(&[("invoice.pdf", text)]);

    let report = Sorter::new(SortConfig::default(), source)
        .run(dir.path())
        .await
        .unwrap();

    assert_eq!(report.stats.sorted, 2);
    let dest = dir.path().join("2024/Facture fournisseur/01");
    let moved: Vec<_> = fs::read_dir(&dest).unwrap().filter_map(|e| e.ok()).collect();
    assert_eq!(moved.len(), 2);
}

#[tokio::test]
async fn rerun_over_sorted_tree_moves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "a.pdf");
    touch(dir.path(), "b.pdf");
    let source = StubSource::new(&[
        ("a.pdf", "facture du 15/01/2024"),
        ("b.pdf", "aucune date ici"),
    ]);

    let first = Sorter::new(SortConfig::default(), source.clone())
        .run(dir.path())
        .await
        .unwrap();
    assert_eq!(first.stats.sorted + first.stats.commande, 2);

    // Year and commande directories are excluded from rescanning.
    let second = Sorter::new(SortConfig::default(), source)
        .run(dir.path())
        .await
        .unwrap();
    assert_eq!(second.stats.files_found, 0);
    assert_eq!(second.stats.sorted, 0);
    assert_eq!(second.stats.commande, 0);
}

#[tokio::test]
async fn dry_run_reports_the_same_split_but_moves_nothing() {
    let entries = [
        ("a.pdf", "facture du 15/01/2024"),
        ("b.pdf", "rien d'utile"),
    ];

    let dry_dir = tempfile::tempdir().unwrap();
    touch(dry_dir.path(), "a.pdf");
    touch(dry_dir.path(), "b.pdf");
    fs::write(dry_dir.path().join("bad.zip"), b"not a zip").unwrap();
    let mut dry_config = SortConfig::default();
    dry_config.dry_run = true;
    let dry = Sorter::new(dry_config, StubSource::new(&entries))
        .run(dry_dir.path())
        .await
        .unwrap();

    let real_dir = tempfile::tempdir().unwrap();
    touch(real_dir.path(), "a.pdf");
    touch(real_dir.path(), "b.pdf");
    fs::write(real_dir.path().join("bad.zip"), b"not a zip").unwrap();
    let real = Sorter::new(SortConfig::default(), StubSource::new(&entries))
        .run(real_dir.path())
        .await
        .unwrap();

    assert_eq!(dry.stats.files_found, real.stats.files_found);
    assert_eq!(dry.stats.sorted, real.stats.sorted);
    assert_eq!(dry.stats.commande, real.stats.commande);
    // The unreadable archive counts as an error either way.
    assert_eq!(dry.stats.errors, real.stats.errors);
    assert_eq!(dry.stats.archives_extracted, real.stats.archives_extracted);

    // The dry tree is untouched.
    assert!(dry_dir.path().join("a.pdf").is_file());
    assert!(dry_dir.path().join("b.pdf").is_file());
    assert!(!dry_dir.path().join("2024").exists());
    assert!(!dry_dir.path().join(COMMANDE_DIR).exists());
}

#[tokio::test]
async fn year_filter_skips_other_years_and_undated() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "old.pdf");
    touch(dir.path(), "match.pdf");
    touch(dir.path(), "undated.pdf");
    let source = StubSource::new(&[
        ("old.pdf", "facture du 15/01/2022"),
        ("match.pdf", "facture du 03/06/2023"),
        ("undated.pdf", "pas de date"),
    ]);

    let mut config = SortConfig::default();
    config.year_filter = Some(2023);
    let report = Sorter::new(config, source).run(dir.path()).await.unwrap();

    assert_eq!(report.stats.sorted, 1);
    assert_eq!(report.stats.skipped, 2);
    assert!(dir
        .path()
        .join("2023/Facture fournisseur/06/match.pdf")
        .is_file());
    assert!(dir.path().join("old.pdf").is_file());
    assert!(dir.path().join("undated.pdf").is_file());
}

#[tokio::test]
async fn ocr_pages_are_counted_and_classified() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "scan_rechnung.pdf");
    let source = StubSource::new(&[("scan_rechnung.pdf", "Rechnung vom 03.11.23")]);

    let report = Sorter::new(SortConfig::default(), source)
        .run(dir.path())
        .await
        .unwrap();

    assert_eq!(report.stats.ocr_processed, 1);
    assert_eq!(report.stats.sorted, 1);
    assert!(dir
        .path()
        .join("2023/Facture fournisseur/11/scan_rechnung.pdf")
        .is_file());
}

#[tokio::test]
async fn top_level_zip_contents_are_discovered_and_sorted() {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let dir = tempfile::tempdir().unwrap();
    let zip_path = dir.path().join("export.zip");
    let file = fs::File::create(&zip_path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    writer
        .start_file("zipped.pdf", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"%PDF-1.4").unwrap();
    writer.finish().unwrap();

    let source = StubSource::new(&[("zipped.pdf", "facture du 02/02/2024")]);
    let report = Sorter::new(SortConfig::default(), source)
        .run(dir.path())
        .await
        .unwrap();

    assert_eq!(report.stats.archives_extracted, 1);
    assert_eq!(report.stats.sorted, 1);
    assert!(dir
        .path()
        .join("2024/Facture fournisseur/02/zipped.pdf")
        .is_file());
    // Default policy keeps the archive in place.
    assert!(zip_path.is_file());
}

#[tokio::test]
async fn empty_subdirectories_are_cleaned_up() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "sub/only.pdf");
    let source = StubSource::new(&[("only.pdf", "facture du 15/01/2024")]);

    let report = Sorter::new(SortConfig::default(), source)
        .run(dir.path())
        .await
        .unwrap();

    assert_eq!(report.stats.sorted, 1);
    assert!(report.stats.empty_dirs_removed >= 1);
    assert!(!dir.path().join("sub").exists());
}
