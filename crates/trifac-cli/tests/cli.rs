//! Smoke tests for the trifac binary.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_the_main_flags() {
    Command::cargo_bin("trifac")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--root"))
        .stdout(predicate::str::contains("--jobs"));
}

#[test]
fn empty_directory_reports_zero_files() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("trifac")
        .unwrap()
        .args(["--root"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 0 file(s)"));
}

#[test]
fn missing_root_fails() {
    Command::cargo_bin("trifac")
        .unwrap()
        .args(["--root", "/definitely/not/here"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a directory"));
}

#[test]
fn dry_run_leaves_the_tree_alone() {
    let dir = tempfile::tempdir().unwrap();
    // Not a real PDF: the run records it as an error but must not move it.
    fs::write(dir.path().join("junk.pdf"), b"not a pdf").unwrap();

    Command::cargo_bin("trifac")
        .unwrap()
        .arg("--dry-run")
        .arg("--root")
        .arg(dir.path())
        .assert()
        .success();

    assert!(dir.path().join("junk.pdf").is_file());
}

#[test]
fn fail_on_error_propagates_document_failures() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("junk.pdf"), b"not a pdf").unwrap();

    Command::cargo_bin("trifac")
        .unwrap()
        .arg("--fail-on-error")
        .arg("--root")
        .arg(dir.path())
        .assert()
        .failure();
}
