mod common;

use doc_ingest_core::pdf_text::{ExtractionError, PdfTextExtractor, PAGE_SEPARATOR};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_extract_joins_pages_in_order() {
    let tmp = tempdir().unwrap();
    let pdf = tmp.path().join("handbook.pdf");
    common::write_pdf(&pdf, &["Page one", "Page two", "Page three"]);

    let artifact = PdfTextExtractor::new()
        .extract(&pdf)
        .expect("extraction should succeed");

    assert_eq!(artifact, tmp.path().join("handbook.txt"));
    let text = fs::read_to_string(&artifact).unwrap();
    let segments: Vec<&str> = text.split(PAGE_SEPARATOR).collect();
    assert_eq!(segments, vec!["Page one", "Page two", "Page three"]);
}

#[test]
fn test_extract_skips_pages_without_text() {
    let tmp = tempdir().unwrap();
    let pdf = tmp.path().join("sparse.pdf");
    common::write_pdf(&pdf, &["Intro", "", "Outro"]);

    let artifact = PdfTextExtractor::new().extract(&pdf).unwrap();
    assert_eq!(fs::read_to_string(artifact).unwrap(), "Intro\n\nOutro");
}

#[test]
fn test_extract_all_empty_pages_fails_without_artifact() {
    let tmp = tempdir().unwrap();
    let pdf = tmp.path().join("blank.pdf");
    common::write_pdf(&pdf, &["", ""]);

    let err = PdfTextExtractor::new().extract(&pdf).unwrap_err();
    assert!(
        matches!(err, ExtractionError::NoExtractableText(ref p) if p == &pdf),
        "got {err:?}"
    );
    assert!(!tmp.path().join("blank.txt").exists());
}

#[test]
fn test_extract_corrupt_pdf_fails_without_artifact() {
    let tmp = tempdir().unwrap();
    let pdf = tmp.path().join("broken.pdf");
    common::write_corrupt_pdf(&pdf);

    let err = PdfTextExtractor::new().extract(&pdf).unwrap_err();
    assert!(matches!(err, ExtractionError::CorruptPdf { .. }), "got {err:?}");
    assert!(!tmp.path().join("broken.txt").exists());
}

#[test]
fn test_extract_missing_file_is_not_found() {
    let tmp = tempdir().unwrap();
    let pdf = tmp.path().join("ghost.pdf");

    let err = PdfTextExtractor::new().extract(&pdf).unwrap_err();
    assert!(matches!(err, ExtractionError::NotFound(_)), "got {err:?}");
}

#[test]
fn test_extract_rejects_non_pdf_extension() {
    let tmp = tempdir().unwrap();
    let doc = tmp.path().join("letter.docx");
    fs::write(&doc, b"PK\x03\x04").unwrap();

    let err = PdfTextExtractor::new().extract(&doc).unwrap_err();
    assert!(matches!(err, ExtractionError::NotAPdf(_)), "got {err:?}");
}

#[test]
fn test_extract_accepts_uppercase_extension() {
    let tmp = tempdir().unwrap();
    let pdf = tmp.path().join("SCAN.PDF");
    common::write_pdf(&pdf, &["Only page"]);

    let artifact = PdfTextExtractor::new().extract(&pdf).unwrap();
    assert_eq!(artifact, tmp.path().join("SCAN.txt"));
    assert_eq!(fs::read_to_string(artifact).unwrap(), "Only page");
}

#[test]
fn test_extract_persist_failure_when_artifact_path_is_directory() {
    let tmp = tempdir().unwrap();
    let pdf = tmp.path().join("ledger.pdf");
    common::write_pdf(&pdf, &["Balance sheet"]);
    let before = fs::read(&pdf).unwrap();
    fs::create_dir(tmp.path().join("ledger.txt")).unwrap();

    let err = PdfTextExtractor::new().extract(&pdf).unwrap_err();

    match err {
        ExtractionError::PersistFailure { path, .. } => {
            assert_eq!(path, tmp.path().join("ledger.txt"));
        }
        other => panic!("expected PersistFailure, got {other:?}"),
    }
    assert_eq!(fs::read(&pdf).unwrap(), before, "PDF is untouched");
    assert!(tmp.path().join("ledger.txt").is_dir());
}
