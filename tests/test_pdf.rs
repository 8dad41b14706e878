mod common;

use arxiv_digest::pdf::{extract_text, extract_text_from_bytes, extract_text_from_path};
use arxiv_digest::ExtractionError;
use common::make_pdf;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_extracts_text_layer() {
    let pdf = make_pdf(&["Introduction to transformer models", "We study attention"]);
    let text = extract_text_from_bytes(&pdf).unwrap();

    assert!(text.as_str().contains("transformer"), "unexpected text: {:?}", text);
    assert!(text.as_str().contains("attention"), "unexpected text: {:?}", text);
    assert!(!text.as_str().contains('\n'));
}

#[test]
fn test_extraction_is_idempotent() {
    let pdf = make_pdf(&["Deterministic output", "across repeated calls"]);
    let first = extract_text_from_bytes(&pdf).unwrap();
    let second = extract_text_from_bytes(&pdf).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_bibliography_is_cut() {
    let pdf = make_pdf(&["Body of the paper", "References", "Bibliography entry"]);
    let text = extract_text_from_bytes(&pdf).unwrap();

    assert!(text.as_str().contains("Body"));
    assert!(!text.as_str().contains("References"));
    assert!(!text.as_str().contains("Bibliography"));
}

#[test]
fn test_pdf_without_text_layer_yields_empty_text() {
    let pdf = make_pdf(&[]);
    let text = extract_text_from_bytes(&pdf).unwrap();
    assert!(text.is_empty(), "expected no text, got {:?}", text);
}

#[test]
fn test_corrupt_pdf_is_rejected() {
    let result = extract_text_from_bytes(b"this is not a pdf file");
    assert!(matches!(result, Err(ExtractionError::Unreadable(_))));
}

#[test]
fn test_extract_from_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("paper.pdf");
    fs::write(&path, make_pdf(&["Read from disk"])).unwrap();

    let text = extract_text_from_path(&path).unwrap();
    assert!(text.as_str().contains("disk"));

    let missing = extract_text_from_path(&dir.path().join("missing.pdf"));
    assert!(matches!(missing, Err(ExtractionError::Io { .. })));
}

#[tokio::test]
async fn test_async_extraction_matches_blocking() {
    let pdf = make_pdf(&["Same text either way"]);
    let blocking = extract_text_from_bytes(&pdf).unwrap();
    let spawned = extract_text(pdf).await.unwrap();
    assert_eq!(blocking, spawned);
}

#[tokio::test]
async fn test_async_extraction_reports_corrupt_pdf() {
    let result = extract_text(b"%PDF-1.4 truncated".to_vec()).await;
    assert!(matches!(result, Err(ExtractionError::Unreadable(_))));
}
