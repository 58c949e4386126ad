mod common;

use annotext_core::{CommentRecord, Error, ExtractParams, PdfDocument, extract_comments};
use common::{PdfBuilder, TestPage};
use pretty_assertions::assert_eq;

fn comments(pdf: Vec<u8>) -> Vec<CommentRecord> {
    let doc = PdfDocument::from_bytes("test.pdf", &pdf).unwrap();
    extract_comments(&doc, &ExtractParams::default()).unwrap()
}

#[test]
fn test_highlight_comment_with_reference() {
    let pdf = PdfBuilder::new()
        .page(
            TestPage::new()
                .text(72.0, 700.0, "Hello world")
                .highlight([70.0, 696.0, 140.0, 712.0], [1.0, 1.0, 0.0], "Approved"),
        )
        .build();
    assert_eq!(
        comments(pdf),
        vec![CommentRecord {
            page: 1,
            reference: "Hello world".to_string(),
            text: "Approved".to_string(),
        }]
    );
}

#[test]
fn test_reference_only_covers_marked_words() {
    let pdf = PdfBuilder::new()
        .page(
            TestPage::new()
                .text(72.0, 700.0, "Hello world")
                .highlight([70.0, 696.0, 103.0, 712.0], [1.0, 1.0, 0.0], "greeting"),
        )
        .build();
    assert_eq!(comments(pdf)[0].reference, "Hello");
}

#[test]
fn test_annotation_without_comment_is_skipped() {
    let pdf = PdfBuilder::new()
        .page(
            TestPage::new()
                .text(72.0, 700.0, "Hello world")
                .highlight([70.0, 696.0, 140.0, 712.0], [1.0, 1.0, 0.0], ""),
        )
        .build();
    assert!(comments(pdf).is_empty());
}

#[test]
fn test_links_are_not_comments() {
    let pdf = PdfBuilder::new()
        .page(
            TestPage::new()
                .text(72.0, 700.0, "See section 2")
                .markup("Link", [70.0, 696.0, 150.0, 712.0], [0.0, 0.0, 1.0], "section 2"),
        )
        .build();
    assert!(comments(pdf).is_empty());
}

#[test]
fn test_note_and_page_order() {
    let pdf = PdfBuilder::new()
        .page(TestPage::new().text(72.0, 700.0, "No comments here"))
        .page(
            TestPage::new()
                .text(72.0, 700.0, "Second page")
                .note([300.0, 700.0, 320.0, 720.0], "Note", "Check this")
                .markup("Underline", [70.0, 696.0, 110.0, 712.0], [1.0, 0.0, 0.0], "typo?"),
        )
        .build();
    assert_eq!(
        comments(pdf),
        vec![
            CommentRecord {
                page: 2,
                reference: "Note".to_string(),
                text: "Check this".to_string(),
            },
            CommentRecord {
                page: 2,
                reference: "Second".to_string(),
                text: "typo?".to_string(),
            },
        ]
    );
}

#[test]
fn test_document_without_annotations() {
    let pdf = PdfBuilder::new()
        .page(TestPage::new().text(72.0, 700.0, "Plain"))
        .build();
    assert!(comments(pdf).is_empty());
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = PdfDocument::open(dir.path().join("missing.pdf")).unwrap_err();
    assert!(matches!(err, Error::FileNotFound(_)));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_not_a_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.pdf");
    std::fs::write(&path, b"just some text").unwrap();
    let err = PdfDocument::open(&path).unwrap_err();
    assert!(matches!(err, Error::UnreadableDocument { .. }));
    assert_eq!(err.exit_code(), 4);
}

#[test]
fn test_open_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = PdfBuilder::new()
        .page(
            TestPage::new()
                .text(72.0, 700.0, "Hello world")
                .highlight([70.0, 696.0, 140.0, 712.0], [1.0, 1.0, 0.0], "Approved"),
        )
        .write(dir.path(), "review.pdf");
    let doc = PdfDocument::open(&path).unwrap();
    assert_eq!(doc.page_count(), 1);
    let records = extract_comments(&doc, &ExtractParams::default()).unwrap();
    assert_eq!(records.len(), 1);
}
