mod common;

use annotext_core::color::ColorLabel;
use annotext_core::{
    EnumeratedOptions, EnumeratedRecord, ExtractParams, PdfDocument, extract_enumerated,
};
use common::{PdfBuilder, TestPage};
use pretty_assertions::assert_eq;

const YELLOW: [f64; 3] = [1.0, 1.0, 0.0];
const LIGHT_BLUE: [f64; 3] = [0.6, 0.8, 1.0];

fn enumerated(pdf: Vec<u8>, options: &EnumeratedOptions) -> Vec<EnumeratedRecord> {
    let doc = PdfDocument::from_bytes("test.pdf", &pdf).unwrap();
    extract_enumerated(&doc, options, &ExtractParams::default()).unwrap()
}

#[test]
fn test_light_blue_drawn_highlight() {
    let pdf = PdfBuilder::new()
        .page(
            TestPage::new()
                .fill_rect([70.0, 696.0, 160.0, 712.0], LIGHT_BLUE)
                .text(72.0, 700.0, "1. First item"),
        )
        .build();
    assert_eq!(
        enumerated(pdf, &EnumeratedOptions::default()),
        vec![EnumeratedRecord {
            page: 1,
            comment: Some(1),
            colors: vec![ColorLabel::LightBlue],
            text: "First item".to_string(),
        }]
    );
}

#[test]
fn test_links_do_not_hide_drawn_highlights() {
    let pdf = PdfBuilder::new()
        .page(
            TestPage::new()
                .fill_rect([70.0, 696.0, 160.0, 712.0], YELLOW)
                .text(72.0, 700.0, "1. First item")
                .markup("Link", [300.0, 100.0, 350.0, 112.0], [1.0, 0.0, 0.0], ""),
        )
        .build();
    assert_eq!(
        enumerated(pdf, &EnumeratedOptions::default()),
        vec![EnumeratedRecord {
            page: 1,
            comment: Some(1),
            colors: vec![ColorLabel::Yellow],
            text: "First item".to_string(),
        }]
    );
}

#[test]
fn test_block_spans_continuation_lines() {
    let pdf = PdfBuilder::new()
        .page(
            TestPage::new()
                .fill_rect([70.0, 680.0, 200.0, 712.0], YELLOW)
                .text(72.0, 700.0, "2. Rework the intro")
                .text(72.0, 684.0, "and the summary")
                .text(72.0, 600.0, "3. Not highlighted"),
        )
        .build();
    let records = enumerated(pdf, &EnumeratedOptions::default());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].comment, Some(2));
    assert_eq!(records[0].text, "Rework the intro and the summary");
    assert_eq!(records[0].colors, vec![ColorLabel::Yellow]);
}

#[test]
fn test_annotation_colors_replace_drawings() {
    let pdf = PdfBuilder::new()
        .page(
            TestPage::new()
                .fill_rect([70.0, 596.0, 200.0, 612.0], LIGHT_BLUE)
                .text(72.0, 700.0, "1. Annotated")
                .text(72.0, 600.0, "2. Painted")
                .highlight([70.0, 696.0, 160.0, 712.0], YELLOW, ""),
        )
        .build();
    let records = enumerated(pdf, &EnumeratedOptions::default());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].text, "Annotated");
    assert_eq!(records[0].colors, vec![ColorLabel::Yellow]);
}

#[test]
fn test_zero_threshold_accepts_exact_yellow() {
    let pdf = PdfBuilder::new()
        .page(
            TestPage::new()
                .text(72.0, 700.0, "1. Exact")
                .text(72.0, 600.0, "2. Close")
                .highlight([70.0, 696.0, 160.0, 712.0], YELLOW, "")
                .highlight([70.0, 596.0, 160.0, 612.0], [1.0, 1.0, 0.2], ""),
        )
        .build();
    let options = EnumeratedOptions::new(vec![ColorLabel::Yellow], 0.0, 0.0).unwrap();
    let records = enumerated(pdf, &options);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].text, "Exact");
}

#[test]
fn test_highlight_outside_numbered_blocks() {
    let pdf = PdfBuilder::new()
        .page(
            TestPage::new()
                .text(72.0, 700.0, "Loose remark")
                .highlight([70.0, 696.0, 160.0, 712.0], YELLOW, ""),
        )
        .build();
    let records = enumerated(pdf, &EnumeratedOptions::default());
    assert_eq!(
        records,
        vec![EnumeratedRecord {
            page: 1,
            comment: None,
            colors: vec![ColorLabel::Yellow],
            text: "Loose remark".to_string(),
        }]
    );
}

#[test]
fn test_duplicate_records_are_reported_once() {
    let pdf = PdfBuilder::new()
        .page(
            TestPage::new()
                .text(72.0, 700.0, "Loose remark")
                .highlight([70.0, 696.0, 160.0, 712.0], YELLOW, "")
                .highlight([70.0, 696.0, 160.0, 712.0], YELLOW, "again"),
        )
        .build();
    assert_eq!(enumerated(pdf, &EnumeratedOptions::default()).len(), 1);
}

#[test]
fn test_blocks_do_not_carry_across_pages() {
    let pdf = PdfBuilder::new()
        .page(TestPage::new().text(72.0, 700.0, "1. Start"))
        .page(
            TestPage::new()
                .fill_rect([70.0, 696.0, 200.0, 712.0], YELLOW)
                .text(72.0, 700.0, "continued text"),
        )
        .build();
    let records = enumerated(pdf, &EnumeratedOptions::default());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].page, 2);
    assert_eq!(records[0].comment, None);
    assert_eq!(records[0].text, "continued text");
}
