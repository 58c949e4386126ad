//! Highlighted passages with a classified color.
//!
//! Shapes come from Highlight annotations, or, on pages that have none,
//! from filled drawings that look like a marker stroke. Each shape is given
//! a color label, neighbouring shapes with the same label are merged, and
//! the text under each merged region becomes one record.

use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, trace};

use crate::annotation::AnnotationKind;
use crate::color::{ColorClassifier, ColorLabel};
use crate::document::PdfDocument;
use crate::error::Result;
use crate::geometry::{Rect, is_adjacent_or_overlapping, reading_order};
use crate::interp::PaintedShape;
use crate::params::ExtractParams;

use super::page::PageContent;
use super::{HighlightShape, ShapeSource};

/// A highlighted passage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightRecord {
    /// 1-based page number.
    pub page: usize,
    pub colors: Vec<ColorLabel>,
    pub text: String,
}

/// Same-label shapes merged into one highlighted area.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// 0-based page index.
    pub page: usize,
    pub label: ColorLabel,
    pub parts: Vec<Rect>,
    pub bbox: Rect,
}

impl Region {
    pub fn from_shape(shape: &HighlightShape, label: ColorLabel) -> Self {
        Self {
            page: shape.page,
            label,
            parts: shape.parts.clone(),
            bbox: shape.rect,
        }
    }

    fn can_merge(&self, other: &Region, tolerance: f64) -> bool {
        self.page == other.page
            && self.label == other.label
            && is_adjacent_or_overlapping(&self.bbox, &other.bbox, tolerance)
    }

    fn absorb(&mut self, other: Region) {
        self.bbox = self.bbox.union(&other.bbox);
        self.parts.extend(other.parts);
    }
}

/// True for a filled drawing shaped and colored like a marker stroke.
pub fn looks_like_highlight(shape: &PaintedShape, page: &Rect, params: &ExtractParams) -> bool {
    let rect = &shape.rect;
    shape.filled
        && rect.height() > 0.0
        && rect.width() >= rect.height()
        && rect.height() <= params.max_highlight_height
        && shape.color.chroma() >= params.min_chroma
        && rect.area() < page.area() / 2.0
}

/// Candidate shapes of one page.
pub fn highlight_shapes(content: &PageContent, params: &ExtractParams) -> Vec<HighlightShape> {
    let annotated: Vec<HighlightShape> = content
        .annotations
        .iter()
        .filter(|annot| annot.kind == AnnotationKind::Highlight)
        .filter_map(|annot| {
            let color = annot.stroke.or(annot.fill)?;
            HighlightShape::with_parts(
                content.index,
                annot.regions(),
                color,
                ShapeSource::Annotation,
            )
        })
        .collect();
    if !annotated.is_empty() {
        return annotated;
    }

    let page = content.bounds();
    content
        .shapes
        .iter()
        .filter(|shape| looks_like_highlight(shape, &page, params))
        .map(|shape| HighlightShape::new(content.index, shape.rect, shape.color, ShapeSource::Drawing))
        .collect()
}

/// Labels each shape, dropping the ones the classifier rejects.
pub fn classify_shapes(shapes: &[HighlightShape], classifier: &dyn ColorClassifier) -> Vec<Region> {
    shapes
        .iter()
        .filter_map(|shape| {
            let label = classifier.classify(shape.color);
            trace!(page = shape.page, rect = ?shape.rect, color = ?shape.color, ?label, "classified shape");
            Some(Region::from_shape(shape, label?))
        })
        .collect()
}

/// Merges same-page, same-label regions whose bounding boxes are adjacent
/// or overlapping, until no two regions can be merged.
pub fn merge_regions(regions: Vec<Region>, tolerance: f64) -> Vec<Region> {
    let mut groups = regions;
    loop {
        let before = groups.len();
        let mut merged: Vec<Region> = Vec::with_capacity(before);
        for region in groups {
            match merged.iter_mut().find(|g| g.can_merge(&region, tolerance)) {
                Some(group) => group.absorb(region),
                None => merged.push(region),
            }
        }
        groups = merged;
        if groups.len() == before {
            return groups;
        }
    }
}

/// Records for one page's merged regions, in reading order.
pub fn region_records(content: &PageContent, regions: &[Region]) -> Vec<HighlightRecord> {
    regions
        .iter()
        .sorted_by(|a, b| reading_order(&a.bbox, &b.bbox))
        .filter_map(|region| {
            let text = content.text.clip_many(&region.parts).join(" ");
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            Some(HighlightRecord {
                page: content.number(),
                colors: vec![region.label.normalized()],
                text: text.to_string(),
            })
        })
        .collect()
}

/// Highlighted passages across the document, in page then reading order.
pub fn extract_highlights(
    doc: &PdfDocument,
    classifier: &dyn ColorClassifier,
    params: &ExtractParams,
) -> Result<Vec<HighlightRecord>> {
    let mut records = Vec::new();
    for page in doc.pages() {
        let page = page?;
        let content = PageContent::load(&page, params);
        let shapes = highlight_shapes(&content, params);
        let regions = merge_regions(classify_shapes(&shapes, classifier), params.merge_tolerance);
        let found = region_records(&content, &regions);
        debug!(
            page = content.number(),
            shapes = shapes.len(),
            regions = regions.len(),
            records = found.len(),
            "extracted highlights"
        );
        records.extend(found);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Annotation;
    use crate::color::{NearestClassifier, Rgb, THRESHOLD_PALETTE, ThresholdClassifier};
    use crate::text::{Glyph, PageText};
    use pretty_assertions::assert_eq;

    const YELLOW: Rgb = Rgb::new(1.0, 1.0, 0.0);

    fn page_text(words: &[(&str, f64, f64)]) -> PageText {
        let glyphs = words
            .iter()
            .flat_map(|(word, x, y)| {
                word.chars().enumerate().map(move |(i, c)| {
                    let x0 = x + i as f64 * 6.0;
                    Glyph::new(c.to_string(), Rect::new(x0, *y, x0 + 6.0, y + 10.0), 10.0)
                })
            })
            .collect();
        PageText::from_glyphs(glyphs, &ExtractParams::default())
    }

    fn content(text: PageText, shapes: Vec<PaintedShape>) -> PageContent {
        PageContent {
            index: 0,
            width: 612.0,
            height: 792.0,
            text,
            shapes,
            annotations: Vec::new(),
        }
    }

    fn fill(rect: Rect, color: Rgb) -> PaintedShape {
        PaintedShape {
            rect,
            color,
            filled: true,
        }
    }

    fn region(label: ColorLabel, rect: Rect) -> Region {
        Region {
            page: 0,
            label,
            parts: vec![rect],
            bbox: rect,
        }
    }

    #[test]
    fn test_drawing_heuristic() {
        let params = ExtractParams::default();
        let page = Rect::new(0.0, 0.0, 612.0, 792.0);
        let marker = fill(Rect::new(10.0, 10.0, 200.0, 22.0), YELLOW);
        assert!(looks_like_highlight(&marker, &page, &params));

        let gray = fill(marker.rect, Rgb::new(0.8, 0.8, 0.8));
        assert!(!looks_like_highlight(&gray, &page, &params));

        let tall = fill(Rect::new(10.0, 10.0, 200.0, 100.0), YELLOW);
        assert!(!looks_like_highlight(&tall, &page, &params));

        let column = fill(Rect::new(10.0, 10.0, 20.0, 30.0), YELLOW);
        assert!(!looks_like_highlight(&column, &page, &params));

        let background = fill(Rect::new(0.0, 0.0, 612.0, 792.0), YELLOW);
        assert!(!looks_like_highlight(&background, &page, &params));
    }

    #[test]
    fn test_merge_adjacent_same_label() {
        let regions = vec![
            region(ColorLabel::Yellow, Rect::new(10.0, 10.0, 100.0, 22.0)),
            region(ColorLabel::Yellow, Rect::new(10.0, 23.0, 60.0, 35.0)),
            region(ColorLabel::Green, Rect::new(10.0, 36.0, 60.0, 48.0)),
            region(ColorLabel::Yellow, Rect::new(10.0, 200.0, 60.0, 212.0)),
        ];
        let merged = merge_regions(regions, 2.0);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].bbox, Rect::new(10.0, 10.0, 100.0, 35.0));
        assert_eq!(merged[0].parts.len(), 2);
    }

    #[test]
    fn test_merge_reaches_fixpoint() {
        // The second region only reaches the first once the third has joined it.
        let regions = vec![
            region(ColorLabel::Yellow, Rect::new(0.0, 0.0, 10.0, 10.0)),
            region(ColorLabel::Yellow, Rect::new(50.0, 20.0, 60.0, 30.0)),
            region(ColorLabel::Yellow, Rect::new(0.0, 11.0, 60.0, 19.0)),
        ];
        let merged = merge_regions(regions, 2.0);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].bbox, Rect::new(0.0, 0.0, 60.0, 30.0));

        let again = merge_regions(merged.clone(), 2.0);
        assert_eq!(again, merged);
    }

    #[test]
    fn test_merge_keeps_pages_apart() {
        let mut other_page = region(ColorLabel::Yellow, Rect::new(0.0, 0.0, 10.0, 10.0));
        other_page.page = 1;
        let regions = vec![
            region(ColorLabel::Yellow, Rect::new(0.0, 0.0, 10.0, 10.0)),
            other_page,
        ];
        assert_eq!(merge_regions(regions, 2.0).len(), 2);
    }

    #[test]
    fn test_drawn_highlight_record() {
        let text = page_text(&[("Approved", 10.0, 100.0), ("later", 10.0, 300.0)]);
        let page = content(text, vec![fill(Rect::new(8.0, 98.0, 60.0, 112.0), YELLOW)]);
        let params = ExtractParams::default();
        let shapes = highlight_shapes(&page, &params);
        let classifier = ThresholdClassifier::new(THRESHOLD_PALETTE.to_vec(), 0.35).unwrap();
        let regions = merge_regions(classify_shapes(&shapes, &classifier), 2.0);
        assert_eq!(
            region_records(&page, &regions),
            vec![HighlightRecord {
                page: 1,
                colors: vec![ColorLabel::Yellow],
                text: "Approved".to_string(),
            }]
        );
    }

    #[test]
    fn test_multiline_highlight_joins_with_space() {
        let text = page_text(&[("first", 10.0, 100.0), ("second", 10.0, 112.0)]);
        let page = content(
            text,
            vec![
                fill(Rect::new(8.0, 99.0, 60.0, 111.0), YELLOW),
                fill(Rect::new(8.0, 111.0, 60.0, 123.0), YELLOW),
            ],
        );
        let params = ExtractParams::default();
        let shapes = highlight_shapes(&page, &params);
        let regions = merge_regions(classify_shapes(&shapes, &NearestClassifier::default()), 2.0);
        let records = region_records(&page, &regions);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "first second");
    }

    #[test]
    fn test_light_blue_reported_as_blue() {
        let text = page_text(&[("sky", 10.0, 100.0)]);
        let page = content(
            text,
            vec![fill(Rect::new(8.0, 98.0, 40.0, 112.0), Rgb::new(0.6, 0.8, 1.0))],
        );
        let params = ExtractParams::default();
        let shapes = highlight_shapes(&page, &params);
        let regions = classify_shapes(&shapes, &NearestClassifier::default());
        assert_eq!(regions[0].label, ColorLabel::LightBlue);
        assert_eq!(region_records(&page, &regions)[0].colors, vec![ColorLabel::Blue]);
    }

    #[test]
    fn test_annotations_take_precedence_over_drawings() {
        let text = page_text(&[("marked", 10.0, 100.0), ("painted", 10.0, 300.0)]);
        let mut page = content(text, vec![fill(Rect::new(8.0, 298.0, 60.0, 312.0), YELLOW)]);
        page.annotations.push(Annotation {
            page: 0,
            kind: AnnotationKind::Highlight,
            rect: Rect::new(8.0, 98.0, 60.0, 112.0),
            quads: Vec::new(),
            contents: String::new(),
            subject: String::new(),
            author: String::new(),
            stroke: Some(Rgb::new(0.0, 1.0, 0.0)),
            fill: None,
        });
        let shapes = highlight_shapes(&page, &ExtractParams::default());
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].source, ShapeSource::Annotation);

        let regions = classify_shapes(&shapes, &NearestClassifier::default());
        let records = region_records(&page, &regions);
        assert_eq!(records[0].colors, vec![ColorLabel::Green]);
        assert_eq!(records[0].text, "marked");
    }

    #[test]
    fn test_blank_region_is_dropped() {
        let page = content(
            page_text(&[("text", 10.0, 100.0)]),
            vec![fill(Rect::new(300.0, 500.0, 400.0, 512.0), YELLOW)],
        );
        let shapes = highlight_shapes(&page, &ExtractParams::default());
        let regions = classify_shapes(&shapes, &NearestClassifier::default());
        assert!(region_records(&page, &regions).is_empty());
    }
}
