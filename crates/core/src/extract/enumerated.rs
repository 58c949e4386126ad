//! Enumerated comments marked with a highlight color.
//!
//! Reviewers number their comments (`1. ...`, `2. ...`) and highlight them
//! yellow or light blue. A comment block runs from a numbered line to the
//! line before the next numbered one.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::color::{ColorLabel, ENUMERATED_TARGETS, is_color, validate_threshold};
use crate::document::PdfDocument;
use crate::error::{Error, Result};
use crate::geometry::{Rect, union_all};
use crate::params::ExtractParams;
use crate::text::TextLine;

use super::page::PageContent;
use super::{HighlightShape, ShapeSource};

static ENUMERATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\.\s*(.*)$").expect("enumeration pattern is valid"));

pub const DEFAULT_THRESHOLD: f64 = 0.35;

/// Which colors count and how close a shape must be to them.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumeratedOptions {
    colors: Vec<ColorLabel>,
    yellow_threshold: f64,
    light_blue_threshold: f64,
}

impl Default for EnumeratedOptions {
    fn default() -> Self {
        Self {
            colors: ENUMERATED_TARGETS.to_vec(),
            yellow_threshold: DEFAULT_THRESHOLD,
            light_blue_threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl EnumeratedOptions {
    /// `colors` must be a subset of yellow and light-blue; empty means both.
    pub fn new(
        colors: Vec<ColorLabel>,
        yellow_threshold: f64,
        light_blue_threshold: f64,
    ) -> Result<Self> {
        if let Some(bad) = colors.iter().find(|c| !ENUMERATED_TARGETS.contains(c)) {
            return Err(Error::InvalidArgument(format!(
                "color {bad} is not supported here (expected yellow or light-blue)"
            )));
        }
        let colors = if colors.is_empty() {
            ENUMERATED_TARGETS.to_vec()
        } else {
            colors
        };
        Ok(Self {
            colors,
            yellow_threshold: validate_threshold("yellow threshold", yellow_threshold)?,
            light_blue_threshold: validate_threshold("light-blue threshold", light_blue_threshold)?,
        })
    }

    pub fn colors(&self) -> &[ColorLabel] {
        &self.colors
    }

    fn threshold(&self, label: ColorLabel) -> f64 {
        match label {
            ColorLabel::LightBlue => self.light_blue_threshold,
            _ => self.yellow_threshold,
        }
    }

    /// Requested labels the color is close enough to, sorted by name.
    pub fn labels_for(&self, shape: &HighlightShape) -> Vec<ColorLabel> {
        let mut labels: Vec<ColorLabel> = self
            .colors
            .iter()
            .copied()
            .filter(|&label| is_color(shape.color, label, self.threshold(label)))
            .collect();
        labels.sort_by_key(|l| l.as_str());
        labels
    }
}

/// A numbered comment and the lines it spans.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentBlock {
    /// 0-based page index.
    pub page: usize,
    pub ordinal: u32,
    /// Text after the `N.` prefix, lines joined with a space.
    pub text: String,
    /// Bounding boxes of the block's lines.
    pub lines: Vec<Rect>,
}

impl CommentBlock {
    pub fn bbox(&self) -> Option<Rect> {
        union_all(&self.lines)
    }

    fn touches(&self, rect: &Rect) -> bool {
        self.lines.iter().any(|line| line.intersects(rect))
    }

    fn push_line(&mut self, text: &str, bbox: Rect) {
        if !text.is_empty() {
            if !self.text.is_empty() {
                self.text.push(' ');
            }
            self.text.push_str(text);
        }
        self.lines.push(bbox);
    }
}

/// Splits a page's lines into numbered blocks. Lines before the first
/// numbered line belong to no block.
pub fn comment_blocks(page: usize, lines: &[TextLine]) -> Vec<CommentBlock> {
    let mut blocks: Vec<CommentBlock> = Vec::new();
    for line in lines {
        let text = line.text().trim();
        let start = ENUMERATION.captures(text).and_then(|caps| {
            let ordinal = caps[1].parse::<u32>().ok()?;
            Some((ordinal, caps[2].trim().to_string()))
        });
        match start {
            Some((ordinal, rest)) => {
                let mut block = CommentBlock {
                    page,
                    ordinal,
                    text: String::new(),
                    lines: Vec::new(),
                };
                block.push_line(&rest, line.bbox());
                blocks.push(block);
            }
            None => {
                if let Some(block) = blocks.last_mut() {
                    block.push_line(text, line.bbox());
                }
            }
        }
    }
    blocks
}

/// One highlighted comment, or highlighted text outside any comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumeratedRecord {
    /// 1-based page number.
    pub page: usize,
    /// Comment number; `None` for highlights outside any numbered block.
    #[serde(skip)]
    pub comment: Option<u32>,
    pub colors: Vec<ColorLabel>,
    pub text: String,
}

/// Highlight shapes for the enumerated extractor: colored annotations by
/// their /Rect, or, on pages without annotations, filled drawings.
pub fn enumerated_shapes(content: &PageContent) -> Vec<HighlightShape> {
    if content.annotations.is_empty() {
        content
            .shapes
            .iter()
            .filter(|shape| shape.filled)
            .map(|shape| {
                HighlightShape::new(content.index, shape.rect, shape.color, ShapeSource::Drawing)
            })
            .collect()
    } else {
        content
            .annotations
            .iter()
            .filter_map(|annot| {
                let color = annot.color()?;
                Some(HighlightShape::new(
                    content.index,
                    annot.rect,
                    color,
                    ShapeSource::Annotation,
                ))
            })
            .collect()
    }
}

/// Records for one page, before deduplication.
pub fn enumerate_page(content: &PageContent, options: &EnumeratedOptions) -> Vec<EnumeratedRecord> {
    let shapes = enumerated_shapes(content);
    let blocks = comment_blocks(content.index, content.text.lines());
    let labelled: Vec<(&HighlightShape, Vec<ColorLabel>)> = shapes
        .iter()
        .map(|shape| (shape, options.labels_for(shape)))
        .filter(|(_, labels)| !labels.is_empty())
        .collect();

    let mut records = Vec::new();
    for block in &blocks {
        let mut colors: Vec<ColorLabel> = labelled
            .iter()
            .filter(|(shape, _)| block.touches(&shape.rect))
            .flat_map(|(_, labels)| labels.iter().copied())
            .collect();
        colors.sort_by_key(|l| l.as_str());
        colors.dedup();
        if colors.is_empty() || block.text.is_empty() {
            continue;
        }
        records.push(EnumeratedRecord {
            page: content.number(),
            comment: Some(block.ordinal),
            colors,
            text: block.text.clone(),
        });
    }

    for (shape, labels) in &labelled {
        if blocks.iter().any(|block| block.touches(&shape.rect)) {
            continue;
        }
        for line in content.text.clip(&shape.rect) {
            if line.is_empty() {
                continue;
            }
            records.push(EnumeratedRecord {
                page: content.number(),
                comment: None,
                colors: labels.clone(),
                text: line,
            });
        }
    }
    records
}

/// Highlighted enumerated comments across the document. Records with the
/// same page, comment number and text are reported once.
pub fn extract_enumerated(
    doc: &PdfDocument,
    options: &EnumeratedOptions,
    params: &ExtractParams,
) -> Result<Vec<EnumeratedRecord>> {
    let mut seen: HashSet<(usize, Option<u32>, String)> = HashSet::new();
    let mut records = Vec::new();
    for page in doc.pages() {
        let page = page?;
        let content = PageContent::load(&page, params);
        let found = enumerate_page(&content, options);
        debug!(page = content.number(), records = found.len(), "enumerated page");
        for record in found {
            if seen.insert((record.page, record.comment, record.text.clone())) {
                records.push(record);
            }
        }
    }
    Ok(records)
}
