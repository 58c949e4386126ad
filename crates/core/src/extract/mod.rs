//! The three extraction pipelines.
//!
//! - `comments`: reviewer notes and the text they mark up
//! - `enumerated`: highlighted `N.` comment blocks
//! - `highlights`: highlighted passages with a classified color
//!
//! All of them work on [`PageContent`], built once per page by running the
//! content-stream interpreter.

pub mod comments;
pub mod enumerated;
pub mod highlights;
pub mod page;

pub use comments::{CommentRecord, comments_on_page, extract_comments};
pub use enumerated::{CommentBlock, EnumeratedOptions, EnumeratedRecord, extract_enumerated};
pub use highlights::{HighlightRecord, Region, extract_highlights, merge_regions};
pub use page::PageContent;

use crate::color::Rgb;
use crate::geometry::Rect;

/// Where a highlight shape came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeSource {
    /// A highlight annotation.
    Annotation,
    /// A filled path in the page content.
    Drawing,
}

/// A colored area that may mark text.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightShape {
    /// 0-based page index.
    pub page: usize,
    /// Bounding box of `parts`.
    pub rect: Rect,
    /// Marked areas: the quads of an annotation, or the single rect.
    pub parts: Vec<Rect>,
    pub color: Rgb,
    pub source: ShapeSource,
}

impl HighlightShape {
    pub fn new(page: usize, rect: Rect, color: Rgb, source: ShapeSource) -> Self {
        Self {
            page,
            rect,
            parts: vec![rect],
            color,
            source,
        }
    }

    /// A shape made of several rects, bounded by their union.
    pub fn with_parts(page: usize, parts: Vec<Rect>, color: Rgb, source: ShapeSource) -> Option<Self> {
        let rect = crate::geometry::union_all(&parts)?;
        Some(Self {
            page,
            rect,
            parts,
            color,
            source,
        })
    }
}
