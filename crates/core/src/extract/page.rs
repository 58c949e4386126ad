//! Per-page inputs shared by the extractors.

use tracing::debug;

use crate::annotation::Annotation;
use crate::document::PdfPage;
use crate::geometry::Rect;
use crate::interp::{PageCollector, PageInterpreter, PaintedShape};
use crate::params::ExtractParams;
use crate::text::PageText;

/// Everything the extractors read from one page, in page space.
#[derive(Debug, Clone)]
pub struct PageContent {
    /// 0-based page index.
    pub index: usize,
    pub width: f64,
    pub height: f64,
    pub text: PageText,
    /// Painted paths, in paint order.
    pub shapes: Vec<PaintedShape>,
    /// Annotations in /Annots order.
    pub annotations: Vec<Annotation>,
}

impl PageContent {
    /// Interprets the page's content streams and reads its annotations.
    pub fn load(page: &PdfPage<'_>, params: &ExtractParams) -> Self {
        let mut collector = PageCollector::new();
        {
            let mut interpreter = PageInterpreter::new(page.document(), &mut collector);
            interpreter.process_page(page);
        }
        let shapes = std::mem::take(&mut collector.shapes);
        let text = PageText::from_glyphs(std::mem::take(&mut collector.glyphs), params);
        let annotations = page.annotations();
        let (width, height) = page.size();
        debug!(
            page = page.number(),
            lines = text.lines().len(),
            shapes = shapes.len(),
            annotations = annotations.len(),
            "loaded page"
        );
        Self {
            index: page.index,
            width,
            height,
            text,
            shapes,
            annotations,
        }
    }

    /// 1-based page number.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}
