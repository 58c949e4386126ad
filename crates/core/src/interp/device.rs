//! Output devices for the page interpreter.
//!
//! The interpreter reports painted paths and shown strings to a [`Device`].
//! Text layout (advancing the pen, computing glyph boxes) is a provided
//! method of the trait, so devices only decide what to keep.

use crate::color::Rgb;
use crate::font::PdfFont;
use crate::geometry::{
    MATRIX_IDENTITY, Matrix, Rect, apply_matrix_pt, apply_matrix_rect, mult_matrix,
    translate_matrix,
};
use crate::interp::state::{GraphicState, TextState};
use crate::text::Glyph;

/// Element of a `TJ` array.
#[derive(Debug, Clone, PartialEq)]
pub enum TextSeqItem {
    /// Adjustment in thousandths of text space.
    Number(f64),
    Bytes(Vec<u8>),
}

/// Path segment in user space.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    /// Cubic bezier (x1, y1, x2, y2, x3, y3).
    CurveTo(f64, f64, f64, f64, f64, f64),
    ClosePath,
}

impl PathSegment {
    fn points(&self) -> Vec<(f64, f64)> {
        match *self {
            Self::MoveTo(x, y) | Self::LineTo(x, y) => vec![(x, y)],
            Self::CurveTo(x1, y1, x2, y2, x3, y3) => vec![(x1, y1), (x2, y2), (x3, y3)],
            Self::ClosePath => Vec::new(),
        }
    }
}

/// How a path is painted. The fill rule does not change a path's bounds, so
/// even-odd and nonzero fills are not told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintMode {
    Stroke,
    Fill,
    FillStroke,
}

impl PaintMode {
    pub const fn fills(self) -> bool {
        matches!(self, Self::Fill | Self::FillStroke)
    }
}

/// Receives painting operations from the interpreter.
pub trait Device {
    fn set_ctm(&mut self, ctm: Matrix);

    fn ctm(&self) -> Matrix;

    /// Paints the current path.
    fn paint_path(&mut self, _graphicstate: &GraphicState, _mode: PaintMode, _path: &[PathSegment]) {
    }

    /// Receives one glyph in page space.
    fn receive_glyph(&mut self, _glyph: Glyph, _graphicstate: &GraphicState) {}

    /// Lays out a shown string and reports each glyph. Updates the text
    /// position in `textstate`.
    fn render_string(
        &mut self,
        textstate: &mut TextState,
        seq: &[TextSeqItem],
        graphicstate: &GraphicState,
    ) {
        let matrix = mult_matrix(textstate.matrix, self.ctm());
        let font = textstate.font.clone().unwrap_or_default();
        let fontsize = textstate.fontsize;
        let scaling = textstate.scaling * 0.01;
        let charspace = textstate.charspace * scaling;
        let wordspace = textstate.wordspace * scaling;
        let dxscale = 0.001 * fontsize * scaling;

        let (mut x, y) = textstate.linematrix;
        let mut needcharspace = false;
        for item in seq {
            match item {
                TextSeqItem::Number(n) => {
                    x -= n * dxscale;
                    needcharspace = true;
                }
                TextSeqItem::Bytes(data) => {
                    for cid in font.decode(data) {
                        if needcharspace {
                            x += charspace;
                        }
                        let char_matrix = translate_matrix(matrix, (x, y));
                        x += self.render_char(
                            char_matrix,
                            &font,
                            fontsize,
                            scaling,
                            textstate.rise,
                            cid,
                            graphicstate,
                        );
                        if cid == 32 && wordspace != 0.0 && !font.is_multibyte() {
                            x += wordspace;
                        }
                        needcharspace = true;
                    }
                }
            }
        }
        textstate.linematrix = (x, y);
    }

    /// Places one character and returns its advance in text space.
    #[allow(clippy::too_many_arguments)]
    fn render_char(
        &mut self,
        matrix: Matrix,
        font: &PdfFont,
        fontsize: f64,
        scaling: f64,
        rise: f64,
        cid: u32,
        graphicstate: &GraphicState,
    ) -> f64 {
        let adv = font.char_width(cid) * fontsize * scaling;
        let descent = font.descent() * fontsize;
        let bbox = apply_matrix_rect(
            matrix,
            Rect::new(0.0, descent + rise, adv, descent + rise + fontsize),
        );
        let size = {
            let (x0, y0) = apply_matrix_pt(matrix, (0.0, 0.0));
            let (x1, y1) = apply_matrix_pt(matrix, (0.0, fontsize));
            (x1 - x0).hypot(y1 - y0)
        };
        let text = font.to_unichr(cid);
        if !text.is_empty() {
            self.receive_glyph(Glyph::new(text, bbox, size), graphicstate);
        }
        adv
    }
}

/// A painted path reduced to its bounding box and paint color.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintedShape {
    /// Bounding box in page space.
    pub rect: Rect,
    /// Fill color for filled paths, stroke color otherwise.
    pub color: Rgb,
    pub filled: bool,
}

/// Collects glyphs and colored shapes of one page.
#[derive(Debug)]
pub struct PageCollector {
    ctm: Matrix,
    pub glyphs: Vec<Glyph>,
    pub shapes: Vec<PaintedShape>,
}

impl PageCollector {
    pub fn new() -> Self {
        Self {
            ctm: MATRIX_IDENTITY,
            glyphs: Vec::new(),
            shapes: Vec::new(),
        }
    }
}

impl Default for PageCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for PageCollector {
    fn set_ctm(&mut self, ctm: Matrix) {
        self.ctm = ctm;
    }

    fn ctm(&self) -> Matrix {
        self.ctm
    }

    fn paint_path(&mut self, graphicstate: &GraphicState, mode: PaintMode, path: &[PathSegment]) {
        let filled = mode.fills();
        let paint = if filled {
            &graphicstate.ncolor
        } else {
            &graphicstate.scolor
        };
        let Some(color) = paint.to_rgb() else {
            return;
        };
        let ctm = self.ctm;
        let Some(mut rect) = Rect::bound_of(
            path.iter()
                .flat_map(PathSegment::points)
                .map(|pt| apply_matrix_pt(ctm, pt)),
        ) else {
            return;
        };
        if !filled {
            rect = rect.expand(graphicstate.linewidth / 2.0);
        }
        self.shapes.push(PaintedShape {
            rect,
            color,
            filled,
        });
    }

    fn receive_glyph(&mut self, glyph: Glyph, _graphicstate: &GraphicState) {
        self.glyphs.push(glyph);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::state::Color;

    #[test]
    fn test_render_string_advances_pen() {
        let mut dev = PageCollector::new();
        let mut ts = TextState::new();
        ts.fontsize = 10.0;
        ts.matrix = (1.0, 0.0, 0.0, 1.0, 100.0, 200.0);
        let gs = GraphicState::new();

        dev.render_string(&mut ts, &[TextSeqItem::Bytes(b"Hi".to_vec())], &gs);

        assert_eq!(dev.glyphs.len(), 2);
        assert_eq!(dev.glyphs[0].text, "H");
        // Default advance is half an em.
        assert_eq!(ts.linematrix, (10.0, 0.0));
        let first = dev.glyphs[0].bbox;
        assert_eq!(first.x0, 100.0);
        assert_eq!(first.x1, 105.0);
        assert_eq!(first.y0, 198.0);
        assert_eq!(first.y1, 208.0);
        assert_eq!(dev.glyphs[1].bbox.x0, 105.0);
    }

    #[test]
    fn test_tj_adjustment_moves_left() {
        let mut dev = PageCollector::new();
        let mut ts = TextState::new();
        ts.fontsize = 10.0;
        let gs = GraphicState::new();
        let seq = [
            TextSeqItem::Bytes(b"A".to_vec()),
            TextSeqItem::Number(-500.0),
            TextSeqItem::Bytes(b"B".to_vec()),
        ];
        dev.render_string(&mut ts, &seq, &gs);
        assert_eq!(dev.glyphs[1].bbox.x0, 10.0);
    }

    #[test]
    fn test_fill_records_shape_with_fill_color() {
        let mut dev = PageCollector::new();
        let mut gs = GraphicState::new();
        gs.ncolor = Color::Rgb(1.0, 1.0, 0.0);
        let path = [
            PathSegment::MoveTo(10.0, 10.0),
            PathSegment::LineTo(60.0, 10.0),
            PathSegment::LineTo(60.0, 22.0),
            PathSegment::LineTo(10.0, 22.0),
            PathSegment::ClosePath,
        ];
        dev.paint_path(&gs, PaintMode::Fill, &path);
        assert_eq!(dev.shapes.len(), 1);
        assert_eq!(dev.shapes[0].rect, Rect::new(10.0, 10.0, 60.0, 22.0));
        assert_eq!(dev.shapes[0].color, Rgb::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_stroke_expands_by_line_width() {
        let mut dev = PageCollector::new();
        let mut gs = GraphicState::new();
        gs.scolor = Color::Rgb(0.0, 1.0, 0.0);
        gs.linewidth = 12.0;
        let path = [PathSegment::MoveTo(0.0, 50.0), PathSegment::LineTo(100.0, 50.0)];
        dev.paint_path(&gs, PaintMode::Stroke, &path);
        assert_eq!(dev.shapes[0].rect, Rect::new(-6.0, 44.0, 106.0, 56.0));
        assert!(!dev.shapes[0].filled);
    }

    #[test]
    fn test_pattern_fill_is_ignored() {
        let mut dev = PageCollector::new();
        let mut gs = GraphicState::new();
        gs.ncolor = Color::Unknown;
        dev.paint_path(&gs, PaintMode::Fill, &[PathSegment::MoveTo(0.0, 0.0)]);
        assert!(dev.shapes.is_empty());
    }
}
