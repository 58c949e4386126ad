//! Path operators.
//!
//! Handles: m, l, c, v, y, h, re, S, s, f, F, f*, B, B*, b, b*, n
//!
//! Segments accumulate in `curpath` until a painting operator hands the
//! path to the device. Clipping (W, W*) is ignored by the dispatcher.

use crate::geometry::Point;
use crate::interp::device::{Device, PaintMode, PathSegment};
use crate::interp::interpreter::PageInterpreter;

#[allow(non_snake_case)]
impl<'a, D: Device> PageInterpreter<'a, D> {
    /// Appends a segment that ends at `end`.
    fn extend_path(&mut self, segment: PathSegment, end: Point) {
        self.curpath.push(segment);
        self.current_point = Some(end);
    }

    /// m - Begin a subpath.
    pub fn do_m(&mut self, x: f64, y: f64) {
        self.extend_path(PathSegment::MoveTo(x, y), (x, y));
    }

    /// l - Straight line to (x, y).
    pub fn do_l(&mut self, x: f64, y: f64) {
        self.extend_path(PathSegment::LineTo(x, y), (x, y));
    }

    /// c - Bezier curve with two control points.
    pub fn do_c(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.extend_path(PathSegment::CurveTo(x1, y1, x2, y2, x3, y3), (x3, y3));
    }

    /// v - Bezier curve; the current point is the first control point.
    pub fn do_v(&mut self, x2: f64, y2: f64, x3: f64, y3: f64) {
        let (x1, y1) = self.current_point.unwrap_or_default();
        self.do_c(x1, y1, x2, y2, x3, y3);
    }

    /// y - Bezier curve; the end point is the second control point.
    pub fn do_y(&mut self, x1: f64, y1: f64, x3: f64, y3: f64) {
        self.do_c(x1, y1, x3, y3, x3, y3);
    }

    /// h - Close the subpath.
    pub fn do_h(&mut self) {
        self.curpath.push(PathSegment::ClosePath);
    }

    /// re - Rectangle as a closed subpath.
    pub fn do_re(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.do_m(x, y);
        self.do_l(x + w, y);
        self.do_l(x + w, y + h);
        self.do_l(x, y + h);
        self.do_h();
        self.current_point = Some((x, y));
    }

    /// Paints the current path, then discards it.
    fn paint(&mut self, mode: PaintMode) {
        self.device
            .paint_path(&self.graphicstate, mode, &self.curpath);
        self.do_n();
    }

    /// S - Stroke.
    pub fn do_S(&mut self) {
        self.paint(PaintMode::Stroke);
    }

    /// s - Close and stroke.
    pub fn do_s(&mut self) {
        self.do_h();
        self.paint(PaintMode::Stroke);
    }

    /// f, F, f* - Fill.
    pub fn do_f(&mut self) {
        self.paint(PaintMode::Fill);
    }

    /// B, B* - Fill and stroke.
    pub fn do_B(&mut self) {
        self.paint(PaintMode::FillStroke);
    }

    /// b, b* - Close, fill and stroke.
    pub fn do_b(&mut self) {
        self.do_h();
        self.paint(PaintMode::FillStroke);
    }

    /// n - End the path without painting.
    pub fn do_n(&mut self) {
        self.curpath.clear();
        self.current_point = None;
    }
}
