//! Graphics state operators.
//!
//! Handles: q, Q, cm, w, gs
//!
//! Only the state that affects collected geometry is tracked: the CTM, line
//! width (stroked highlights are as tall as their pen) and colors.

use crate::document::as_number;
use crate::geometry::mult_matrix;
use crate::interp::device::Device;
use crate::interp::interpreter::PageInterpreter;

#[allow(non_snake_case)]
impl<'a, D: Device> PageInterpreter<'a, D> {
    /// Saves the current graphics state to the stack.
    ///
    /// PDF operator: `q`
    pub fn do_q(&mut self) {
        self.gstack.push(self.get_current_state());
    }

    /// Restores the graphics state from the stack.
    ///
    /// PDF operator: `Q`
    pub fn do_Q(&mut self) {
        if let Some(state) = self.gstack.pop() {
            self.set_current_state(state);
        }
    }

    /// Concatenates a matrix to the current transformation matrix.
    ///
    /// PDF operator: `cm`
    pub fn do_cm(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
        self.ctm = mult_matrix((a, b, c, d, e, f), self.ctm);
        self.device.set_ctm(self.ctm);
    }

    /// Sets the line width, scaled to page space.
    ///
    /// PDF operator: `w`
    pub fn do_w(&mut self, linewidth: f64) {
        let scale = self.ctm.0.hypot(self.ctm.1);
        self.graphicstate.linewidth = linewidth * scale;
    }

    /// Applies an ExtGState resource. Only `/LW` is honoured.
    ///
    /// PDF operator: `gs`
    pub fn do_gs(&mut self, name: &str) {
        let doc = self.doc;
        let linewidth = self
            .resources
            .and_then(|r| doc.get_dict(r, b"ExtGState"))
            .and_then(|states| doc.get_dict(states, name.as_bytes()))
            .and_then(|state| doc.get(state, b"LW"))
            .and_then(as_number);
        if let Some(lw) = linewidth {
            self.do_w(lw);
        }
    }
}
