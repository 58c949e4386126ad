//! Text operators.
//!
//! Handles: BT, ET, Tc, Tw, Tz, TL, Tf, Tr, Ts, Td, TD, Tm, T*, Tj, TJ, ', "
//!
//! Showing operators hand the string to the device, which lays out the
//! glyphs and advances the position stored in the text state.

use crate::interp::device::{Device, TextSeqItem};
use crate::interp::interpreter::PageInterpreter;

#[allow(non_snake_case)]
impl<'a, D: Device> PageInterpreter<'a, D> {
    /// BT - Begin text object.
    pub fn do_BT(&mut self) {
        self.textstate.reset();
    }

    /// ET - End text object. Text state persists.
    pub const fn do_ET(&mut self) {}

    /// Tc - Set character spacing.
    pub const fn do_Tc(&mut self, charspace: f64) {
        self.textstate.charspace = charspace;
    }

    /// Tw - Set word spacing.
    pub const fn do_Tw(&mut self, wordspace: f64) {
        self.textstate.wordspace = wordspace;
    }

    /// Tz - Set horizontal scaling, in percent.
    pub const fn do_Tz(&mut self, scaling: f64) {
        self.textstate.scaling = scaling;
    }

    /// TL - Set leading. Stored negated.
    pub fn do_TL(&mut self, leading: f64) {
        self.textstate.leading = -leading;
    }

    /// Tf - Set font and size. An unknown font name falls back to default
    /// metrics.
    pub fn do_Tf(&mut self, fontid: &str, fontsize: f64) {
        self.textstate.font = self.fontmap.get(fontid).cloned();
        if self.textstate.font.is_none() {
            tracing::debug!(fontid, "font resource not found");
        }
        self.textstate.fontsize = fontsize;
    }

    /// Tr - Set rendering mode. Invisible text (mode 3) is still collected.
    pub const fn do_Tr(&mut self, render: i32) {
        self.textstate.render = render;
    }

    /// Ts - Set rise.
    pub const fn do_Ts(&mut self, rise: f64) {
        self.textstate.rise = rise;
    }

    /// Td - Move to the start of the next line, offset by (tx, ty).
    pub fn do_Td(&mut self, tx: f64, ty: f64) {
        let (a, b, c, d, e, f) = self.textstate.matrix;
        let e_new = tx.mul_add(a, ty * c) + e;
        let f_new = tx.mul_add(b, ty * d) + f;
        self.textstate.matrix = (a, b, c, d, e_new, f_new);
        self.textstate.linematrix = (0.0, 0.0);
    }

    /// TD - Like Td, and sets the leading to -ty.
    pub fn do_TD(&mut self, tx: f64, ty: f64) {
        self.do_Td(tx, ty);
        self.textstate.leading = ty;
    }

    /// Tm - Set the text matrix.
    pub const fn do_Tm(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
        self.textstate.matrix = (a, b, c, d, e, f);
        self.textstate.linematrix = (0.0, 0.0);
    }

    /// T* - Move to the next line using the current leading.
    pub fn do_T_star(&mut self) {
        let leading = self.textstate.leading;
        self.do_Td(0.0, leading);
    }

    /// TJ - Show strings with individual glyph positioning.
    pub fn do_TJ(&mut self, seq: Vec<TextSeqItem>) {
        self.device
            .render_string(&mut self.textstate, &seq, &self.graphicstate);
    }

    /// Tj - Show a string.
    pub fn do_Tj(&mut self, s: &[u8]) {
        self.do_TJ(vec![TextSeqItem::Bytes(s.to_vec())]);
    }

    /// ' - Move to the next line and show a string.
    pub fn do_quote(&mut self, s: &[u8]) {
        self.do_T_star();
        self.do_Tj(s);
    }

    /// " - Set word and character spacing, then behave like '.
    pub fn do_doublequote(&mut self, aw: f64, ac: f64, s: &[u8]) {
        self.do_Tw(aw);
        self.do_Tc(ac);
        self.do_quote(s);
    }
}
