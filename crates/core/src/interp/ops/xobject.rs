//! XObject operator.
//!
//! Handles: Do
//!
//! Form XObjects are executed in place with their own matrix and resources.
//! Image XObjects carry no text or vector geometry and are skipped.

use std::collections::HashMap;
use std::sync::Arc;

use lopdf::{Dictionary, Object};
use tracing::{debug, trace};

use crate::font::PdfFont;
use crate::geometry::{MATRIX_IDENTITY, Matrix, Point, mult_matrix};
use crate::interp::device::{Device, PathSegment};
use crate::interp::interpreter::{PageInterpreter, SavedState};

/// Saved interpreter state around a form XObject.
pub(crate) struct InterpreterState<'a> {
    gstack: Vec<SavedState>,
    state: SavedState,
    curpath: Vec<PathSegment>,
    current_point: Option<Point>,
    fontmap: HashMap<String, Arc<PdfFont>>,
    resources: Option<&'a Dictionary>,
}

#[allow(non_snake_case)]
impl<'a, D: Device> PageInterpreter<'a, D> {
    /// Do - Paint a named XObject.
    ///
    /// PDF operator: `Do`
    pub fn do_Do(&mut self, xobjid: &str) {
        let doc = self.doc;
        let Some(obj) = self
            .resources
            .and_then(|r| doc.get_dict(r, b"XObject"))
            .and_then(|xobjects| xobjects.get(xobjid.as_bytes()).ok())
        else {
            trace!(xobjid, "XObject not found");
            return;
        };
        let Some(Object::Stream(xobj)) = doc.resolve(obj) else {
            return;
        };
        let is_form = doc
            .get(&xobj.dict, b"Subtype")
            .and_then(|o| o.as_name().ok())
            .is_some_and(|s| s == b"Form");
        if !is_form {
            return;
        }

        let id = match obj {
            Object::Reference(id) => Some(*id),
            _ => None,
        };
        if let Some(id) = id {
            if self.xobj_stack.contains(&id) {
                debug!(xobjid, "skipping recursive form XObject");
                return;
            }
        }

        let matrix = Self::parse_matrix(doc.get_numbers(&xobj.dict, b"Matrix"));
        let resources = match doc.get(&xobj.dict, b"Resources") {
            Some(Object::Dictionary(d)) => Some(d),
            _ => self.resources,
        };
        let Some(data) = doc.stream_bytes(obj) else {
            return;
        };

        let saved = self.snapshot_state();
        if let Some(id) = id {
            self.xobj_stack.push(id);
        }

        // The form inherits the caller's graphics state.
        self.init_resources(resources);
        self.ctm = mult_matrix(matrix, self.ctm);
        self.device.set_ctm(self.ctm);
        self.execute(&data);

        if id.is_some() {
            self.xobj_stack.pop();
        }
        self.restore_state(saved);
    }

    pub(crate) fn snapshot_state(&mut self) -> InterpreterState<'a> {
        InterpreterState {
            gstack: std::mem::take(&mut self.gstack),
            state: self.get_current_state(),
            curpath: std::mem::take(&mut self.curpath),
            current_point: self.current_point,
            fontmap: std::mem::take(&mut self.fontmap),
            resources: self.resources,
        }
    }

    pub(crate) fn restore_state(&mut self, saved: InterpreterState<'a>) {
        self.gstack = saved.gstack;
        self.set_current_state(saved.state);
        self.curpath = saved.curpath;
        self.current_point = saved.current_point;
        self.fontmap = saved.fontmap;
        self.resources = saved.resources;
    }

    /// A /Matrix entry, identity when absent or malformed.
    pub(crate) fn parse_matrix(values: Option<Vec<f64>>) -> Matrix {
        match values.as_deref() {
            Some(&[a, b, c, d, e, f]) => (a, b, c, d, e, f),
            _ => MATRIX_IDENTITY,
        }
    }
}
