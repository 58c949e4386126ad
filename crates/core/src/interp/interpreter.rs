//! Page content interpreter.
//!
//! Content streams are tokenized by `lopdf::content::Content`; this module
//! owns the interpreter state and dispatches each operation to the `do_*`
//! methods in `ops/`.

use std::collections::HashMap;
use std::sync::Arc;

use lopdf::content::Content;
use lopdf::{Dictionary, Object, ObjectId};
use tracing::{trace, warn};

use crate::document::{PdfDocument, PdfPage, as_number};
use crate::font::PdfFont;
use crate::geometry::{MATRIX_IDENTITY, Matrix, Point};
use crate::interp::device::{Device, PathSegment, TextSeqItem};
use crate::interp::state::{GraphicState, TextState};

/// Saved graphics state for q/Q operators.
pub(crate) type SavedState = (Matrix, TextState, GraphicState);

/// Executes page content streams against a [`Device`].
///
/// Method names like `do_Q` or `do_B` keep the case of the PDF operators
/// they implement.
pub struct PageInterpreter<'a, D: Device> {
    pub(crate) doc: &'a PdfDocument,
    pub(crate) device: &'a mut D,
    pub(crate) gstack: Vec<SavedState>,
    pub(crate) ctm: Matrix,
    pub(crate) textstate: TextState,
    pub(crate) graphicstate: GraphicState,
    pub(crate) curpath: Vec<PathSegment>,
    /// Current point, used by the `v` operator.
    pub(crate) current_point: Option<Point>,
    /// Font resource name -> font.
    pub(crate) fontmap: HashMap<String, Arc<PdfFont>>,
    pub(crate) resources: Option<&'a Dictionary>,
    /// Form XObjects being executed, to stop recursion.
    pub(crate) xobj_stack: Vec<ObjectId>,
}

#[allow(non_snake_case)]
impl<'a, D: Device> PageInterpreter<'a, D> {
    pub fn new(doc: &'a PdfDocument, device: &'a mut D) -> Self {
        Self {
            doc,
            device,
            gstack: Vec::new(),
            ctm: MATRIX_IDENTITY,
            textstate: TextState::new(),
            graphicstate: GraphicState::new(),
            curpath: Vec::new(),
            current_point: None,
            fontmap: HashMap::new(),
            resources: None,
            xobj_stack: Vec::new(),
        }
    }

    /// Resets graphics state for a new content stream.
    pub fn init_state(&mut self, ctm: Matrix) {
        self.gstack.clear();
        self.ctm = ctm;
        self.device.set_ctm(self.ctm);
        self.textstate = TextState::new();
        self.graphicstate = GraphicState::new();
        self.curpath.clear();
        self.current_point = None;
    }

    /// Makes `resources` current and loads its fonts.
    pub fn init_resources(&mut self, resources: Option<&'a Dictionary>) {
        self.resources = resources;
        self.fontmap.clear();

        let Some(fonts) = resources.and_then(|r| self.doc.get_dict(r, b"Font")) else {
            return;
        };
        for (name, spec) in fonts.iter() {
            let Some(spec) = self.doc.resolve(spec).and_then(|o| o.as_dict().ok()) else {
                continue;
            };
            let name = String::from_utf8_lossy(name).into_owned();
            let font = PdfFont::load(self.doc, spec);
            trace!(%name, basefont = font.basefont(), "loaded font");
            self.fontmap.insert(name, Arc::new(font));
        }
    }

    pub const fn ctm(&self) -> Matrix {
        self.ctm
    }

    pub(crate) fn get_current_state(&self) -> SavedState {
        (self.ctm, self.textstate.clone(), self.graphicstate.clone())
    }

    pub(crate) fn set_current_state(&mut self, state: SavedState) {
        let (ctm, textstate, graphicstate) = state;
        self.ctm = ctm;
        self.textstate = textstate;
        self.graphicstate = graphicstate;
        self.device.set_ctm(self.ctm);
    }

    /// Interprets a page: page-space CTM, page resources, page contents.
    pub fn process_page(&mut self, page: &PdfPage<'a>) {
        self.init_resources(page.resources());
        self.init_state(page.ctm());
        self.execute(&page.contents());
    }

    /// Decodes a content stream and runs its operations.
    pub fn execute(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        let content = match Content::decode(data) {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, "skipping undecodable content stream");
                return;
            }
        };
        for op in &content.operations {
            self.dispatch_operator(&op.operator, &op.operands);
        }
    }

    fn dispatch_operator(&mut self, operator: &str, args: &[Object]) {
        match operator {
            // Graphics state
            "q" => self.do_q(),
            "Q" => self.do_Q(),
            "cm" => {
                if let Some([a, b, c, d, e, f]) = Self::numbers(args) {
                    self.do_cm(a, b, c, d, e, f);
                }
            }
            "w" => {
                if let Some([w]) = Self::numbers(args) {
                    self.do_w(w);
                }
            }
            "gs" => {
                if let Some(name) = Self::name(args) {
                    self.do_gs(&name);
                }
            }

            // Color
            "G" => {
                if let Some([g]) = Self::numbers(args) {
                    self.do_G(g);
                }
            }
            "g" => {
                if let Some([g]) = Self::numbers(args) {
                    self.do_g(g);
                }
            }
            "RG" => {
                if let Some([r, g, b]) = Self::numbers(args) {
                    self.do_RG(r, g, b);
                }
            }
            "rg" => {
                if let Some([r, g, b]) = Self::numbers(args) {
                    self.do_rg(r, g, b);
                }
            }
            "K" => {
                if let Some([c, m, y, k]) = Self::numbers(args) {
                    self.do_K(c, m, y, k);
                }
            }
            "k" => {
                if let Some([c, m, y, k]) = Self::numbers(args) {
                    self.do_k(c, m, y, k);
                }
            }
            "CS" => {
                if let Some(name) = Self::name(args) {
                    self.do_CS(&name);
                }
            }
            "cs" => {
                if let Some(name) = Self::name(args) {
                    self.do_cs(&name);
                }
            }
            "SC" | "SCN" => self.do_SC(args),
            "sc" | "scn" => self.do_sc(args),

            // Path construction
            "m" => {
                if let Some([x, y]) = Self::numbers(args) {
                    self.do_m(x, y);
                }
            }
            "l" => {
                if let Some([x, y]) = Self::numbers(args) {
                    self.do_l(x, y);
                }
            }
            "c" => {
                if let Some([x1, y1, x2, y2, x3, y3]) = Self::numbers(args) {
                    self.do_c(x1, y1, x2, y2, x3, y3);
                }
            }
            "v" => {
                if let Some([x2, y2, x3, y3]) = Self::numbers(args) {
                    self.do_v(x2, y2, x3, y3);
                }
            }
            "y" => {
                if let Some([x1, y1, x3, y3]) = Self::numbers(args) {
                    self.do_y(x1, y1, x3, y3);
                }
            }
            "h" => self.do_h(),
            "re" => {
                if let Some([x, y, w, h]) = Self::numbers(args) {
                    self.do_re(x, y, w, h);
                }
            }

            // Path painting
            "S" => self.do_S(),
            "s" => self.do_s(),
            "f" | "F" | "f*" => self.do_f(),
            "B" | "B*" => self.do_B(),
            "b" | "b*" => self.do_b(),
            "n" => self.do_n(),
            // Clipping does not change what is collected.
            "W" | "W*" => {}

            // Text
            "BT" => self.do_BT(),
            "ET" => self.do_ET(),
            "Tc" => {
                if let Some([v]) = Self::numbers(args) {
                    self.do_Tc(v);
                }
            }
            "Tw" => {
                if let Some([v]) = Self::numbers(args) {
                    self.do_Tw(v);
                }
            }
            "Tz" => {
                if let Some([v]) = Self::numbers(args) {
                    self.do_Tz(v);
                }
            }
            "TL" => {
                if let Some([v]) = Self::numbers(args) {
                    self.do_TL(v);
                }
            }
            "Tf" => {
                if let (Some(name), Some(size)) = (
                    args.first().and_then(Self::as_name),
                    args.get(1).and_then(as_number),
                ) {
                    self.do_Tf(&name, size);
                }
            }
            "Tr" => {
                if let Some([v]) = Self::numbers(args) {
                    self.do_Tr(v as i32);
                }
            }
            "Ts" => {
                if let Some([v]) = Self::numbers(args) {
                    self.do_Ts(v);
                }
            }
            "Td" => {
                if let Some([tx, ty]) = Self::numbers(args) {
                    self.do_Td(tx, ty);
                }
            }
            "TD" => {
                if let Some([tx, ty]) = Self::numbers(args) {
                    self.do_TD(tx, ty);
                }
            }
            "Tm" => {
                if let Some([a, b, c, d, e, f]) = Self::numbers(args) {
                    self.do_Tm(a, b, c, d, e, f);
                }
            }
            "T*" => self.do_T_star(),
            "Tj" => {
                if let Some(s) = Self::string(args) {
                    self.do_Tj(s);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = args.last() {
                    self.do_TJ(Self::text_seq(items));
                }
            }
            "'" => {
                if let Some(s) = Self::string(args) {
                    self.do_quote(s);
                }
            }
            "\"" => {
                if let (Some(aw), Some(ac), Some(s)) = (
                    args.first().and_then(as_number),
                    args.get(1).and_then(as_number),
                    Self::string(args),
                ) {
                    self.do_doublequote(aw, ac, s);
                }
            }

            // XObjects
            "Do" => {
                if let Some(name) = Self::name(args) {
                    self.do_Do(&name);
                }
            }

            _ => {}
        }
    }

    // Operand helpers

    /// The last `N` operands as numbers.
    fn numbers<const N: usize>(args: &[Object]) -> Option<[f64; N]> {
        if args.len() < N {
            return None;
        }
        let mut out = [0.0; N];
        for (slot, obj) in out.iter_mut().zip(&args[args.len() - N..]) {
            *slot = as_number(obj)?;
        }
        Some(out)
    }

    fn as_name(obj: &Object) -> Option<String> {
        match obj {
            Object::Name(n) => Some(String::from_utf8_lossy(n).into_owned()),
            _ => None,
        }
    }

    fn name(args: &[Object]) -> Option<String> {
        args.last().and_then(Self::as_name)
    }

    fn string(args: &[Object]) -> Option<&[u8]> {
        match args.last() {
            Some(Object::String(s, _)) => Some(s),
            _ => None,
        }
    }

    fn text_seq(items: &[Object]) -> Vec<TextSeqItem> {
        items
            .iter()
            .filter_map(|item| match item {
                Object::String(s, _) => Some(TextSeqItem::Bytes(s.clone())),
                other => as_number(other).map(TextSeqItem::Number),
            })
            .collect()
    }
}
