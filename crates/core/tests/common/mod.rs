//! Builds small PDFs for the integration tests.
//!
//! Text uses Helvetica without /Widths, so every glyph advances half an em:
//! 6pt per character at 12pt. Coordinates are PDF user space on a
//! 612x792 page (origin bottom-left).

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

pub const PAGE_HEIGHT: f64 = 792.0;

/// One page's content stream and annotations.
#[derive(Default)]
pub struct TestPage {
    content: String,
    annots: Vec<Dictionary>,
}

fn rect_object(rect: [f64; 4]) -> Object {
    Object::Array(rect.iter().map(|&v| Object::Real(v as f32)).collect())
}

fn color_object(rgb: [f64; 3]) -> Object {
    Object::Array(rgb.iter().map(|&v| Object::Real(v as f32)).collect())
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

impl TestPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows `text` at 12pt with its baseline at (x, y).
    pub fn text(mut self, x: f64, y: f64, text: &str) -> Self {
        self.content.push_str(&format!(
            "BT /F1 12 Tf {x} {y} Td ({}) Tj ET\n",
            escape(text)
        ));
        self
    }

    /// Appends raw content stream operators.
    pub fn raw(mut self, ops: &str) -> Self {
        self.content.push_str(ops);
        self.content.push('\n');
        self
    }

    /// Paints a filled rectangle.
    pub fn fill_rect(mut self, rect: [f64; 4], rgb: [f64; 3]) -> Self {
        let [x0, y0, x1, y1] = rect;
        let [r, g, b] = rgb;
        self.content.push_str(&format!(
            "q {r} {g} {b} rg {x0} {y0} {} {} re f Q\n",
            x1 - x0,
            y1 - y0
        ));
        self
    }

    /// Adds a Highlight annotation with stroke color `rgb`.
    pub fn highlight(self, rect: [f64; 4], rgb: [f64; 3], contents: &str) -> Self {
        self.markup("Highlight", rect, rgb, contents)
    }

    pub fn markup(mut self, subtype: &str, rect: [f64; 4], rgb: [f64; 3], contents: &str) -> Self {
        let mut annot = dictionary! {
            "Type" => "Annot",
            "Subtype" => Object::Name(subtype.as_bytes().to_vec()),
            "Rect" => rect_object(rect),
            "C" => color_object(rgb),
        };
        if !contents.is_empty() {
            annot.set("Contents", Object::string_literal(contents));
        }
        self.annots.push(annot);
        self
    }

    /// Adds a Highlight annotation covering several quads, each given as
    /// [x0, y0, x1, y1].
    pub fn highlight_quads(mut self, quads: &[[f64; 4]], rgb: [f64; 3], contents: &str) -> Self {
        let points: Vec<Object> = quads
            .iter()
            .flat_map(|&[x0, y0, x1, y1]| [x0, y1, x1, y1, x0, y0, x1, y0])
            .map(|v| Object::Real(v as f32))
            .collect();
        let x0 = quads.iter().map(|q| q[0]).fold(f64::INFINITY, f64::min);
        let y0 = quads.iter().map(|q| q[1]).fold(f64::INFINITY, f64::min);
        let x1 = quads.iter().map(|q| q[2]).fold(f64::NEG_INFINITY, f64::max);
        let y1 = quads.iter().map(|q| q[3]).fold(f64::NEG_INFINITY, f64::max);
        self = self.highlight([x0, y0, x1, y1], rgb, contents);
        if let Some(annot) = self.annots.last_mut() {
            annot.set("QuadPoints", points);
        }
        self
    }

    /// Adds a sticky note with a subject line.
    pub fn note(mut self, rect: [f64; 4], subject: &str, contents: &str) -> Self {
        self.annots.push(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Text",
            "Rect" => rect_object(rect),
            "Subj" => Object::string_literal(subject),
            "Contents" => Object::string_literal(contents),
        });
        self
    }
}

/// Assembles pages into a PDF.
#[derive(Default)]
pub struct PdfBuilder {
    pages: Vec<TestPage>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: TestPage) -> Self {
        self.pages.push(page);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id: ObjectId = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let mut kids = Vec::new();
        for page in self.pages {
            let content_id = doc.add_object(Stream::new(
                Dictionary::new(),
                page.content.into_bytes(),
            ));
            let annots: Vec<Object> = page
                .annots
                .into_iter()
                .map(|annot| doc.add_object(annot).into())
                .collect();
            let mut page_dict = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! {
                        "F1" => font_id,
                    },
                },
            };
            if !annots.is_empty() {
                page_dict.set("Annots", annots);
            }
            kids.push(doc.add_object(page_dict).into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("failed to save test PDF");
        buf
    }

    /// Writes the PDF to `dir/name` and returns its path.
    pub fn write(self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.build()).expect("failed to write test PDF");
        path
    }
}
