//! Page annotations.
//!
//! Annotation geometry is converted to page space on load, so every `Rect`
//! here shares the coordinate system of extracted glyphs.

use std::fmt;

use lopdf::{Dictionary, Object};
use tracing::debug;

use crate::color::Rgb;
use crate::document::{PdfDocument, PdfPage};
use crate::font::decode_text;
use crate::geometry::{Rect, reading_order};

/// Annotation subtype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationKind {
    Highlight,
    Underline,
    StrikeOut,
    Squiggly,
    Text,
    FreeText,
    Square,
    Circle,
    Ink,
    Other(String),
}

impl AnnotationKind {
    fn from_name(name: &[u8]) -> Self {
        match name {
            b"Highlight" => Self::Highlight,
            b"Underline" => Self::Underline,
            b"StrikeOut" => Self::StrikeOut,
            b"Squiggly" => Self::Squiggly,
            b"Text" => Self::Text,
            b"FreeText" => Self::FreeText,
            b"Square" => Self::Square,
            b"Circle" => Self::Circle,
            b"Ink" => Self::Ink,
            other => Self::Other(String::from_utf8_lossy(other).into_owned()),
        }
    }

    /// Text markup annotations mark a run of page text through quads.
    pub fn is_text_markup(&self) -> bool {
        matches!(
            self,
            Self::Highlight | Self::Underline | Self::StrikeOut | Self::Squiggly
        )
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Highlight => "Highlight",
            Self::Underline => "Underline",
            Self::StrikeOut => "StrikeOut",
            Self::Squiggly => "Squiggly",
            Self::Text => "Text",
            Self::FreeText => "FreeText",
            Self::Square => "Square",
            Self::Circle => "Circle",
            Self::Ink => "Ink",
            Self::Other(name) => name,
        };
        f.write_str(name)
    }
}

/// One annotation on a page.
#[derive(Debug, Clone)]
pub struct Annotation {
    /// 0-based index of the page carrying the annotation.
    pub page: usize,
    pub kind: AnnotationKind,
    /// Bounding rectangle.
    pub rect: Rect,
    /// Bounding boxes of the QuadPoints, in reading order.
    pub quads: Vec<Rect>,
    /// /Contents, the note text typed by the reviewer.
    pub contents: String,
    /// /Subj.
    pub subject: String,
    /// /T.
    pub author: String,
    /// /C.
    pub stroke: Option<Rgb>,
    /// /IC.
    pub fill: Option<Rgb>,
}

impl Annotation {
    /// The annotation's color: interior color when set, otherwise /C.
    pub fn color(&self) -> Option<Rgb> {
        self.fill.or(self.stroke)
    }

    /// Rectangles covering the marked area: the quads, or the bounding
    /// rectangle when there are none.
    pub fn regions(&self) -> Vec<Rect> {
        if self.quads.is_empty() {
            vec![self.rect]
        } else {
            self.quads.clone()
        }
    }
}

impl<'a> PdfPage<'a> {
    /// Reads the page's annotations in /Annots order. Popups, links and form
    /// widgets are skipped.
    pub fn annotations(&self) -> Vec<Annotation> {
        let doc = self.document();
        let Some(annots) = doc.get_array(self.dict(), b"Annots") else {
            return Vec::new();
        };

        let mut result = Vec::with_capacity(annots.len());
        for obj in annots {
            let Some(dict) = doc.resolve(obj).and_then(|o| o.as_dict().ok()) else {
                continue;
            };
            let Some(subtype) = doc.get(dict, b"Subtype").and_then(|o| o.as_name().ok()) else {
                continue;
            };
            if matches!(subtype, b"Popup" | b"Link" | b"Widget") {
                continue;
            }
            let kind = AnnotationKind::from_name(subtype);

            let rect = match doc.get_numbers(dict, b"Rect").as_deref() {
                Some([x0, y0, x1, y1]) => self.to_page_space(Rect::new(*x0, *y0, *x1, *y1)),
                _ => {
                    debug!(page = self.number(), %kind, "annotation without Rect");
                    continue;
                }
            };

            let mut quads: Vec<Rect> = doc
                .get_numbers(dict, b"QuadPoints")
                .unwrap_or_default()
                .chunks_exact(8)
                .filter_map(|q| {
                    Rect::bound_of(
                        q.chunks_exact(2)
                            .map(|p| self.point_to_page_space((p[0], p[1]))),
                    )
                })
                .collect();
            quads.sort_by(reading_order);

            result.push(Annotation {
                page: self.index,
                kind,
                rect,
                quads,
                contents: text_entry(doc, dict, b"Contents"),
                subject: text_entry(doc, dict, b"Subj"),
                author: text_entry(doc, dict, b"T"),
                stroke: color_entry(doc, dict, b"C"),
                fill: color_entry(doc, dict, b"IC"),
            });
        }

        debug!(page = self.number(), count = result.len(), "read annotations");
        result
    }
}

fn text_entry(doc: &PdfDocument, dict: &Dictionary, key: &[u8]) -> String {
    match doc.get(dict, key) {
        Some(Object::String(bytes, _)) => decode_text(bytes),
        _ => String::new(),
    }
}

fn color_entry(doc: &PdfDocument, dict: &Dictionary, key: &[u8]) -> Option<Rgb> {
    doc.get_numbers(dict, key)
        .and_then(|c| Rgb::from_components(&c))
}
