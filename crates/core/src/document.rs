//! PDF document access.
//!
//! `PdfDocument` owns the parsed `lopdf::Document`; `PdfPage` is a borrowed
//! view of one page with its inherited attributes resolved. Everything that
//! touches lopdf's object graph directly lives here, in `annotation`, `font`
//! and in the interpreter.

use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Object, ObjectId};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geometry::{Matrix, Point, Rect, apply_matrix_pt, apply_matrix_rect, mult_matrix};

/// Letter size, used when a page has no usable MediaBox.
const DEFAULT_MEDIABOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Maximum length of a reference chain followed by [`PdfDocument::resolve`].
const MAX_REF_DEPTH: usize = 32;

/// A parsed PDF file.
pub struct PdfDocument {
    path: PathBuf,
    inner: lopdf::Document,
    page_ids: Vec<ObjectId>,
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("path", &self.path)
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}

impl PdfDocument {
    /// Opens a PDF file.
    ///
    /// Fails with [`Error::FileNotFound`] when the path does not exist and
    /// with [`Error::UnreadableDocument`] when it is not a loadable PDF.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let data = std::fs::read(path).map_err(|e| Error::unreadable(path, e))?;
        Self::from_bytes(path, &data)
    }

    /// Parses a PDF held in memory. `path` is only used in error messages.
    pub fn from_bytes(path: impl Into<PathBuf>, data: &[u8]) -> Result<Self> {
        let path = path.into();
        if !has_pdf_header(data) {
            return Err(Error::unreadable(path, "missing %PDF- header"));
        }

        let inner = lopdf::Document::load_mem(data).map_err(|e| Error::unreadable(&path, e))?;
        let page_ids: Vec<ObjectId> = inner.get_pages().into_values().collect();
        debug!(path = %path.display(), pages = page_ids.len(), "opened document");

        Ok(Self {
            path,
            inner,
            page_ids,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Returns the page at a 0-based index.
    pub fn page(&self, index: usize) -> Result<PdfPage<'_>> {
        let id = *self.page_ids.get(index).ok_or_else(|| {
            Error::unreadable(&self.path, format!("page {} does not exist", index + 1))
        })?;
        PdfPage::new(self, index, id)
    }

    /// Iterates pages in document order.
    pub fn pages(&self) -> impl Iterator<Item = Result<PdfPage<'_>>> + '_ {
        (0..self.page_ids.len()).map(move |i| self.page(i))
    }

    /// Follows indirect references until a direct object is reached.
    pub(crate) fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        let mut current = obj;
        for _ in 0..MAX_REF_DEPTH {
            match current {
                Object::Reference(id) => current = self.inner.get_object(*id).ok()?,
                other => return Some(other),
            }
        }
        warn!("reference chain too deep");
        None
    }

    /// Looks up `key` in `dict` and resolves the value.
    pub(crate) fn get<'a>(&'a self, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
        dict.get(key).ok().and_then(|o| self.resolve(o))
    }

    pub(crate) fn get_dict<'a>(&'a self, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Dictionary> {
        match self.get(dict, key)? {
            Object::Dictionary(d) => Some(d),
            Object::Stream(s) => Some(&s.dict),
            _ => None,
        }
    }

    pub(crate) fn get_array<'a>(&'a self, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Vec<Object>> {
        match self.get(dict, key)? {
            Object::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Reads an array of numbers, resolving each element.
    pub(crate) fn get_numbers(&self, dict: &Dictionary, key: &[u8]) -> Option<Vec<f64>> {
        let arr = self.get_array(dict, key)?;
        Some(
            arr.iter()
                .filter_map(|o| self.resolve(o).and_then(as_number))
                .collect(),
        )
    }

    /// Decoded bytes of a stream object, decompressing when a filter is set.
    pub(crate) fn stream_bytes(&self, obj: &Object) -> Option<Vec<u8>> {
        let stream = match self.resolve(obj)? {
            Object::Stream(s) => s,
            _ => return None,
        };
        if stream.dict.get(b"Filter").is_ok() {
            match stream.decompressed_content() {
                Ok(data) => Some(data),
                Err(e) => {
                    warn!(error = %e, "failed to decompress stream");
                    None
                }
            }
        } else {
            Some(stream.content.clone())
        }
    }
}

fn has_pdf_header(data: &[u8]) -> bool {
    let window = &data[..data.len().min(1024)];
    window.windows(5).any(|w| w == b"%PDF-")
}

/// Converts a numeric PDF object to f64.
pub(crate) fn as_number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// A single page of a [`PdfDocument`].
#[derive(Debug, Clone)]
pub struct PdfPage<'a> {
    doc: &'a PdfDocument,
    id: ObjectId,
    dict: &'a Dictionary,
    /// 0-based page index.
    pub index: usize,
    /// MediaBox in PDF user space.
    pub mediabox: Rect,
    /// Page rotation in degrees, normalized to 0, 90, 180 or 270.
    pub rotate: i64,
}

impl<'a> PdfPage<'a> {
    fn new(doc: &'a PdfDocument, index: usize, id: ObjectId) -> Result<Self> {
        let dict = doc
            .inner
            .get_object(id)
            .and_then(Object::as_dict)
            .map_err(|e| Error::unreadable(&doc.path, format!("page {}: {e}", index + 1)))?;

        let mut page = Self {
            doc,
            id,
            dict,
            index,
            mediabox: Rect::new(
                DEFAULT_MEDIABOX[0],
                DEFAULT_MEDIABOX[1],
                DEFAULT_MEDIABOX[2],
                DEFAULT_MEDIABOX[3],
            ),
            rotate: 0,
        };

        if let Some(Object::Array(arr)) = page.inherited(b"MediaBox") {
            let nums: Vec<f64> = arr
                .iter()
                .filter_map(|o| doc.resolve(o).and_then(as_number))
                .collect();
            if let [x0, y0, x1, y1] = nums[..] {
                page.mediabox = Rect::new(x0, y0, x1, y1);
            } else {
                warn!(page = index + 1, "malformed MediaBox, using letter size");
            }
        }
        if let Some(rotate) = page.inherited(b"Rotate").and_then(as_number) {
            page.rotate = (rotate as i64).rem_euclid(360) / 90 * 90;
        }

        Ok(page)
    }

    pub fn document(&self) -> &'a PdfDocument {
        self.doc
    }

    pub fn object_id(&self) -> ObjectId {
        self.id
    }

    pub(crate) fn dict(&self) -> &'a Dictionary {
        self.dict
    }

    /// 1-based page number.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Width and height of the page as displayed (after rotation).
    pub fn size(&self) -> (f64, f64) {
        let (w, h) = (self.mediabox.width(), self.mediabox.height());
        match self.rotate {
            90 | 270 => (h, w),
            _ => (w, h),
        }
    }

    /// Matrix from PDF user space to top-left page space.
    pub fn ctm(&self) -> Matrix {
        let Rect { x0, y0, x1, y1 } = self.mediabox;
        let base = match self.rotate {
            90 => (0.0, -1.0, 1.0, 0.0, -y0, x1),
            180 => (-1.0, 0.0, 0.0, -1.0, x1, y1),
            270 => (0.0, 1.0, -1.0, 0.0, y1, -x0),
            _ => (1.0, 0.0, 0.0, 1.0, -x0, -y0),
        };
        let (_, height) = self.size();
        mult_matrix(base, (1.0, 0.0, 0.0, -1.0, 0.0, height))
    }

    /// Maps a rectangle from PDF user space to page space.
    pub fn to_page_space(&self, rect: Rect) -> Rect {
        apply_matrix_rect(self.ctm(), rect)
    }

    /// Maps a point from PDF user space to page space.
    pub fn point_to_page_space(&self, pt: Point) -> Point {
        apply_matrix_pt(self.ctm(), pt)
    }

    /// The page's area in page space.
    pub fn bounds(&self) -> Rect {
        let (w, h) = self.size();
        Rect::new(0.0, 0.0, w, h)
    }

    /// Looks up an attribute on the page, walking up /Parent links.
    fn inherited(&self, key: &[u8]) -> Option<&'a Object> {
        let mut dict = self.dict;
        for _ in 0..MAX_REF_DEPTH {
            if let Some(obj) = self.doc.get(dict, key) {
                return Some(obj);
            }
            dict = self.doc.get_dict(dict, b"Parent")?;
        }
        None
    }

    /// The page's resource dictionary, if any.
    pub(crate) fn resources(&self) -> Option<&'a Dictionary> {
        match self.inherited(b"Resources")? {
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// Concatenated, decoded content streams.
    pub fn contents(&self) -> Vec<u8> {
        let Some(obj) = self.dict.get(b"Contents").ok() else {
            return Vec::new();
        };
        let parts: Vec<&Object> = match self.doc.resolve(obj) {
            Some(Object::Array(arr)) => arr.iter().collect(),
            Some(_) => vec![obj],
            None => Vec::new(),
        };

        let mut content = Vec::new();
        for part in parts {
            if let Some(bytes) = self.doc.stream_bytes(part) {
                if !content.is_empty() {
                    content.push(b'\n');
                }
                content.extend_from_slice(&bytes);
            }
        }
        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_detection() {
        assert!(has_pdf_header(b"%PDF-1.7\n..."));
        assert!(has_pdf_header(b"\xef\xbb\xbf%PDF-1.4"));
        assert!(!has_pdf_header(b"hello world"));
        assert!(!has_pdf_header(b""));
    }

    #[test]
    fn test_missing_file() {
        let err = PdfDocument::open("/definitely/not/here.pdf").unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn test_garbage_is_unreadable() {
        let err = PdfDocument::from_bytes("mem.pdf", b"not a pdf at all").unwrap_err();
        assert!(matches!(err, Error::UnreadableDocument { .. }));
        let err = PdfDocument::from_bytes("mem.pdf", b"%PDF-1.4\ngarbage").unwrap_err();
        assert!(matches!(err, Error::UnreadableDocument { .. }));
    }

    #[test]
    fn test_as_number() {
        assert_eq!(as_number(&Object::Integer(3)), Some(3.0));
        assert_eq!(as_number(&Object::Real(0.5)), Some(0.5));
        assert_eq!(as_number(&Object::Null), None);
    }
}
