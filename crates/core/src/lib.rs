//! annotext - extract reviewer comments and highlighted text from PDF files.
//!
//! The crate reads PDFs through `lopdf` and runs a small content-stream
//! interpreter to recover where each glyph and each painted shape sits on
//! the page. Three pipelines build on that:
//!
//! - [`extract_comments`]: annotations with a comment, and the text they mark
//! - [`extract_enumerated`]: numbered comment blocks highlighted yellow or
//!   light blue
//! - [`extract_highlights`]: highlighted passages with a classified color
//!
//! ```no_run
//! use annotext_core::{ExtractParams, PdfDocument, extract_comments};
//!
//! let doc = PdfDocument::open("review.pdf")?;
//! for record in extract_comments(&doc, &ExtractParams::default())? {
//!     println!("{}: {}", record.page, record.text);
//! }
//! # Ok::<(), annotext_core::Error>(())
//! ```

pub mod annotation;
pub mod color;
pub mod document;
pub mod error;
pub mod extract;
pub mod font;
pub mod geometry;
pub mod interp;
pub mod output;
pub mod params;
pub mod text;

pub use annotation::{Annotation, AnnotationKind};
pub use color::{
    ColorClassifier, ColorLabel, ENUMERATED_TARGETS, NearestClassifier, Rgb, STANDARD_PALETTE,
    THRESHOLD_PALETTE, ThresholdClassifier, parse_color_selection,
};
pub use document::{PdfDocument, PdfPage};
pub use error::{Error, Result};
pub use extract::{
    CommentRecord, EnumeratedOptions, EnumeratedRecord, HighlightRecord, extract_comments,
    extract_enumerated, extract_highlights,
};
pub use geometry::Rect;
pub use output::OutputFormat;
pub use params::ExtractParams;
