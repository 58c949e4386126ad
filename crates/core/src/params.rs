//! Extraction parameters.
//!
//! Contains ExtractParams, the tunable geometry constants shared by all
//! extractors.

use crate::error::{Error, Result};

/// Parameters for text association and highlight merging.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractParams {
    /// Fraction of a glyph's height that must lie inside a rectangle for the
    /// glyph to count as contained. Also the minimum vertical overlap, relative
    /// to the smaller glyph, for two glyphs to share a text line.
    pub line_overlap: f64,

    /// Two glyphs on one band farther apart than this, relative to the wider
    /// glyph, start separate text lines.
    pub char_margin: f64,

    /// Horizontal gap between glyphs, relative to font size, above which a
    /// space is inserted.
    pub word_margin: f64,

    /// Two highlight rectangles closer than this (in points) are adjacent.
    pub merge_tolerance: f64,

    /// Drawing fills taller than this (in points) are not treated as highlights.
    pub max_highlight_height: f64,

    /// Drawing fills whose max-min channel spread is below this are treated as
    /// gray backgrounds rather than highlights.
    pub min_chroma: f64,
}

impl Default for ExtractParams {
    fn default() -> Self {
        Self {
            line_overlap: 0.5,
            char_margin: 2.0,
            word_margin: 0.1,
            merge_tolerance: 2.0,
            max_highlight_height: 40.0,
            min_chroma: 0.15,
        }
    }
}

impl ExtractParams {
    /// Creates parameters, rejecting values outside their meaningful range.
    pub fn new(
        line_overlap: f64,
        char_margin: f64,
        word_margin: f64,
        merge_tolerance: f64,
        max_highlight_height: f64,
        min_chroma: f64,
    ) -> Result<Self> {
        if !(line_overlap > 0.0 && line_overlap <= 1.0) {
            return Err(Error::InvalidArgument(format!(
                "line overlap must be in (0, 1], got {line_overlap}"
            )));
        }
        if !(char_margin > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "char margin must be positive, got {char_margin}"
            )));
        }
        if !(word_margin >= 0.0) {
            return Err(Error::InvalidArgument(format!(
                "word margin must be non-negative, got {word_margin}"
            )));
        }
        if !(merge_tolerance >= 0.0) {
            return Err(Error::InvalidArgument(format!(
                "merge tolerance must be non-negative, got {merge_tolerance}"
            )));
        }
        if !(max_highlight_height > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "max highlight height must be positive, got {max_highlight_height}"
            )));
        }
        if !(0.0..=1.0).contains(&min_chroma) {
            return Err(Error::InvalidArgument(format!(
                "min chroma must be in [0, 1], got {min_chroma}"
            )));
        }

        Ok(Self {
            line_overlap,
            char_margin,
            word_margin,
            merge_tolerance,
            max_highlight_height,
            min_chroma,
        })
    }

    /// Returns a copy with a different line overlap ratio.
    pub fn with_line_overlap(self, line_overlap: f64) -> Result<Self> {
        Self::new(
            line_overlap,
            self.char_margin,
            self.word_margin,
            self.merge_tolerance,
            self.max_highlight_height,
            self.min_chroma,
        )
    }

    /// Returns a copy with a different merge tolerance.
    pub fn with_merge_tolerance(self, merge_tolerance: f64) -> Result<Self> {
        Self::new(
            self.line_overlap,
            self.char_margin,
            self.word_margin,
            merge_tolerance,
            self.max_highlight_height,
            self.min_chroma,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let d = ExtractParams::default();
        let rebuilt = ExtractParams::new(
            d.line_overlap,
            d.char_margin,
            d.word_margin,
            d.merge_tolerance,
            d.max_highlight_height,
            d.min_chroma,
        )
        .unwrap();
        assert_eq!(d, rebuilt);
    }

    #[test]
    fn test_rejects_zero_overlap() {
        let err = ExtractParams::default().with_line_overlap(0.0).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_rejects_nan_tolerance() {
        assert!(ExtractParams::default().with_merge_tolerance(f64::NAN).is_err());
    }
}
