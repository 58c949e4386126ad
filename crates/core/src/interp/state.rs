//! Graphics and text state tracked by the interpreter.

use std::sync::Arc;

use crate::color::Rgb;
use crate::font::PdfFont;
use crate::geometry::{MATRIX_IDENTITY, Matrix, Point};

/// Color space families the interpreter distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Gray,
    Rgb,
    Cmyk,
    Pattern,
    /// Indexed, Separation, DeviceN and anything unrecognized.
    Other,
}

impl ColorSpace {
    /// Maps a color space family name.
    pub fn from_family(name: &[u8]) -> Option<Self> {
        match name {
            b"DeviceGray" | b"CalGray" | b"G" => Some(Self::Gray),
            b"DeviceRGB" | b"CalRGB" | b"Lab" | b"RGB" => Some(Self::Rgb),
            b"DeviceCMYK" | b"CMYK" => Some(Self::Cmyk),
            b"Pattern" => Some(Self::Pattern),
            b"Indexed" | b"I" | b"Separation" | b"DeviceN" => Some(Self::Other),
            _ => None,
        }
    }

    /// Color space of an ICCBased stream with `n` components.
    pub fn from_components(n: usize) -> Self {
        match n {
            1 => Self::Gray,
            3 => Self::Rgb,
            4 => Self::Cmyk,
            _ => Self::Other,
        }
    }

    /// The initial color after selecting this space.
    pub fn initial_color(self) -> Color {
        match self {
            Self::Gray | Self::Rgb => Color::Gray(0.0),
            Self::Cmyk => Color::Cmyk(0.0, 0.0, 0.0, 1.0),
            Self::Pattern | Self::Other => Color::Unknown,
        }
    }
}

/// A color value as set by the content stream.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Color {
    Gray(f64),
    Rgb(f64, f64, f64),
    Cmyk(f64, f64, f64, f64),
    /// Pattern fills and colors in spaces without an RGB mapping.
    #[default]
    Unknown,
}

impl Color {
    /// Builds a color from operands, interpreting them in `space`.
    pub fn from_operands(space: ColorSpace, values: &[f64]) -> Self {
        match (space, values) {
            (ColorSpace::Pattern | ColorSpace::Other, _) => Self::Unknown,
            (_, [g]) => Self::Gray(*g),
            (_, [r, g, b]) => Self::Rgb(*r, *g, *b),
            (_, [c, m, y, k]) => Self::Cmyk(*c, *m, *y, *k),
            _ => Self::Unknown,
        }
    }

    pub fn to_rgb(&self) -> Option<Rgb> {
        match self {
            Self::Gray(g) => Rgb::from_components(&[*g]),
            Self::Rgb(r, g, b) => Rgb::from_components(&[*r, *g, *b]),
            Self::Cmyk(c, m, y, k) => Rgb::from_components(&[*c, *m, *y, *k]),
            Self::Unknown => None,
        }
    }
}

/// Text state parameters (PDF 9.3) plus the current text position.
#[derive(Debug, Clone)]
pub struct TextState {
    /// Current font; `None` until `Tf` names a known font.
    pub font: Option<Arc<PdfFont>>,
    pub fontsize: f64,
    pub charspace: f64,
    pub wordspace: f64,
    /// Horizontal scaling percentage (100 = normal).
    pub scaling: f64,
    /// Stored negated, so `T*` moves by (0, leading).
    pub leading: f64,
    pub render: i32,
    pub rise: f64,
    /// Text line matrix.
    pub matrix: Matrix,
    /// Position within the current line, relative to `matrix`.
    pub linematrix: Point,
}

impl TextState {
    pub fn new() -> Self {
        Self {
            font: None,
            fontsize: 0.0,
            charspace: 0.0,
            wordspace: 0.0,
            scaling: 100.0,
            leading: 0.0,
            render: 0,
            rise: 0.0,
            matrix: MATRIX_IDENTITY,
            linematrix: (0.0, 0.0),
        }
    }

    /// Resets the text matrix; called by `BT`.
    pub fn reset(&mut self) {
        self.matrix = MATRIX_IDENTITY;
        self.linematrix = (0.0, 0.0);
    }
}

impl Default for TextState {
    fn default() -> Self {
        Self::new()
    }
}

/// The parts of the graphics state that affect what gets collected.
#[derive(Debug, Clone)]
pub struct GraphicState {
    /// Line width in page space units.
    pub linewidth: f64,
    pub scolor: Color,
    pub scs: ColorSpace,
    pub ncolor: Color,
    pub ncs: ColorSpace,
}

impl GraphicState {
    pub fn new() -> Self {
        Self {
            linewidth: 1.0,
            scolor: Color::Gray(0.0),
            scs: ColorSpace::Gray,
            ncolor: Color::Gray(0.0),
            ncs: ColorSpace::Gray,
        }
    }
}

impl Default for GraphicState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_operands() {
        assert_eq!(
            Color::from_operands(ColorSpace::Rgb, &[1.0, 1.0, 0.0]),
            Color::Rgb(1.0, 1.0, 0.0)
        );
        assert_eq!(
            Color::from_operands(ColorSpace::Pattern, &[1.0]),
            Color::Unknown
        );
        assert_eq!(Color::from_operands(ColorSpace::Rgb, &[0.5, 0.5]), Color::Unknown);
    }

    #[test]
    fn test_cmyk_to_rgb() {
        let rgb = Color::Cmyk(0.0, 0.0, 1.0, 0.0).to_rgb().unwrap();
        assert_eq!(rgb, Rgb::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_bt_resets_position() {
        let mut ts = TextState::new();
        ts.matrix = (1.0, 0.0, 0.0, 1.0, 72.0, 700.0);
        ts.linematrix = (30.0, 0.0);
        ts.reset();
        assert_eq!(ts.matrix, MATRIX_IDENTITY);
        assert_eq!(ts.linematrix, (0.0, 0.0));
    }
}
