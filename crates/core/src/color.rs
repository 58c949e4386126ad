//! Highlight colors and color classification.
//!
//! Classification is a strategy: a [`ColorClassifier`] maps an RGB triple to
//! an optional [`ColorLabel`]. [`ThresholdClassifier`] rejects colors that are
//! not close enough to any palette entry; [`NearestClassifier`] always picks
//! the closest entry.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// An RGB color with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from PDF color components.
    ///
    /// 1 component is gray, 3 are RGB, 4 are CMYK. Components on the [0, 255]
    /// scale are normalized to [0, 1]. Any other arity yields `None`
    /// (an empty `/C` array means "transparent").
    pub fn from_components(values: &[f64]) -> Option<Self> {
        let scale = if values.iter().any(|v| *v > 1.0) {
            255.0
        } else {
            1.0
        };
        let v: Vec<f64> = values.iter().map(|v| (v / scale).clamp(0.0, 1.0)).collect();
        match v.as_slice() {
            [g] => Some(Self::new(*g, *g, *g)),
            [r, g, b] => Some(Self::new(*r, *g, *b)),
            [c, m, y, k] => Some(Self::new(
                (1.0 - c) * (1.0 - k),
                (1.0 - m) * (1.0 - k),
                (1.0 - y) * (1.0 - k),
            )),
            _ => None,
        }
    }

    /// Spread between the strongest and weakest channel. Grays are 0.
    pub fn chroma(&self) -> f64 {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        max - min
    }
}

/// Euclidean distance between two colors.
pub fn rgb_distance(a: Rgb, b: Rgb) -> f64 {
    ((a.r - b.r).powi(2) + (a.g - b.g).powi(2) + (a.b - b.b).powi(2)).sqrt()
}

/// Largest possible distance in the unit RGB cube.
pub const MAX_RGB_DISTANCE: f64 = 1.732_050_807_568_877_2;

/// Named highlight color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColorLabel {
    Yellow,
    Green,
    Blue,
    LightBlue,
    Red,
    Orange,
    Purple,
    Pink,
}

impl ColorLabel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColorLabel::Yellow => "yellow",
            ColorLabel::Green => "green",
            ColorLabel::Blue => "blue",
            ColorLabel::LightBlue => "light-blue",
            ColorLabel::Red => "red",
            ColorLabel::Orange => "orange",
            ColorLabel::Purple => "purple",
            ColorLabel::Pink => "pink",
        }
    }

    /// Reference color used for distance tests.
    pub const fn rgb(&self) -> Rgb {
        match self {
            ColorLabel::Yellow => Rgb::new(1.0, 1.0, 0.0),
            ColorLabel::Green => Rgb::new(0.0, 1.0, 0.0),
            ColorLabel::Blue => Rgb::new(0.0, 0.0, 1.0),
            ColorLabel::LightBlue => Rgb::new(0.6, 0.8, 1.0),
            ColorLabel::Red => Rgb::new(1.0, 0.0, 0.0),
            ColorLabel::Orange => Rgb::new(1.0, 0.65, 0.0),
            ColorLabel::Purple => Rgb::new(0.5, 0.0, 0.5),
            ColorLabel::Pink => Rgb::new(1.0, 0.75, 0.8),
        }
    }

    /// Label as reported by the general highlight extractor: light blue is
    /// folded into blue.
    pub const fn normalized(self) -> Self {
        match self {
            ColorLabel::LightBlue => ColorLabel::Blue,
            other => other,
        }
    }
}

impl fmt::Display for ColorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ColorLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl FromStr for ColorLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect();
        match key.as_str() {
            "yellow" => Ok(ColorLabel::Yellow),
            "green" => Ok(ColorLabel::Green),
            "blue" => Ok(ColorLabel::Blue),
            "lightblue" => Ok(ColorLabel::LightBlue),
            "red" => Ok(ColorLabel::Red),
            "orange" => Ok(ColorLabel::Orange),
            "purple" => Ok(ColorLabel::Purple),
            "pink" => Ok(ColorLabel::Pink),
            _ => Err(Error::InvalidArgument(format!("unknown color: {s}"))),
        }
    }
}

/// Targets of the enumerated-comment extractor.
pub const ENUMERATED_TARGETS: [ColorLabel; 2] = [ColorLabel::Yellow, ColorLabel::LightBlue];

/// Palette of the threshold-mode general extractor (`--colors all`).
pub const THRESHOLD_PALETTE: [ColorLabel; 4] = [
    ColorLabel::Yellow,
    ColorLabel::Green,
    ColorLabel::Blue,
    ColorLabel::LightBlue,
];

/// Palette of the nearest-match general extractor.
pub const STANDARD_PALETTE: [ColorLabel; 8] = [
    ColorLabel::Yellow,
    ColorLabel::Green,
    ColorLabel::Blue,
    ColorLabel::LightBlue,
    ColorLabel::Red,
    ColorLabel::Orange,
    ColorLabel::Purple,
    ColorLabel::Pink,
];

/// Parses a `--colors` selection against an allowed palette.
///
/// `all` expands to the whole palette. Duplicates are removed and palette
/// declaration order is preserved. An empty selection means the whole
/// palette.
pub fn parse_color_selection<S: AsRef<str>>(
    names: &[S],
    allowed: &[ColorLabel],
) -> Result<Vec<ColorLabel>> {
    if names.is_empty() {
        return Ok(allowed.to_vec());
    }
    let mut picked = Vec::new();
    for name in names {
        let name = name.as_ref();
        if name.trim().eq_ignore_ascii_case("all") {
            return Ok(allowed.to_vec());
        }
        let label: ColorLabel = name.parse()?;
        if !allowed.contains(&label) {
            return Err(Error::InvalidArgument(format!(
                "color {label} is not supported here (expected one of: {})",
                allowed
                    .iter()
                    .map(ColorLabel::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
        picked.push(label);
    }
    Ok(allowed
        .iter()
        .copied()
        .filter(|l| picked.contains(l))
        .collect())
}

/// Validates an RGB distance threshold.
pub fn validate_threshold(name: &str, threshold: f64) -> Result<f64> {
    if (0.0..=MAX_RGB_DISTANCE).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(Error::InvalidArgument(format!(
            "{name} must be between 0 and {MAX_RGB_DISTANCE:.3}, got {threshold}"
        )))
    }
}

/// True when `color` is within `threshold` of `target`.
pub fn is_color(color: Rgb, target: ColorLabel, threshold: f64) -> bool {
    rgb_distance(color, target.rgb()) <= threshold
}

/// Maps a color to a label, or rejects it.
pub trait ColorClassifier {
    fn classify(&self, rgb: Rgb) -> Option<ColorLabel>;
}

/// Closest palette entry with its distance. Ties go to the earlier entry.
fn closest(palette: &[ColorLabel], rgb: Rgb) -> Option<(ColorLabel, f64)> {
    let mut best: Option<(ColorLabel, f64)> = None;
    for label in palette {
        let d = rgb_distance(rgb, label.rgb());
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((*label, d)),
        }
    }
    best
}

/// Accepts the closest palette entry only when it lies within the threshold.
///
/// Matching always runs against the whole palette; [`reporting`] narrows
/// which of the matched labels are returned.
///
/// [`reporting`]: ThresholdClassifier::reporting
#[derive(Debug, Clone)]
pub struct ThresholdClassifier {
    palette: Vec<ColorLabel>,
    reported: Vec<ColorLabel>,
    threshold: f64,
}

impl ThresholdClassifier {
    pub fn new(palette: Vec<ColorLabel>, threshold: f64) -> Result<Self> {
        let threshold = validate_threshold("color threshold", threshold)?;
        Ok(Self {
            reported: palette.clone(),
            palette,
            threshold,
        })
    }

    /// Keeps only matches whose label is in `labels`.
    pub fn reporting(mut self, labels: Vec<ColorLabel>) -> Self {
        self.reported = labels;
        self
    }

    pub fn palette(&self) -> &[ColorLabel] {
        &self.palette
    }
}

impl ColorClassifier for ThresholdClassifier {
    fn classify(&self, rgb: Rgb) -> Option<ColorLabel> {
        closest(&self.palette, rgb)
            .filter(|(_, d)| *d <= self.threshold)
            .map(|(label, _)| label)
            .filter(|label| self.reported.contains(label))
    }
}

/// Always assigns the closest palette entry.
#[derive(Debug, Clone)]
pub struct NearestClassifier {
    palette: Vec<ColorLabel>,
}

impl NearestClassifier {
    pub fn new(palette: Vec<ColorLabel>) -> Self {
        Self { palette }
    }
}

impl Default for NearestClassifier {
    fn default() -> Self {
        Self::new(STANDARD_PALETTE.to_vec())
    }
}

impl ColorClassifier for NearestClassifier {
    fn classify(&self, rgb: Rgb) -> Option<ColorLabel> {
        closest(&self.palette, rgb).map(|(label, _)| label)
    }
}
