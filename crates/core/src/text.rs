//! Page text: glyphs grouped into lines, and clipping by rectangle.
//!
//! Glyphs on the same horizontal band are grouped the way layout analysis
//! groups characters: enough vertical overlap relative to the smaller glyph,
//! and not too far apart horizontally. Gaps wider than the word margin become
//! single spaces.

use crate::geometry::{Rect, reading_order};
use crate::params::ExtractParams;

/// One decoded character placed on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub text: String,
    pub bbox: Rect,
    pub size: f64,
}

impl Glyph {
    pub fn new(text: impl Into<String>, bbox: Rect, size: f64) -> Self {
        Self {
            text: text.into(),
            bbox,
            size,
        }
    }

    pub fn is_whitespace(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

/// True when the glyph counts as inside `rect`: its horizontal center lies in
/// the rect and at least `line_overlap` of its height overlaps it.
pub fn is_contained(glyph: &Rect, rect: &Rect, line_overlap: f64) -> bool {
    let (cx, _) = glyph.center();
    rect.contains_x(cx) && rect.vertical_overlap(glyph) >= line_overlap * glyph.height()
}

/// Joins glyphs into a string, inserting one space per word gap.
fn assemble<'g>(glyphs: impl IntoIterator<Item = &'g Glyph>, word_margin: f64) -> String {
    let mut out = String::new();
    let mut x1_tracker: Option<f64> = None;
    let mut pending_space = false;

    for glyph in glyphs {
        if glyph.is_whitespace() {
            pending_space = true;
            x1_tracker = Some(glyph.bbox.x1);
            continue;
        }
        let margin = word_margin * glyph.bbox.width().max(glyph.bbox.height());
        if x1_tracker.is_some_and(|x1| x1 < glyph.bbox.x0 - margin) {
            pending_space = true;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push_str(&glyph.text);
        x1_tracker = Some(glyph.bbox.x1);
    }
    out
}

/// Glyphs sharing a baseline band, left to right.
#[derive(Debug, Clone)]
pub struct TextLine {
    glyphs: Vec<Glyph>,
    bbox: Rect,
    text: String,
}

impl TextLine {
    fn new(glyphs: Vec<Glyph>, word_margin: f64) -> Option<Self> {
        let bbox = Rect::bound_of(
            glyphs
                .iter()
                .flat_map(|g| [(g.bbox.x0, g.bbox.y0), (g.bbox.x1, g.bbox.y1)]),
        )?;
        let text = assemble(&glyphs, word_margin).trim().to_string();
        if text.is_empty() {
            return None;
        }
        Some(Self { glyphs, bbox, text })
    }

    /// Line text with word gaps as single spaces, trimmed.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn bbox(&self) -> Rect {
        self.bbox
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }
}

struct Band {
    bbox: Rect,
    min_height: f64,
    glyphs: Vec<Glyph>,
}

/// All text on a page, as lines in reading order.
#[derive(Debug, Clone, Default)]
pub struct PageText {
    lines: Vec<TextLine>,
    line_overlap: f64,
    word_margin: f64,
}

impl PageText {
    pub fn from_glyphs(glyphs: Vec<Glyph>, params: &ExtractParams) -> Self {
        let mut glyphs: Vec<Glyph> = glyphs
            .into_iter()
            .filter(|g| g.bbox.height() > 0.0 && !g.text.is_empty())
            .collect();
        glyphs.sort_by(|a, b| reading_order(&a.bbox, &b.bbox));

        let mut bands: Vec<Band> = Vec::new();
        for glyph in glyphs {
            let height = glyph.bbox.height();
            let best = bands
                .iter_mut()
                .map(|band| {
                    let overlap = band.bbox.vertical_overlap(&glyph.bbox);
                    let required = params.line_overlap * height.min(band.min_height);
                    (band, overlap, required)
                })
                .filter(|(_, overlap, required)| *overlap > 0.0 && overlap >= required)
                .max_by(|a, b| a.1.total_cmp(&b.1));

            match best {
                Some((band, _, _)) => {
                    band.bbox = band.bbox.union(&glyph.bbox);
                    band.min_height = band.min_height.min(height);
                    band.glyphs.push(glyph);
                }
                None => bands.push(Band {
                    bbox: glyph.bbox,
                    min_height: height,
                    glyphs: vec![glyph],
                }),
            }
        }

        let mut lines = Vec::new();
        for mut band in bands {
            band.glyphs.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
            let mut current: Vec<Glyph> = Vec::new();
            for glyph in band.glyphs {
                if let Some(prev) = current.last() {
                    let gap = glyph.bbox.x0 - prev.bbox.x1;
                    let limit = params.char_margin * prev.bbox.width().max(glyph.bbox.width());
                    if gap > limit {
                        lines.extend(TextLine::new(std::mem::take(&mut current), params.word_margin));
                    }
                }
                current.push(glyph);
            }
            lines.extend(TextLine::new(current, params.word_margin));
        }
        lines.sort_by(|a, b| reading_order(&a.bbox, &b.bbox));

        Self {
            lines,
            line_overlap: params.line_overlap,
            word_margin: params.word_margin,
        }
    }

    pub fn lines(&self) -> &[TextLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Text inside `rect`, one entry per text line it touches.
    pub fn clip(&self, rect: &Rect) -> Vec<String> {
        self.clip_many(std::slice::from_ref(rect))
    }

    /// Text inside `rect`, lines joined with `\n`.
    pub fn clip_text(&self, rect: &Rect) -> String {
        self.clip(rect).join("\n")
    }

    /// Text inside the union of `rects`. A glyph covered by several rects is
    /// emitted once.
    pub fn clip_many(&self, rects: &[Rect]) -> Vec<String> {
        self.lines
            .iter()
            .filter_map(|line| {
                let inside = line.glyphs.iter().filter(|g| {
                    rects
                        .iter()
                        .any(|r| is_contained(&g.bbox, r, self.line_overlap))
                });
                let text = assemble(inside, self.word_margin);
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lays out `text` as 6pt-wide glyphs starting at (x, y) with 10pt height.
    fn word(text: &str, x: f64, y: f64) -> Vec<Glyph> {
        text.chars()
            .enumerate()
            .map(|(i, c)| {
                let x0 = x + i as f64 * 6.0;
                Glyph::new(c.to_string(), Rect::new(x0, y, x0 + 6.0, y + 10.0), 10.0)
            })
            .collect()
    }

    #[test]
    fn test_groups_lines_in_reading_order() {
        let mut glyphs = word("second", 10.0, 30.0);
        glyphs.extend(word("first", 10.0, 10.0));
        let page = PageText::from_glyphs(glyphs, &ExtractParams::default());
        let texts: Vec<&str> = page.lines().iter().map(TextLine::text).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn test_word_gap_becomes_space() {
        let mut glyphs = word("Hello", 10.0, 10.0);
        glyphs.extend(word("world", 10.0 + 5.0 * 6.0 + 4.0, 10.0));
        let page = PageText::from_glyphs(glyphs, &ExtractParams::default());
        assert_eq!(page.lines()[0].text(), "Hello world");
    }

    #[test]
    fn test_explicit_space_glyph() {
        let glyphs = word("a b", 0.0, 0.0);
        let page = PageText::from_glyphs(glyphs, &ExtractParams::default());
        assert_eq!(page.lines()[0].text(), "a b");
    }

    #[test]
    fn test_far_apart_glyphs_split_lines() {
        let mut glyphs = word("left", 0.0, 0.0);
        glyphs.extend(word("right", 300.0, 0.0));
        let page = PageText::from_glyphs(glyphs, &ExtractParams::default());
        assert_eq!(page.lines().len(), 2);
    }

    #[test]
    fn test_clip_uses_center_and_overlap() {
        let glyphs = word("Approved", 100.0, 100.0);
        let page = PageText::from_glyphs(glyphs, &ExtractParams::default());

        let full = Rect::new(99.0, 98.0, 149.0, 112.0);
        assert_eq!(page.clip_text(&full), "Approved");

        // Covers the centers of the first three glyphs only.
        let partial = Rect::new(100.0, 100.0, 116.0, 110.0);
        assert_eq!(page.clip_text(&partial), "App");

        // Only 30% of the glyph height is inside.
        let sliver = Rect::new(100.0, 107.0, 150.0, 120.0);
        assert_eq!(page.clip_text(&sliver), "");
    }

    #[test]
    fn test_clip_many_does_not_duplicate() {
        let glyphs = word("overlap", 0.0, 0.0);
        let page = PageText::from_glyphs(glyphs, &ExtractParams::default());
        let rects = [Rect::new(0.0, 0.0, 30.0, 10.0), Rect::new(10.0, 0.0, 42.0, 10.0)];
        assert_eq!(page.clip_many(&rects), vec!["overlap".to_string()]);
    }

    #[test]
    fn test_clip_multiple_lines() {
        let mut glyphs = word("one", 0.0, 0.0);
        glyphs.extend(word("two", 0.0, 12.0));
        let page = PageText::from_glyphs(glyphs, &ExtractParams::default());
        assert_eq!(page.clip_text(&Rect::new(0.0, 0.0, 50.0, 22.0)), "one\ntwo");
    }
}
