//! Fonts: character code decoding, glyph widths and Unicode mapping.
//!
//! Only what text placement needs is modelled. Glyph outlines are never
//! read; a glyph's box is derived from its advance width, the font size and
//! the font's descent.

use std::collections::HashMap;

use lopdf::{Dictionary, Object};
use tracing::trace;

use crate::document::{PdfDocument, as_number};

/// Advance used when a font gives no width for a code, in text space units.
const DEFAULT_GLYPH_WIDTH: f64 = 0.5;

/// Descent used when the font descriptor has none, as a fraction of the size.
const DEFAULT_DESCENT: f64 = -0.2;

/// Maps character codes to Unicode strings.
#[derive(Debug, Clone, Default)]
pub struct UnicodeMap {
    map: HashMap<u32, String>,
}

impl UnicodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: u32, text: String) {
        self.map.insert(code, text);
    }

    pub fn get(&self, code: u32) -> Option<&str> {
        self.map.get(&code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum CMapToken {
    Hex(Vec<u8>),
    Array(Vec<Vec<u8>>),
    Word(String),
}

/// Parses a ToUnicode CMap stream.
///
/// Handles `bfchar` and `bfrange` sections, including the array form of
/// `bfrange`. Tokens are read independently of line breaks.
pub fn parse_tounicode_cmap(data: &[u8]) -> UnicodeMap {
    let mut map = UnicodeMap::new();
    let tokens = tokenize_cmap(data);

    let mut section: Option<&str> = None;
    let mut pending: Vec<CMapToken> = Vec::new();

    for token in tokens {
        if let CMapToken::Word(word) = &token {
            match word.as_str() {
                "beginbfchar" => section = Some("bfchar"),
                "beginbfrange" => section = Some("bfrange"),
                "endbfchar" | "endbfrange" => section = None,
                _ => {}
            }
            pending.clear();
            continue;
        }

        match section {
            Some("bfchar") => {
                pending.push(token);
                if let [CMapToken::Hex(src), CMapToken::Hex(dst)] = &pending[..] {
                    map.insert(bytes_to_code(src), utf16be_to_string(dst));
                }
                if pending.len() >= 2 {
                    pending.clear();
                }
            }
            Some("bfrange") => {
                pending.push(token);
                if pending.len() == 3 {
                    apply_bfrange(&pending, &mut map);
                    pending.clear();
                }
            }
            _ => {}
        }
    }

    map
}

fn apply_bfrange(entry: &[CMapToken], map: &mut UnicodeMap) {
    let (CMapToken::Hex(start), CMapToken::Hex(end)) = (&entry[0], &entry[1]) else {
        return;
    };
    let (start, end) = (bytes_to_code(start), bytes_to_code(end));
    if end < start || end - start > 0xFFFF {
        return;
    }

    match &entry[2] {
        CMapToken::Hex(dst) => {
            let mut units: Vec<u16> = dst
                .chunks(2)
                .map(|c| match c {
                    [hi, lo] => u16::from_be_bytes([*hi, *lo]),
                    [b] => *b as u16,
                    _ => 0,
                })
                .collect();
            if units.is_empty() {
                return;
            }
            let last = units.len() - 1;
            let base = units[last];
            for (offset, code) in (start..=end).enumerate() {
                units[last] = base.wrapping_add(offset as u16);
                map.insert(code, String::from_utf16_lossy(&units));
            }
        }
        CMapToken::Array(items) => {
            for (code, dst) in (start..=end).zip(items) {
                map.insert(code, utf16be_to_string(dst));
            }
        }
        CMapToken::Word(_) => {}
    }
}

fn tokenize_cmap(data: &[u8]) -> Vec<CMapToken> {
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut array: Option<Vec<Vec<u8>>> = None;

    while i < data.len() {
        let b = data[i];
        match b {
            b'%' => {
                while i < data.len() && data[i] != b'\n' && data[i] != b'\r' {
                    i += 1;
                }
            }
            b'<' if data.get(i + 1) == Some(&b'<') => i += 2,
            b'>' if data.get(i + 1) == Some(&b'>') => i += 2,
            b'<' => {
                let close = data[i + 1..]
                    .iter()
                    .position(|&c| c == b'>')
                    .map_or(data.len(), |p| i + 1 + p);
                let hex = decode_hex(&data[i + 1..close]);
                match array.as_mut() {
                    Some(items) => items.push(hex),
                    None => tokens.push(CMapToken::Hex(hex)),
                }
                i = close + 1;
            }
            b'[' => {
                array = Some(Vec::new());
                i += 1;
            }
            b']' => {
                if let Some(items) = array.take() {
                    tokens.push(CMapToken::Array(items));
                }
                i += 1;
            }
            b if b.is_ascii_alphanumeric() || b == b'/' => {
                let start = i;
                while i < data.len()
                    && !data[i].is_ascii_whitespace()
                    && !b"<>[]%".contains(&data[i])
                {
                    i += 1;
                }
                if array.is_none() {
                    let word = String::from_utf8_lossy(&data[start..i]).into_owned();
                    tokens.push(CMapToken::Word(word));
                }
            }
            _ => i += 1,
        }
    }
    tokens
}

fn decode_hex(digits: &[u8]) -> Vec<u8> {
    let nibbles: Vec<u8> = digits
        .iter()
        .filter_map(|&c| (c as char).to_digit(16).map(|d| d as u8))
        .collect();
    nibbles
        .chunks(2)
        .map(|pair| match pair {
            [hi, lo] => (hi << 4) | lo,
            [hi] => hi << 4,
            _ => 0,
        })
        .collect()
}

fn bytes_to_code(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32)
}

fn utf16be_to_string(bytes: &[u8]) -> String {
    if bytes.len() == 1 {
        return char::from(bytes[0]).to_string();
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// PDFDocEncoding code points for bytes 0x18..=0x1F.
const PDFDOC_LOW: [u16; 8] = [
    0x02D8, 0x02C7, 0x02C6, 0x02D9, 0x02DD, 0x02DB, 0x02DA, 0x02DC,
];

/// PDFDocEncoding code points for bytes 0x80..=0xA0.
const PDFDOC_HIGH: [u16; 33] = [
    0x2022, 0x2020, 0x2021, 0x2026, 0x2014, 0x2013, 0x0192, 0x2044, 0x2039, 0x203A, 0x2212,
    0x2030, 0x201E, 0x201C, 0x201D, 0x2018, 0x2019, 0x201A, 0x2122, 0xFB01, 0xFB02, 0x0141,
    0x0152, 0x0160, 0x0178, 0x017D, 0x0131, 0x0142, 0x0153, 0x0161, 0x017E, 0xFFFD, 0x20AC,
];

/// WinAnsiEncoding code points for bytes 0x80..=0x9F.
const WIN_ANSI_HIGH: [u16; 32] = [
    0x20AC, 0xFFFD, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, 0x02C6, 0x2030, 0x0160,
    0x2039, 0x0152, 0xFFFD, 0x017D, 0xFFFD, 0xFFFD, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022,
    0x2013, 0x2014, 0x02DC, 0x2122, 0x0161, 0x203A, 0x0153, 0xFFFD, 0x017E, 0x0178,
];

fn pdfdoc_char(b: u8) -> char {
    let cp = match b {
        0x18..=0x1F => PDFDOC_LOW[(b - 0x18) as usize] as u32,
        0x80..=0xA0 => PDFDOC_HIGH[(b - 0x80) as usize] as u32,
        _ => b as u32,
    };
    char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER)
}

fn win_ansi_char(b: u8) -> char {
    let cp = match b {
        0x80..=0x9F => WIN_ANSI_HIGH[(b - 0x80) as usize] as u32,
        _ => b as u32,
    };
    char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Decodes a PDF text string (annotation contents, titles).
///
/// Strings starting with a UTF-16BE byte order mark are decoded as UTF-16;
/// anything else is PDFDocEncoding. A UTF-8 BOM is honoured as well.
pub fn decode_text(s: &[u8]) -> String {
    if let Some(rest) = s.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else if let Some(rest) = s.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        String::from_utf8_lossy(rest).into_owned()
    } else {
        s.iter().map(|&b| pdfdoc_char(b)).collect()
    }
}

/// Maps a glyph name from an /Encoding /Differences array to text.
fn glyph_name_to_text(name: &str) -> Option<String> {
    if let Some(hex) = name.strip_prefix("uni") {
        if hex.len() == 4 {
            return u32::from_str_radix(hex, 16)
                .ok()
                .and_then(char::from_u32)
                .map(String::from);
        }
    }
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(c.to_string());
    }
    let text = match name {
        "space" => " ",
        "period" => ".",
        "comma" => ",",
        "colon" => ":",
        "semicolon" => ";",
        "hyphen" | "minus" => "-",
        "quoteright" => "\u{2019}",
        "quoteleft" => "\u{2018}",
        "quotedbl" => "\"",
        "quotesingle" => "'",
        "parenleft" => "(",
        "parenright" => ")",
        "slash" => "/",
        "question" => "?",
        "exclam" => "!",
        "endash" => "\u{2013}",
        "emdash" => "\u{2014}",
        "bullet" => "\u{2022}",
        "fi" => "fi",
        "fl" => "fl",
        "zero" => "0",
        "one" => "1",
        "two" => "2",
        "three" => "3",
        "four" => "4",
        "five" => "5",
        "six" => "6",
        "seven" => "7",
        "eight" => "8",
        "nine" => "9",
        _ => return None,
    };
    Some(text.to_string())
}

/// A font resource as far as text extraction needs it.
#[derive(Debug, Clone)]
pub struct PdfFont {
    basefont: String,
    multibyte: bool,
    widths: HashMap<u32, f64>,
    default_width: f64,
    descent: f64,
    to_unicode: Option<UnicodeMap>,
    differences: HashMap<u32, String>,
}

impl Default for PdfFont {
    fn default() -> Self {
        Self {
            basefont: String::new(),
            multibyte: false,
            widths: HashMap::new(),
            default_width: DEFAULT_GLYPH_WIDTH,
            descent: DEFAULT_DESCENT,
            to_unicode: None,
            differences: HashMap::new(),
        }
    }
}

impl PdfFont {
    /// Builds a font from its resource dictionary.
    pub fn load(doc: &PdfDocument, spec: &Dictionary) -> Self {
        let mut font = Self::default();

        font.basefont = doc
            .get(spec, b"BaseFont")
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .unwrap_or_default();
        let subtype = doc
            .get(spec, b"Subtype")
            .and_then(|o| o.as_name().ok())
            .unwrap_or(&b"Type1"[..]);

        if subtype == b"Type0" {
            font.multibyte = true;
            if let Some(descendant) = doc
                .get_array(spec, b"DescendantFonts")
                .and_then(|arr| arr.first())
                .and_then(|o| doc.resolve(o))
                .and_then(|o| o.as_dict().ok())
            {
                font.load_cid_widths(doc, descendant);
                font.load_descent(doc, descendant);
            }
        } else {
            font.load_simple_widths(doc, spec);
            font.load_descent(doc, spec);
            font.load_differences(doc, spec);
        }

        if let Some(data) = spec
            .get(b"ToUnicode")
            .ok()
            .and_then(|o| doc.stream_bytes(o))
        {
            let map = parse_tounicode_cmap(&data);
            trace!(font = %font.basefont, entries = map.len(), "parsed ToUnicode");
            if !map.is_empty() {
                font.to_unicode = Some(map);
            }
        }

        font
    }

    fn load_simple_widths(&mut self, doc: &PdfDocument, spec: &Dictionary) {
        let first = doc.get(spec, b"FirstChar").and_then(as_number).unwrap_or(0.0) as u32;
        if let Some(widths) = doc.get_numbers(spec, b"Widths") {
            for (i, w) in widths.into_iter().enumerate() {
                self.widths.insert(first + i as u32, w / 1000.0);
            }
        }
        if let Some(missing) = doc
            .get_dict(spec, b"FontDescriptor")
            .and_then(|d| doc.get(d, b"MissingWidth"))
            .and_then(as_number)
        {
            if missing > 0.0 {
                self.default_width = missing / 1000.0;
            }
        }
    }

    fn load_cid_widths(&mut self, doc: &PdfDocument, descendant: &Dictionary) {
        self.default_width = doc
            .get(descendant, b"DW")
            .and_then(as_number)
            .unwrap_or(1000.0)
            / 1000.0;

        let Some(w) = doc.get_array(descendant, b"W") else {
            return;
        };
        let items: Vec<&Object> = w.iter().filter_map(|o| doc.resolve(o)).collect();
        let mut i = 0;
        while i < items.len() {
            let Some(first) = as_number(items[i]) else {
                i += 1;
                continue;
            };
            let first = first as u32;
            match items.get(i + 1) {
                Some(Object::Array(ws)) => {
                    for (k, w) in ws.iter().filter_map(|o| doc.resolve(o)).enumerate() {
                        if let Some(w) = as_number(w) {
                            self.widths.insert(first + k as u32, w / 1000.0);
                        }
                    }
                    i += 2;
                }
                Some(last) => {
                    let (Some(last), Some(w)) =
                        (as_number(last), items.get(i + 2).and_then(|o| as_number(o)))
                    else {
                        break;
                    };
                    for cid in first..=(last as u32).min(first + 0xFFFF) {
                        self.widths.insert(cid, w / 1000.0);
                    }
                    i += 3;
                }
                None => break,
            }
        }
    }

    fn load_descent(&mut self, doc: &PdfDocument, dict: &Dictionary) {
        if let Some(descent) = doc
            .get_dict(dict, b"FontDescriptor")
            .and_then(|d| doc.get(d, b"Descent"))
            .and_then(as_number)
        {
            self.descent = (descent / 1000.0).clamp(-0.5, 0.0);
        }
    }

    fn load_differences(&mut self, doc: &PdfDocument, spec: &Dictionary) {
        let Some(Object::Dictionary(enc)) = doc.get(spec, b"Encoding") else {
            return;
        };
        let Some(diffs) = doc.get_array(enc, b"Differences") else {
            return;
        };
        let mut code = 0u32;
        for item in diffs.iter().filter_map(|o| doc.resolve(o)) {
            match item {
                Object::Integer(n) => code = *n as u32,
                Object::Name(name) => {
                    if let Some(text) = glyph_name_to_text(&String::from_utf8_lossy(name)) {
                        self.differences.insert(code, text);
                    }
                    code += 1;
                }
                _ => {}
            }
        }
    }

    pub fn basefont(&self) -> &str {
        &self.basefont
    }

    pub fn is_multibyte(&self) -> bool {
        self.multibyte
    }

    /// Font descent as a fraction of the font size (zero or negative).
    pub fn descent(&self) -> f64 {
        self.descent
    }

    /// Splits a string operand into character codes.
    pub fn decode(&self, data: &[u8]) -> Vec<u32> {
        if self.multibyte {
            data.chunks(2)
                .map(|c| match c {
                    [hi, lo] => u16::from_be_bytes([*hi, *lo]) as u32,
                    [b] => *b as u32,
                    _ => 0,
                })
                .collect()
        } else {
            data.iter().map(|&b| b as u32).collect()
        }
    }

    /// Advance width of a code in text space units (1.0 = font size).
    pub fn char_width(&self, cid: u32) -> f64 {
        self.widths
            .get(&cid)
            .copied()
            .filter(|w| *w > 0.0)
            .unwrap_or(self.default_width)
    }

    /// Unicode text for a code. Unmapped codes of multibyte fonts yield U+FFFD.
    pub fn to_unichr(&self, cid: u32) -> String {
        if let Some(text) = self.to_unicode.as_ref().and_then(|m| m.get(cid)) {
            return text.to_string();
        }
        if let Some(text) = self.differences.get(&cid) {
            return text.clone();
        }
        if self.multibyte {
            return char::REPLACEMENT_CHARACTER.to_string();
        }
        win_ansi_char(cid as u8).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bfchar_and_bfrange() {
        let cmap = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
1 begincodespacerange <0000> <FFFF> endcodespacerange
2 beginbfchar
<0003> <0020> <0011> <0041>
endbfchar
2 beginbfrange
<0020> <0022> <0061>
<0030> <0031> [<00660069> <0042>]
endbfrange
endcmap";
        let map = parse_tounicode_cmap(cmap);
        assert_eq!(map.get(0x03), Some(" "));
        assert_eq!(map.get(0x11), Some("A"));
        assert_eq!(map.get(0x20), Some("a"));
        assert_eq!(map.get(0x22), Some("c"));
        assert_eq!(map.get(0x30), Some("fi"));
        assert_eq!(map.get(0x31), Some("B"));
        assert_eq!(map.get(0x23), None);
    }

    #[test]
    fn test_decode_text_encodings() {
        assert_eq!(decode_text(b"Note"), "Note");
        assert_eq!(decode_text(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]), "Hi");
        assert_eq!(decode_text(&[0x8D]), "\u{201C}");
        assert_eq!(decode_text(&[0xE9]), "\u{e9}");
    }

    #[test]
    fn test_default_font_metrics() {
        let font = PdfFont::default();
        assert_eq!(font.decode(b"AB"), vec![65, 66]);
        assert_eq!(font.char_width(65), DEFAULT_GLYPH_WIDTH);
        assert_eq!(font.to_unichr(65), "A");
        assert_eq!(font.to_unichr(0x93), "\u{201C}");
    }

    #[test]
    fn test_multibyte_decode() {
        let font = PdfFont {
            multibyte: true,
            ..PdfFont::default()
        };
        assert_eq!(font.decode(&[0x00, 0x41, 0x01, 0x02]), vec![0x41, 0x102]);
        assert_eq!(font.to_unichr(0x41), "\u{FFFD}");
    }

    #[test]
    fn test_glyph_names() {
        assert_eq!(glyph_name_to_text("a").as_deref(), Some("a"));
        assert_eq!(glyph_name_to_text("uni00E9").as_deref(), Some("\u{e9}"));
        assert_eq!(glyph_name_to_text("space").as_deref(), Some(" "));
        assert_eq!(glyph_name_to_text("g123"), None);
    }
}
