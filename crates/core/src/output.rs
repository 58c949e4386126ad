//! Text and JSON rendering of extraction records.
//!
//! Output is rendered to a `String` first so a failure never leaves a
//! partially written report behind.

use std::fmt::{self, Write as _};
use std::io::Write;
use std::str::FromStr;

use serde::Serialize;

use crate::color::ColorLabel;
use crate::error::{Error, Result};
use crate::extract::{CommentRecord, EnumeratedRecord, HighlightRecord};

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Json => "json",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(Error::InvalidArgument(format!(
                "unknown output format: {other} (expected text or json)"
            ))),
        }
    }
}

/// Pretty-printed JSON array with two-space indentation.
pub fn to_json<T: Serialize>(records: &[T]) -> Result<String> {
    let mut out = serde_json::to_string_pretty(records)?;
    out.push('\n');
    Ok(out)
}

fn join_colors(colors: &[ColorLabel]) -> String {
    colors
        .iter()
        .map(ColorLabel::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render_comments(records: &[CommentRecord], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(records);
    }
    let mut out = String::new();
    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "{}. Page: {}, Reference: \"{}\"",
            i + 1,
            record.page,
            record.reference
        );
        let _ = writeln!(out, "Comment: \"{}\"", record.text);
    }
    Ok(out)
}

pub fn render_enumerated(records: &[EnumeratedRecord], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(records);
    }
    let mut out = String::new();
    for record in records {
        let comment = record
            .comment
            .map_or_else(|| "n/a".to_string(), |n| n.to_string());
        let _ = writeln!(
            out,
            "page {} comment {} colors {}",
            record.page,
            comment,
            join_colors(&record.colors)
        );
        let _ = writeln!(out, "{}", record.text);
        out.push_str("---\n");
    }
    Ok(out)
}

pub fn render_highlights(records: &[HighlightRecord], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(records);
    }
    let mut out = String::new();
    for (i, record) in records.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. Page {} | {} | {}",
            i + 1,
            record.page,
            join_colors(&record.colors),
            record.text
        );
    }
    Ok(out)
}

/// Writes a rendered report and flushes the writer.
pub fn write_report<W: Write>(writer: &mut W, report: &str) -> Result<()> {
    writer.write_all(report.as_bytes())?;
    writer.flush()?;
    Ok(())
}
