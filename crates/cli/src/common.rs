//! Arguments, logging and error reporting shared by the extract-* tools.

use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use annotext_core::output::write_report;
use annotext_core::{Error, ExtractParams, OutputFormat, PdfDocument, Result};
use clap::{ArgAction, Args, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Appended to every tool's `--help`.
pub const EXIT_CODES_HELP: &str = "\
Exit codes:
  0  success
  1  failed to write the report
  2  invalid argument
  3  file not found
  4  unreadable PDF document";

/// Report format.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum Format {
    /// Human-readable text (default)
    #[default]
    Text,
    /// Pretty-printed JSON array
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Path to the PDF file
    pub pdf: PathBuf,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    pub format: Format,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    pub debug: bool,

    /// Fraction of a glyph's height that must lie inside a highlight
    #[arg(long = "line-overlap", default_value = "0.5")]
    pub line_overlap: f64,
}

impl CommonArgs {
    pub fn output_format(&self) -> OutputFormat {
        self.format.into()
    }

    pub fn params(&self) -> Result<ExtractParams> {
        ExtractParams::default().with_line_overlap(self.line_overlap)
    }

    pub fn open(&self) -> Result<PdfDocument> {
        PdfDocument::open(&self.pdf)
    }
}

/// Sends log output to stderr. `--debug` wins over `RUST_LOG`; the default
/// level is `warn`.
pub fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Runs a tool body and writes its report to stdout. Errors are printed as
/// `Error: <message>` and mapped to the process exit code.
pub fn run<F>(body: F) -> ExitCode
where
    F: FnOnce() -> Result<String>,
{
    let outcome = body().and_then(|report| {
        let mut stdout = BufWriter::new(io::stdout().lock());
        write_report(&mut stdout, &report)
    });
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_error(&e),
    }
}

fn report_error(e: &Error) -> ExitCode {
    tracing::debug!(error = ?e, "run failed");
    eprintln!("Error: {e}");
    ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
}
