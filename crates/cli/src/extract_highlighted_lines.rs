//! extract-highlighted-lines - report numbered comments that were highlighted
//! yellow or light blue.

mod common;

use std::process::ExitCode;

use annotext_core::color::{ENUMERATED_TARGETS, parse_color_selection};
use annotext_core::output::render_enumerated;
use annotext_core::{EnumeratedOptions, extract_enumerated};
use clap::Parser;
use common::{CommonArgs, EXIT_CODES_HELP, init_logging, run};

/// Extract enumerated comments ("1. ...", "2. ...") marked with a highlight.
#[derive(Parser, Debug)]
#[command(name = "extract-highlighted-lines")]
#[command(author, version, about, long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Highlight colors to report: yellow, light-blue (default: both)
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    colors: Vec<String>,

    /// Maximum RGB distance from yellow (1, 1, 0)
    #[arg(long = "yellow-threshold", default_value = "0.35")]
    yellow_threshold: f64,

    /// Maximum RGB distance from light blue (0.6, 0.8, 1.0)
    #[arg(long = "light-blue-threshold", default_value = "0.35")]
    light_blue_threshold: f64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.common.debug);

    run(|| {
        let params = cli.common.params()?;
        let colors = parse_color_selection(&cli.colors, &ENUMERATED_TARGETS)?;
        let options =
            EnumeratedOptions::new(colors, cli.yellow_threshold, cli.light_blue_threshold)?;
        let doc = cli.common.open()?;
        let records = extract_enumerated(&doc, &options, &params)?;
        render_enumerated(&records, cli.common.output_format())
    })
}
