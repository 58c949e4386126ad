//! extract-highlights - report highlighted passages in a PDF by color.

mod common;

use std::process::ExitCode;

use annotext_core::color::{
    ColorClassifier, NearestClassifier, THRESHOLD_PALETTE, ThresholdClassifier,
    parse_color_selection,
};
use annotext_core::extract_highlights;
use annotext_core::output::render_highlights;
use annotext_core::{Error, Result};
use clap::Parser;
use common::{CommonArgs, EXIT_CODES_HELP, init_logging, run};

/// Extract highlighted text grouped by highlight color.
#[derive(Parser, Debug)]
#[command(name = "extract-highlights")]
#[command(author, version, about, long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Colors to report: yellow, green, blue, light-blue or all
    #[arg(long, num_args = 1.., value_delimiter = ',', default_value = "all")]
    colors: Vec<String>,

    /// Maximum RGB distance between a highlight and its color
    #[arg(long = "color-threshold", default_value = "0.35")]
    color_threshold: f64,

    /// Label every highlight with the nearest standard color instead
    #[arg(long, conflicts_with = "color_threshold", conflicts_with = "colors")]
    nearest: bool,

    /// Maximum gap in points between highlights merged into one passage
    #[arg(long = "merge-tolerance", default_value = "2.0")]
    merge_tolerance: f64,
}

impl Cli {
    fn classifier(&self) -> Result<Box<dyn ColorClassifier>> {
        if self.nearest {
            return Ok(Box::new(NearestClassifier::default()));
        }
        let selected = parse_color_selection(&self.colors, &THRESHOLD_PALETTE)?;
        if selected.is_empty() {
            return Err(Error::InvalidArgument("no colors selected".to_string()));
        }
        let classifier = ThresholdClassifier::new(THRESHOLD_PALETTE.to_vec(), self.color_threshold)?
            .reporting(selected);
        Ok(Box::new(classifier))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.common.debug);

    run(|| {
        let params = cli
            .common
            .params()?
            .with_merge_tolerance(cli.merge_tolerance)?;
        let classifier = cli.classifier()?;
        let doc = cli.common.open()?;
        let records = extract_highlights(&doc, classifier.as_ref(), &params)?;
        render_highlights(&records, cli.common.output_format())
    })
}
