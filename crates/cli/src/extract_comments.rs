//! extract-comments - list reviewer comments in a PDF with the text they
//! refer to.

mod common;

use std::process::ExitCode;

use annotext_core::extract_comments;
use annotext_core::output::render_comments;
use clap::Parser;
use common::{CommonArgs, EXIT_CODES_HELP, init_logging, run};

/// Extract annotation comments and the passages they are attached to.
#[derive(Parser, Debug)]
#[command(name = "extract-comments")]
#[command(author, version, about, long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.common.debug);

    run(|| {
        let params = cli.common.params()?;
        let doc = cli.common.open()?;
        let records = extract_comments(&doc, &params)?;
        render_comments(&records, cli.common.output_format())
    })
}
