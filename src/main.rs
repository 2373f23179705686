use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use covsum::cli::{self, OutputSpec, Thresholds};

/// covsum — Summarize Go coverage profiles as text or Markdown tables.
#[derive(Parser)]
#[command(name = "covsum", version, about)]
struct Cli {
    /// One or more coverage profile files.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Glob patterns applied to file paths to exclude files from the
    /// coverage calculation and the output. '!' re-includes, e.g.
    /// '*,!*pkg*' keeps only paths containing 'pkg'.
    #[arg(long, value_name = "PATTERN", value_delimiter = ',')]
    filter: Vec<String>,

    /// Glob patterns that exclude files from the output only, leaving the
    /// calculated numbers untouched.
    #[arg(long, value_name = "PATTERN", value_delimiter = ',')]
    filter_output: Vec<String>,

    /// File with newline-separated paths of tested files to include in the
    /// output. Overrides --filter-output.
    #[arg(long, value_name = "PATH")]
    filter_output_file: Option<PathBuf>,

    /// List files by their full path instead of nesting them under their
    /// package.
    #[arg(long)]
    no_nest_files: bool,

    /// Comma-separated report destinations: 'txt' or 'md' write to stdout,
    /// filenames infer their format from the extension, e.g.
    /// 'txt,report.md'.
    #[arg(short, long, default_value = "txt")]
    output: OutputSpec,

    /// Lower and upper threshold percentages for badge coloring.
    #[arg(long, default_value = "50,75", value_name = "LOWER,UPPER")]
    thresholds: Thresholds,

    /// Trim this prefix from package and file paths in the output.
    #[arg(long, default_value = "", value_name = "PREFIX")]
    trim_package_prefix: String,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Cli::parse();
    let opts = cli::ReportOptions {
        files: args.files,
        filter: args.filter,
        filter_output: args.filter_output,
        filter_output_file: args.filter_output_file,
        nest_files: !args.no_nest_files,
        outputs: args.output.0,
        thresholds: args.thresholds,
        trim_package_prefix: args.trim_package_prefix,
    };

    cli::cmd_report(&opts, &mut io::stdout().lock())
}
