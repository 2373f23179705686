//! Report command orchestration and option value types.
//!
//! The command function takes already-parsed option values and an injected
//! stdout sink, making the full pipeline easy to test without capturing
//! process output.

use std::collections::HashMap;
use std::fs;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::filter::{self, PatternFilter};
use crate::gocover;
use crate::model::CoverageStore;
use crate::render::{self, Format, RenderOptions};
use crate::report;

/// A destination for the rendered report. Without a filename the report is
/// written to stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub format: Format,
    pub filename: Option<PathBuf>,
}

/// Comma-separated list of output destinations: bare format names write to
/// stdout, filenames infer their format from the extension.
///
/// Example: `txt,report.md` writes text to stdout and Markdown to
/// `report.md`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec(pub Vec<Output>);

impl FromStr for OutputSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut outputs = Vec::new();
        for value in s.split(',') {
            if let Ok(format) = value.parse::<Format>() {
                outputs.push(Output {
                    format,
                    filename: None,
                });
                continue;
            }

            // Assume a filename and infer the format from its extension.
            let ext = Path::new(value)
                .extension()
                .and_then(|e| e.to_str())
                .ok_or_else(|| format!("invalid output value: {value}"))?;
            let format = ext
                .parse::<Format>()
                .map_err(|_| format!("invalid output format: {ext}"))?;
            outputs.push(Output {
                format,
                filename: Some(PathBuf::from(value)),
            });
        }
        Ok(Self(outputs))
    }
}

/// Lower and upper badge threshold percentages, parsed from `lower,upper`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub lower: f64,
    pub upper: f64,
}

impl FromStr for Thresholds {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lower, upper) = s
            .split_once(',')
            .ok_or_else(|| format!("invalid thresholds value: {s}"))?;
        let lower = lower
            .parse()
            .map_err(|_| format!("invalid lower threshold '{lower}'"))?;
        let upper = upper
            .parse()
            .map_err(|_| format!("invalid upper threshold '{upper}'"))?;
        Ok(Self { lower, upper })
    }
}

/// All options of the report command, independent of the CLI parser.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Coverage profile files, folded into one store in order.
    pub files: Vec<PathBuf>,
    /// Calculation-filter patterns (change the numbers).
    pub filter: Vec<String>,
    /// Output-filter patterns (change only visible rows).
    pub filter_output: Vec<String>,
    /// Listing of tested files, converted into an output filter. Overrides
    /// `filter_output`.
    pub filter_output_file: Option<PathBuf>,
    pub nest_files: bool,
    pub outputs: Vec<Output>,
    pub thresholds: Thresholds,
    pub trim_package_prefix: String,
}

/// Run the full parse → aggregate → render pipeline, writing stdout
/// destinations to `stdout` and file destinations to disk.
pub fn cmd_report(opts: &ReportOptions, stdout: &mut dyn Write) -> Result<()> {
    let calc_filter = PatternFilter::new(&opts.filter)?;
    let output_filter = build_output_filter(opts)?;

    let mut store = CoverageStore::new();
    for path in &opts.files {
        let file = fs::File::open(path)
            .with_context(|| format!("failed opening coverage file {}", path.display()))?;
        gocover::parse_profile(BufReader::new(file), &mut store, &calc_filter)
            .with_context(|| format!("failed parsing coverage file {}", path.display()))?;
    }
    log::debug!("accumulated coverage for {} files", store.len());

    let report = report::build_report(&store);

    let render_opts = RenderOptions {
        nest_files: opts.nest_files,
        lower_threshold: opts.thresholds.lower,
        upper_threshold: opts.thresholds.upper,
        trim_package_prefix: opts.trim_package_prefix.clone(),
    };

    // Each requested format is rendered once and reused across destinations.
    let mut renders: HashMap<Format, String> = HashMap::new();
    for output in &opts.outputs {
        let rendered = renders.entry(output.format).or_insert_with(|| {
            render::render(&report, output.format, &output_filter, &render_opts)
        });

        match &output.filename {
            None => writeln!(stdout, "{rendered}")?,
            Some(path) => fs::write(path, rendered.as_bytes())
                .with_context(|| format!("failed writing report to {}", path.display()))?,
        }
    }

    Ok(())
}

fn build_output_filter(opts: &ReportOptions) -> Result<PatternFilter> {
    let patterns = match &opts.filter_output_file {
        Some(path) => {
            if !opts.filter_output.is_empty() {
                log::warn!("--filter-output-file overrides --filter-output");
            }
            let file = fs::File::open(path)
                .with_context(|| format!("failed opening filter output file {}", path.display()))?;
            filter::patterns_from_listing(BufReader::new(file))?
        }
        None => opts.filter_output.clone(),
    };
    PatternFilter::new(&patterns)
}
