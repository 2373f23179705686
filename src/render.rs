//! Rendering of a [`Report`] tree as plain text or a Markdown table.
//!
//! Both formats share the same two-column row model: a sorted sequence of
//! package and file rows, built once and then laid out per format. Output
//! filtering happens here and only affects which rows are shown; the
//! percentages were fixed at aggregation time.

use std::fmt::Write;

use crate::filter::PathFilter;
use crate::report::Report;

/// Output format of a rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Text,
    Markdown,
}

impl Format {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Text => "txt",
            Format::Markdown => "md",
        }
    }
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "txt" => Ok(Format::Text),
            "md" => Ok(Format::Markdown),
            _ => Err(format!("unknown format: '{s}' (expected 'txt' or 'md')")),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendering adjustments that apply across formats.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Group file rows beneath their package row.
    pub nest_files: bool,
    /// Coverage percentage below which the badge turns critical.
    pub lower_threshold: f64,
    /// Coverage percentage at or above which the badge turns success.
    pub upper_threshold: f64,
    /// Prefix stripped from package and file labels.
    pub trim_package_prefix: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            nest_files: true,
            lower_threshold: 50.0,
            upper_threshold: 75.0,
            trim_package_prefix: String::new(),
        }
    }
}

/// One display row of the rendered table.
#[derive(Debug, Clone, PartialEq)]
enum Row {
    Package { name: String, coverage: f64 },
    File { name: String, coverage: f64 },
}

/// Render the report in the given format. Files whose path the output
/// filter excludes are dropped from display only; every percentage still
/// reflects the full pre-filter aggregation. An empty report renders as the
/// empty string for every format.
#[must_use]
pub fn render(
    report: &Report,
    format: Format,
    filter: &dyn PathFilter,
    opts: &RenderOptions,
) -> String {
    if report.packages.is_empty() {
        return String::new();
    }

    let rows = build_rows(report, filter, opts);

    let lines = match format {
        Format::Text => render_text(report, &rows, opts),
        Format::Markdown => render_markdown(report, &rows, opts),
    };
    lines.join("\n")
}

/// Flatten the tree into sorted display rows, applying the output filter
/// and label adjustments.
///
/// Packages and files are ordered lexicographically. A package row is kept
/// if its own path is not excluded, or (when nesting) it still has at least
/// one visible file.
fn build_rows(report: &Report, filter: &dyn PathFilter, opts: &RenderOptions) -> Vec<Row> {
    let mut pkg_names: Vec<&String> = report.packages.keys().collect();
    pkg_names.sort();

    let mut rows = Vec::new();
    for pkg_name in pkg_names {
        let pkg = &report.packages[pkg_name];

        let mut file_names: Vec<&String> = pkg.files.keys().collect();
        file_names.sort();

        let mut file_rows = Vec::new();
        for file_name in file_names {
            let file = &pkg.files[file_name];
            let abs_path = file.abs_path();
            if filter.is_excluded(&abs_path) {
                continue;
            }
            let name = if opts.nest_files {
                file.name.clone()
            } else {
                trim_prefix(&abs_path, &opts.trim_package_prefix).to_string()
            };
            file_rows.push(Row::File {
                name,
                coverage: file.stats.coverage(),
            });
        }

        if !filter.is_excluded(pkg_name) || (opts.nest_files && !file_rows.is_empty()) {
            rows.push(Row::Package {
                name: trim_prefix(pkg_name, &opts.trim_package_prefix).to_string(),
                coverage: pkg.stats.coverage(),
            });
        }
        rows.append(&mut file_rows);
    }

    rows
}

fn trim_prefix<'a>(s: &'a str, prefix: &str) -> &'a str {
    s.strip_prefix(prefix).unwrap_or(s)
}

fn format_pct(coverage: f64) -> String {
    format!("{:.2}%", coverage * 100.0)
}

/// Two-column text layout: names left-aligned and padded to the widest
/// label, coverage right-aligned, nested file rows indented four spaces,
/// and a trailing total line.
fn render_text(report: &Report, rows: &[Row], opts: &RenderOptions) -> Vec<String> {
    let cells: Vec<[String; 2]> = rows
        .iter()
        .map(|row| match row {
            Row::Package { name, coverage } => [name.clone(), format_pct(*coverage)],
            Row::File { name, coverage } => {
                let label = if opts.nest_files {
                    format!("    {name}")
                } else {
                    name.clone()
                };
                [label, format_pct(*coverage)]
            }
        })
        .collect();

    let mut lines = aligned_columns(&cells, |c0, w0, c1, w1| format!("{c0:<w0$} {c1:>w1$}"));
    lines.push(String::new());
    lines.push(format!(
        "Total Coverage: {}",
        format_pct(report.stats.coverage())
    ));
    lines
}

/// Markdown layout: a badge line encoding the total coverage, then a table
/// with GitHub column-alignment syntax. With nesting, each package cell
/// collapses its files into a `<details>` block.
fn render_markdown(report: &Report, rows: &[Row], opts: &RenderOptions) -> Vec<String> {
    let badge = badge_url(
        report.stats.coverage() * 100.0,
        opts.lower_threshold,
        opts.upper_threshold,
    );
    let mut lines = vec![format!("![Total Coverage]({badge})")];

    if rows.is_empty() {
        return lines;
    }
    lines.push(String::new());

    let mut cells = vec![
        ["Package".to_string(), "Coverage".to_string()],
        [":------".to_string(), "-------:".to_string()],
    ];
    if opts.nest_files {
        cells.extend(markdown_nested_cells(rows));
    } else {
        cells.extend(markdown_cells(rows));
    }

    lines.extend(aligned_columns(&cells, |c0, w0, c1, w1| {
        format!("| {c0:<w0$} | {c1:>w1$} |")
    }));
    lines
}

/// Pad two-column cells to uniform widths using the given line layout.
fn aligned_columns(
    cells: &[[String; 2]],
    layout: impl Fn(&str, usize, &str, usize) -> String,
) -> Vec<String> {
    let w0 = cells.iter().map(|c| c[0].len()).max().unwrap_or(0);
    let w1 = cells.iter().map(|c| c[1].len()).max().unwrap_or(0);
    cells
        .iter()
        .map(|c| layout(&c[0], w0, &c[1], w1))
        .collect()
}

/// Flat Markdown cells: one back-quoted label per row.
fn markdown_cells(rows: &[Row]) -> Vec<[String; 2]> {
    rows.iter()
        .map(|row| match row {
            Row::Package { name, coverage } | Row::File { name, coverage } => {
                [format!("`{name}`"), format_pct(*coverage)]
            }
        })
        .collect()
}

/// Collapse each package row and its following file rows into a single
/// table row whose first cell is a `<details>` block listing the files.
fn markdown_nested_cells(rows: &[Row]) -> Vec<[String; 2]> {
    let mut cells = Vec::new();
    let mut current: Option<(&str, f64)> = None;
    let mut files = String::new();

    for row in rows {
        match row {
            Row::Package { name, coverage } => {
                if let Some((pkg, cov)) = current.take() {
                    cells.push(details_cell(pkg, cov, &files));
                    files.clear();
                }
                current = Some((name.as_str(), *coverage));
            }
            Row::File { name, coverage } => {
                // Row building always emits the owning package row before
                // its files in nested mode.
                assert!(current.is_some(), "file row without owning package row");
                write!(
                    files,
                    "<tr><td>`{name}`</td><td>{}</td></tr>",
                    format_pct(*coverage)
                )
                .unwrap();
            }
        }
    }
    if let Some((pkg, cov)) = current {
        cells.push(details_cell(pkg, cov, &files));
    }

    cells
}

fn details_cell(pkg: &str, coverage: f64, files: &str) -> [String; 2] {
    [
        format!("<details><summary>`{pkg}`</summary><table>{files}</table></details>"),
        format_pct(coverage),
    ]
}

/// Shields.io badge URL encoding the total coverage percentage and a
/// threshold-based color.
fn badge_url(pct: f64, lower_threshold: f64, upper_threshold: f64) -> String {
    let color = if pct < lower_threshold {
        "critical"
    } else if pct < upper_threshold {
        "warning"
    } else {
        "success"
    };
    format!("https://img.shields.io/badge/Total%20Coverage-{pct:.2}%25-{color}?style=flat")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{NoFilter, PatternFilter};
    use crate::gocover::parse_profile;
    use crate::model::CoverageStore;
    use crate::report::build_report;

    /// Two packages, three files: pkg1 62.50% (file1 37.50%, file2 87.50%),
    /// pkg2 50.00% (file3 50.00%), total 58.33%.
    fn sample_report() -> Report {
        let input = "mode: count\n\
                     path/pkg1/file1.go:1.1,2.1 3 5\n\
                     path/pkg1/file1.go:4.1,5.1 5 0\n\
                     path/pkg1/file2.go:1.1,2.1 7 3\n\
                     path/pkg1/file2.go:4.1,5.1 1 0\n\
                     path/pkg2/file3.go:1.1,2.1 4 2\n\
                     path/pkg2/file3.go:4.1,5.1 4 0\n";
        let mut store = CoverageStore::new();
        parse_profile(input.as_bytes(), &mut store, &NoFilter).unwrap();
        build_report(&store)
    }

    fn exclude(patterns: &[&str]) -> PatternFilter {
        let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        PatternFilter::new(&patterns).unwrap()
    }

    #[test]
    fn test_text_nested() {
        let out = render(
            &sample_report(),
            Format::Text,
            &NoFilter,
            &RenderOptions::default(),
        );
        assert_eq!(
            out,
            "path/pkg1    62.50%\n\
             \x20   file1.go 37.50%\n\
             \x20   file2.go 87.50%\n\
             path/pkg2    50.00%\n\
             \x20   file3.go 50.00%\n\
             \n\
             Total Coverage: 58.33%"
        );
    }

    #[test]
    fn test_text_flat_with_filter_and_trim() {
        let opts = RenderOptions {
            nest_files: false,
            trim_package_prefix: "path/".to_string(),
            ..RenderOptions::default()
        };
        let out = render(
            &sample_report(),
            Format::Text,
            &exclude(&["*/pkg1"]),
            &opts,
        );
        assert_eq!(
            out,
            "pkg2          50.00%\n\
             pkg2/file3.go 50.00%\n\
             \n\
             Total Coverage: 58.33%"
        );
    }

    #[test]
    fn test_markdown_flat() {
        let opts = RenderOptions {
            nest_files: false,
            ..RenderOptions::default()
        };
        let out = render(&sample_report(), Format::Markdown, &NoFilter, &opts);
        assert_eq!(
            out,
            "![Total Coverage](https://img.shields.io/badge/Total%20Coverage-58.33%25-warning?style=flat)\n\
             \n\
             | Package              | Coverage |\n\
             | :------              | -------: |\n\
             | `path/pkg1`          |   62.50% |\n\
             | `path/pkg1/file1.go` |   37.50% |\n\
             | `path/pkg1/file2.go` |   87.50% |\n\
             | `path/pkg2`          |   50.00% |\n\
             | `path/pkg2/file3.go` |   50.00% |"
        );
    }

    #[test]
    fn test_markdown_nested() {
        let opts = RenderOptions {
            trim_package_prefix: "path/".to_string(),
            ..RenderOptions::default()
        };
        let out = render(&sample_report(), Format::Markdown, &NoFilter, &opts);

        assert!(out.starts_with(
            "![Total Coverage](https://img.shields.io/badge/Total%20Coverage-58.33%25-warning?style=flat)\n\n"
        ));
        assert!(out.contains("| Package"));
        assert!(out.contains("| :------"));
        assert!(out.contains("| -------: |"));
        assert!(out.contains(
            "<details><summary>`pkg1`</summary><table>\
             <tr><td>`file1.go`</td><td>37.50%</td></tr>\
             <tr><td>`file2.go`</td><td>87.50%</td></tr>\
             </table></details>"
        ));
        assert!(out.contains(
            "<details><summary>`pkg2`</summary><table>\
             <tr><td>`file3.go`</td><td>50.00%</td></tr>\
             </table></details>"
        ));
        assert!(out.contains("| 62.50% |"));
    }

    #[test]
    fn test_markdown_nested_hides_filtered_file() {
        let out = render(
            &sample_report(),
            Format::Markdown,
            &exclude(&["**/file1.go"]),
            &RenderOptions::default(),
        );
        assert!(!out.contains("file1.go"));
        assert!(out.contains("<tr><td>`file2.go`</td><td>87.50%</td></tr>"));
    }

    #[test]
    fn test_empty_report_renders_empty() {
        // A profile with only a mode directive produces no packages, and an
        // empty report renders as the empty string in every format.
        let mut store = CoverageStore::new();
        parse_profile(b"mode: set\n".as_slice(), &mut store, &NoFilter).unwrap();
        let report = build_report(&store);

        let opts = RenderOptions::default();
        assert_eq!(render(&report, Format::Text, &NoFilter, &opts), "");
        assert_eq!(render(&report, Format::Markdown, &NoFilter, &opts), "");
    }

    #[test]
    fn test_markdown_all_rows_filtered_keeps_badge() {
        let out = render(
            &sample_report(),
            Format::Markdown,
            &exclude(&["*"]),
            &RenderOptions::default(),
        );
        assert_eq!(
            out,
            "![Total Coverage](https://img.shields.io/badge/Total%20Coverage-58.33%25-warning?style=flat)"
        );
    }

    #[test]
    fn test_output_filter_keeps_totals() {
        // Hiding pkg2 removes its rows but never recomputes the totals.
        let out = render(
            &sample_report(),
            Format::Text,
            &exclude(&["*/pkg2"]),
            &RenderOptions::default(),
        );
        assert!(!out.contains("pkg2"));
        assert!(out.ends_with("Total Coverage: 58.33%"));
    }

    #[test]
    fn test_package_row_kept_for_visible_files() {
        // The package path itself is excluded, but nesting keeps the row
        // because it still has visible files.
        let out = render(
            &sample_report(),
            Format::Text,
            &exclude(&["path/pkg2", "!path/pkg2/file3.go"]),
            &RenderOptions::default(),
        );
        assert!(out.contains("path/pkg2"));
        assert!(out.contains("file3.go"));
    }

    #[test]
    #[should_panic(expected = "file row without owning package row")]
    fn test_nested_cells_require_package_row() {
        markdown_nested_cells(&[Row::File {
            name: "file1.go".to_string(),
            coverage: 0.5,
        }]);
    }

    #[test]
    fn test_badge_url_thresholds() {
        let cases = [
            (84.90, 70.0, 90.0, "warning"),
            (60.0, 70.0, 90.0, "critical"),
            (90.0, 70.0, 90.0, "success"),
            (70.0, 70.0, 90.0, "warning"),
        ];
        for (pct, lower, upper, color) in cases {
            let url = badge_url(pct, lower, upper);
            assert_eq!(
                url,
                format!(
                    "https://img.shields.io/badge/Total%20Coverage-{pct:.2}%25-{color}?style=flat"
                )
            );
        }
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("txt".parse::<Format>().unwrap(), Format::Text);
        assert_eq!("md".parse::<Format>().unwrap(), Format::Markdown);
        assert!("html".parse::<Format>().is_err());
    }
}
