use std::path::PathBuf;

use tempfile::TempDir;

use covsum::cli::{Output, ReportOptions, Thresholds};
use covsum::render::Format;

/// Write a coverage profile into a fresh temp directory, returning the dir
/// handle and profile path. The caller must hold onto `TempDir` to keep the
/// file alive.
pub fn write_profile(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coverage.out");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

/// Report options for the given profiles: nested text to stdout, default
/// thresholds, no filters.
pub fn report_options(files: Vec<PathBuf>) -> ReportOptions {
    ReportOptions {
        files,
        filter: vec![],
        filter_output: vec![],
        filter_output_file: None,
        nest_files: true,
        outputs: vec![Output {
            format: Format::Text,
            filename: None,
        }],
        thresholds: Thresholds {
            lower: 50.0,
            upper: 75.0,
        },
        trim_package_prefix: String::new(),
    }
}

/// Two packages, three files: pkg1 62.50%, pkg2 50.00%, total 58.33%.
pub const SAMPLE_PROFILE: &str = "mode: count\n\
    path/pkg1/file1.go:1.1,2.1 3 5\n\
    path/pkg1/file1.go:4.1,5.1 5 0\n\
    path/pkg1/file2.go:1.1,2.1 7 3\n\
    path/pkg1/file2.go:4.1,5.1 1 0\n\
    path/pkg2/file3.go:1.1,2.1 4 2\n\
    path/pkg2/file3.go:4.1,5.1 4 0\n";
