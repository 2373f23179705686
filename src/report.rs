//! Aggregation of accumulated block statistics into a three-level rollup
//! tree: total → package → file.

use std::collections::HashMap;

use crate::model::{CoverageStore, Stats};

/// Coverage rollup for a single file.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub stats: Stats,
    /// Base filename without the directory portion.
    pub name: String,
    /// The owning package path.
    pub package: String,
}

impl File {
    /// The slash-joined path of the file, as tested by output filters.
    #[must_use]
    pub fn abs_path(&self) -> String {
        match self.package.as_str() {
            "." => self.name.clone(),
            "/" => format!("/{}", self.name),
            pkg => format!("{pkg}/{}", self.name),
        }
    }
}

/// Coverage rollup for a package (a directory of files).
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub stats: Stats,
    pub name: String,
    /// Files keyed by base filename.
    pub files: HashMap<String, File>,
}

/// The complete coverage rollup across all packages. Map iteration order is
/// incidental; display ordering is imposed at render time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub stats: Stats,
    pub packages: HashMap<String, Package>,
}

/// POSIX dirname: the directory portion of a slash-separated path. Returns
/// `.` when the path has no directory and `/` for names directly under the
/// root.
#[must_use]
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        None => ".",
        Some(0) => "/",
        Some(i) => &path[..i],
    }
}

/// POSIX basename: the final component of a slash-separated path.
#[must_use]
pub fn base_name(path: &str) -> &str {
    match path.rfind('/') {
        None => path,
        Some(i) => &path[i + 1..],
    }
}

/// Build the report tree from the store.
///
/// Per file, a statement counts as hit when its block was executed at least
/// once; repeat executions do not weight the rollup. File stats add into the
/// owning package, package stats into the total, and every percentage is
/// derived from these summed counts on demand. Summation is commutative, so
/// store iteration order never affects the result.
#[must_use]
pub fn build_report(store: &CoverageStore) -> Report {
    let mut report = Report::default();

    for (path, blocks) in store.files() {
        let mut stats = Stats::default();
        for block_stats in blocks.values() {
            stats.num_statements += block_stats.num_statements;
            if block_stats.hit_count > 0 {
                stats.hit_count += block_stats.num_statements;
            }
        }

        let package = parent_dir(path);
        let pkg = report
            .packages
            .entry(package.to_string())
            .or_insert_with(|| Package {
                stats: Stats::default(),
                name: package.to_string(),
                files: HashMap::new(),
            });
        pkg.stats.num_statements += stats.num_statements;
        pkg.stats.hit_count += stats.hit_count;

        let name = base_name(path);
        pkg.files.insert(
            name.to_string(),
            File {
                stats,
                name: name.to_string(),
                package: package.to_string(),
            },
        );

        report.stats.num_statements += stats.num_statements;
        report.stats.hit_count += stats.hit_count;
    }

    report
}
