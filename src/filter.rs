//! Path-based exclusion oracles.
//!
//! Filtering happens at two points in the pipeline: a calculation filter
//! applied while folding profile lines into the store (changes the numbers),
//! and an output filter applied while building display rows (changes only
//! which rows are shown). Both consult the same oracle interface.

use std::collections::BTreeSet;
use std::io::BufRead;

use anyhow::{Context, Result};
use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::report::parent_dir;

/// Decides whether a path is excluded.
pub trait PathFilter {
    fn is_excluded(&self, path: &str) -> bool;
}

/// A filter that excludes nothing.
pub struct NoFilter;

impl PathFilter for NoFilter {
    fn is_excluded(&self, _path: &str) -> bool {
        false
    }
}

/// Gitignore-style pattern filter: a path matching any pattern is excluded,
/// `!` patterns re-include, and the last matching pattern wins.
pub struct PatternFilter {
    matcher: Gitignore,
}

impl PatternFilter {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GitignoreBuilder::new("");
        for pattern in patterns {
            builder
                .add_line(None, pattern)
                .with_context(|| format!("invalid filter pattern '{pattern}'"))?;
        }
        let matcher = builder.build().context("failed compiling filter patterns")?;
        Ok(Self { matcher })
    }
}

impl PathFilter for PatternFilter {
    fn is_excluded(&self, path: &str) -> bool {
        // The matcher only accepts paths relative to its root; profile paths
        // are module-relative, but strip a leading slash just in case.
        let path = path.trim_start_matches('/');
        self.matcher
            .matched_path_or_any_parents(path, false)
            .is_ignore()
    }
}

/// Convert a newline-separated listing of tested files into output-filter
/// patterns: exclude everything, then re-include what the listing names.
///
/// A path ending in `_test.go` re-includes its entire package, since the
/// file under test cannot be determined reliably from the test file name
/// alone. Other `.go` paths outside such packages are re-included
/// individually. Anything else in the listing is ignored.
pub fn patterns_from_listing<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut packages = BTreeSet::new();
    let mut files = Vec::new();

    for line in reader.lines() {
        let line = line.context("failed reading filter listing")?;
        let line = line.trim();
        if line.ends_with("_test.go") {
            packages.insert(parent_dir(line).to_string());
        } else if line.ends_with(".go") {
            files.push(line.to_string());
        }
    }

    let mut patterns = vec!["*".to_string()];
    for file in &files {
        if !packages.contains(parent_dir(file)) {
            patterns.push(format!("!{file}"));
        }
    }
    for pkg in &packages {
        patterns.push(format!("!{pkg}"));
        patterns.push(format!("!{pkg}/**"));
    }

    Ok(patterns)
}
