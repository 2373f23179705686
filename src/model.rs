//! Uniform in-memory representation of coverage profile data. The parser
//! fills a `CoverageStore`, which the aggregator then folds into a report
//! tree.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{CovsumError, Result};

/// Compute a coverage rate, returning 0.0 when the total is zero.
#[must_use]
pub fn rate(covered: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64
    }
}

/// A line/column position in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileLocation {
    pub line: u32,
    pub col: u32,
}

/// The span of a coverage block. Blocks are the atomic reporting unit of a
/// profile and are unique per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Block {
    pub start: FileLocation,
    pub end: FileLocation,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{},{}.{}",
            self.start.line, self.start.col, self.end.line, self.end.col
        )
    }
}

impl FromStr for Block {
    type Err = CovsumError;

    /// Parse the `<startLine>.<startCol>,<endLine>.<endCol>` span notation.
    fn from_str(s: &str) -> Result<Self> {
        let parse = || -> Option<Block> {
            let (start, end) = s.split_once(',')?;
            let (start_line, start_col) = start.split_once('.')?;
            let (end_line, end_col) = end.split_once('.')?;
            Some(Block {
                start: FileLocation {
                    line: start_line.parse().ok()?,
                    col: start_col.parse().ok()?,
                },
                end: FileLocation {
                    line: end_line.parse().ok()?,
                    col: end_col.parse().ok()?,
                },
            })
        };
        parse().ok_or_else(|| CovsumError::BlockFormat(s.to_string()))
    }
}

/// Raw coverage counters for a block or an aggregated node. The percentage
/// is always derived from the counts, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub num_statements: u64,
    pub hit_count: u64,
}

impl Stats {
    #[must_use]
    pub fn coverage(&self) -> f64 {
        rate(self.hit_count, self.num_statements)
    }
}

/// Accumulated per-file, per-block statistics from one or more profiles.
#[derive(Debug, Clone, Default)]
pub struct CoverageStore {
    files: HashMap<String, HashMap<Block, Stats>>,
}

impl CoverageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation of a block. A repeated observation of the same
    /// (file, block) pair adds its hit count to the stored entry; the
    /// statement count is fixed by the first observation.
    pub fn accumulate(&mut self, file: &str, block: Block, stats: Stats) {
        self.files
            .entry(file.to_string())
            .or_default()
            .entry(block)
            .and_modify(|existing| existing.hit_count += stats.hit_count)
            .or_insert(stats);
    }

    /// Iterate over all files and their block statistics.
    pub fn files(&self) -> impl Iterator<Item = (&str, &HashMap<Block, Stats>)> {
        self.files
            .iter()
            .map(|(path, blocks)| (path.as_str(), blocks))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
