//! Parser for Go's `-coverprofile` format.
//!
//! Reference: https://go.dev/blog/cover
//!
//! Format:
//!   mode: set|count|atomic
//!   <file>:<startLine>.<startCol>,<endLine>.<endCol> <numStatements> <hitCount>
//!
//! Each line describes a basic block with its statement count and how many
//! times it was executed. Lines fold directly into a [`CoverageStore`];
//! blocks observed more than once (merged runs) add their hit counts.
use std::io::BufRead;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{CovsumError, Result};
use crate::filter::PathFilter;
use crate::model::{Block, CoverageStore, FileLocation, Stats};

/// Position data that follows the file path: six integer fields. The field
/// shapes are kept loose so that non-numeric data in a numeric position is
/// reported as such rather than as a general format mismatch.
static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^.,\s]+)\.([^.,\s]+),([^.,\s]+)\.([^.,\s]+) (\S+) (\S+)$").unwrap()
});

/// One parsed, non-directive profile line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileLine {
    pub path: String,
    pub block: Block,
    pub stats: Stats,
}

/// Parse a single profile line.
///
/// The path must not itself contain a colon; the position data must consist
/// of exactly six non-negative integers.
pub fn parse_line(line: &str) -> Result<ProfileLine> {
    let fail = |reason: &'static str| CovsumError::Format {
        line: line.to_string(),
        reason,
    };

    let mut parts = line.split(':');
    let (path, pos) = match (parts.next(), parts.next(), parts.next()) {
        (Some(path), Some(pos), None) => (path, pos),
        _ => return Err(fail("wrong format")),
    };

    let caps = BLOCK_RE.captures(pos).ok_or_else(|| fail("wrong format"))?;
    let coord = |i: usize| caps[i].parse::<u32>().map_err(|_| fail("expected integer"));
    let count = |i: usize| caps[i].parse::<u64>().map_err(|_| fail("expected integer"));

    Ok(ProfileLine {
        path: path.to_string(),
        block: Block {
            start: FileLocation {
                line: coord(1)?,
                col: coord(2)?,
            },
            end: FileLocation {
                line: coord(3)?,
                col: coord(4)?,
            },
        },
        stats: Stats {
            num_statements: count(5)?,
            hit_count: count(6)?,
        },
    })
}

/// Read a profile stream line by line, folding block observations into the
/// store. Lines beginning with `mode:` are directives and are skipped, no
/// matter how many appear. Paths excluded by `filter` are discarded before
/// accumulation and never influence the rollup.
///
/// The first malformed line or read failure aborts the input; there is no
/// partial-line recovery.
pub fn parse_profile<R: BufRead>(
    reader: R,
    store: &mut CoverageStore,
    filter: &dyn PathFilter,
) -> Result<()> {
    for line in reader.lines() {
        let line = line.map_err(CovsumError::Scan)?;
        let line = line.trim();
        if line.is_empty() || line.starts_with("mode:") {
            continue;
        }

        let parsed = parse_line(line)?;
        if filter.is_excluded(&parsed.path) {
            continue;
        }
        store.accumulate(&parsed.path, parsed.block, parsed.stats);
    }

    Ok(())
}
