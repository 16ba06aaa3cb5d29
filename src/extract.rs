//! Series extraction from plain-text benchmark logs.
//!
//! Benchmark runs print one summary block per run, e.g.
//!
//! ```text
//! 95%   latency: 14.210000 us
//! 99%   latency: 17.030000 us
//! 99.9% latency: 29.440000 us
//! Average throughput: 697046.975800 op/s latency: 11.470000 usec
//! ```
//!
//! A field is addressed by the literal line prefix and the zero-based index of
//! the whitespace-separated token holding the number.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::num::ParseFloatError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Ordered values, one per matching log line, in file order
pub type Series = Vec<f64>;

/// A numeric field in a benchmark log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogField {
    pub prefix: &'static str,
    pub index: usize,
}

impl LogField {
    pub const fn new(prefix: &'static str, index: usize) -> Self {
        Self { prefix, index }
    }
}

/// `Average throughput: <ops> op/s latency: <avg> usec`
pub const THROUGHPUT: LogField = LogField::new("Average throughput:", 2);
pub const AVG_LATENCY: LogField = LogField::new("Average throughput:", 5);
pub const P95_LATENCY: LogField = LogField::new("95%   latency:", 2);
pub const P99_LATENCY: LogField = LogField::new("99%   latency:", 2);
pub const P999_LATENCY: LogField = LogField::new("99.9% latency:", 2);

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read log file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed log line {}:{line} (prefix {prefix:?}, token {index}): {reason}", .path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        prefix: String,
        index: usize,
        #[source]
        reason: MalformedReason,
    },
}

#[derive(Debug, Error)]
pub enum MalformedReason {
    #[error("line has only {found} tokens")]
    MissingToken { found: usize },

    #[error("token {token:?} is not a number")]
    InvalidNumber {
        token: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("token {token:?} is not a finite number")]
    NonFinite { token: String },
}

impl ExtractError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, ExtractError::Malformed { .. })
    }
}

/// Collect the value at token `index` of every line starting with `prefix`.
pub fn extract_series<P: AsRef<Path>>(path: P, prefix: &str, index: usize) -> Result<Series, ExtractError> {
    let mut series = scan(path.as_ref(), &[(prefix, index)])?;
    Ok(series.pop().unwrap_or_default())
}

/// Collect several fields in one pass over the file.
///
/// The returned series line up with `fields`. Two fields may share a prefix,
/// in which case both are read from the same lines.
pub fn extract_fields<P: AsRef<Path>>(path: P, fields: &[LogField]) -> Result<Vec<Series>, ExtractError> {
    let wanted: Vec<(&str, usize)> = fields.iter().map(|f| (f.prefix, f.index)).collect();
    scan(path.as_ref(), &wanted)
}

fn scan(path: &Path, fields: &[(&str, usize)]) -> Result<Vec<Series>, ExtractError> {
    let io_err = |source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    let reader = BufReader::new(file);
    let mut out: Vec<Series> = vec![Vec::new(); fields.len()];

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(io_err)?;

        for (slot, &(prefix, index)) in fields.iter().enumerate() {
            if !line.starts_with(prefix) {
                continue;
            }
            let value = parse_token(&line, index).map_err(|reason| ExtractError::Malformed {
                path: path.to_path_buf(),
                line: line_num + 1,
                prefix: prefix.to_string(),
                index,
                reason,
            })?;
            out[slot].push(value);
        }
    }

    Ok(out)
}

fn parse_token(line: &str, index: usize) -> Result<f64, MalformedReason> {
    let token = line
        .split_whitespace()
        .nth(index)
        .ok_or_else(|| MalformedReason::MissingToken {
            found: line.split_whitespace().count(),
        })?;

    let value: f64 = token.parse().map_err(|source| MalformedReason::InvalidNumber {
        token: token.to_string(),
        source,
    })?;
    if !value.is_finite() {
        return Err(MalformedReason::NonFinite {
            token: token.to_string(),
        });
    }
    Ok(value)
}
