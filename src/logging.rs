//! JSON Lines log of every series extracted during a run.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// One extracted series with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRecord {
    pub timestamp: DateTime<Utc>,
    /// Chart the series was loaded for, e.g. `figure-9-b`
    pub chart: String,
    pub label: String,
    pub source: PathBuf,
    pub prefix: String,
    pub index: usize,
    pub values: Vec<f64>,
}

/// Logger for writing series records to a JSON Lines file
pub struct SeriesLogger {
    writer: BufWriter<File>,
    records_written: u64,
}

impl SeriesLogger {
    /// Create a new logger, truncating any existing file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path.as_ref())
            .with_context(|| format!("Failed to create series log: {}", path.as_ref().display()))?;

        Ok(Self {
            writer: BufWriter::new(file),
            records_written: 0,
        })
    }

    pub fn log(&mut self, record: &SeriesRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        writeln!(self.writer, "{}", json)?;
        self.records_written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }
}

impl Drop for SeriesLogger {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
