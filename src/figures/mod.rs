//! Figure sets rendered from the benchmark logs.
//!
//! Each chart follows the same steps: load its series from the data
//! directory, build a [`ChartSpec`], render it, and move on. Nothing is kept
//! between charts except the optional series log.

pub mod figure9;
pub mod spdk;

use crate::extract::{extract_fields, extract_series, LogField, Series};
use crate::logging::{SeriesLogger, SeriesRecord};
use crate::render::{render_chart, ChartSpec};
use crate::style::ChartStyle;
use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};

/// Where charts read their logs from and write their images to
pub struct Workspace<'a> {
    data_dir: PathBuf,
    output_dir: PathBuf,
    series_log: Option<&'a mut SeriesLogger>,
}

impl<'a> Workspace<'a> {
    pub fn new(data_dir: PathBuf, output_dir: PathBuf, series_log: Option<&'a mut SeriesLogger>) -> Self {
        Self {
            data_dir,
            output_dir,
            series_log,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Load one field from a log in the data directory
    pub fn load_series(&mut self, chart: &str, label: &str, file: &str, field: LogField) -> Result<Series> {
        let path = self.data_dir.join(file);
        let series = extract_series(&path, field.prefix, field.index)
            .with_context(|| format!("Failed to load {} for {}", label, chart))?;
        self.record(chart, label, &path, field, &series)?;
        Ok(series)
    }

    /// Load several fields from a log in one pass
    pub fn load_fields(&mut self, chart: &str, label: &str, file: &str, fields: &[LogField]) -> Result<Vec<Series>> {
        let path = self.data_dir.join(file);
        let series = extract_fields(&path, fields)
            .with_context(|| format!("Failed to load {} for {}", label, chart))?;
        for (field, values) in fields.iter().zip(&series) {
            self.record(chart, label, &path, *field, values)?;
        }
        Ok(series)
    }

    /// Render a chart into the output directory
    pub fn render(&self, spec: &ChartSpec, style: &ChartStyle) -> Result<PathBuf> {
        let path = render_chart(spec, style, &self.output_dir)
            .with_context(|| format!("Failed to render {}", spec.name))?;
        eprintln!("  wrote {}", path.display());
        Ok(path)
    }

    fn record(&mut self, chart: &str, label: &str, source: &Path, field: LogField, values: &[f64]) -> Result<()> {
        let Some(log) = self.series_log.as_deref_mut() else {
            return Ok(());
        };
        log.log(&SeriesRecord {
            timestamp: Utc::now(),
            chart: chart.to_string(),
            label: label.to_string(),
            source: source.to_path_buf(),
            prefix: field.prefix.to_string(),
            index: field.index,
            values: values.to_vec(),
        })
    }
}

/// Evenly spaced integer x values, e.g. thread counts
pub fn int_domain(range: std::ops::RangeInclusive<u32>) -> Series {
    range.map(f64::from).collect()
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::fs;
    use std::path::Path;

    /// A benchmark summary block as the db tools print it
    pub fn run_block(p95: f64, p99: f64, p999: f64, ops: f64, avg: f64) -> String {
        format!(
            "95%   latency: {p95:.6} us\n\
             99%   latency: {p99:.6} us\n\
             99.9% latency: {p999:.6} us\n\
             Average throughput: {ops:.6} op/s latency: {avg:.6} usec\n"
        )
    }

    /// Write a log with `runs` summary blocks whose values grow with the run
    pub fn write_sweep(dir: &Path, name: &str, runs: u32) {
        let mut contents = String::from("Loading database...\n");
        for run in 1..=runs {
            let r = f64::from(run);
            contents.push_str(&format!("Running {run} threads\n"));
            contents.push_str(&run_block(10.0 * r, 12.0 * r, 20.0 * r, 50_000.0 * r, 8.0 * r));
        }
        fs::write(dir.join(name), contents).unwrap();
    }
}
