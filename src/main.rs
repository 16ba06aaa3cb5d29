//! benchplot - render storage benchmark comparison charts.
//!
//! Scrapes latency and throughput figures from the plain-text output of the
//! SPDK, io_uring, XRP and read() benchmark runs and draws the comparison
//! charts as SVG files.

mod display;
mod extract;
mod figures;
mod logging;
mod render;
mod style;
mod system;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use extract::ExtractError;
use figures::Workspace;
use logging::SeriesLogger;
use std::path::PathBuf;

/// Render benchmark comparison charts from benchmark logs
#[derive(Parser, Debug)]
#[command(name = "benchplot")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Figure set to render (default: all)
    #[command(subcommand)]
    figures: Option<FigureSet>,

    /// Directory holding the benchmark logs
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory the charts are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Write every extracted series to this file (JSON Lines)
    #[arg(short = 'l', long)]
    series_log: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq, Default)]
enum FigureSet {
    /// Figure 9: latency and throughput of spdk, io_uring, read and xrp
    Figure9,
    /// SPDK vs. XRP scalability and latency/throughput charts
    Spdk,
    /// Every figure set
    #[default]
    All,
}

/// Result of a run: charts written and series records logged
#[derive(Debug, Default)]
struct RunReport {
    charts: Vec<PathBuf>,
    records_logged: u64,
}

fn run(args: &Args) -> Result<RunReport> {
    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create output directory: {}", args.output_dir.display()))?;

    let mut series_log = args.series_log.as_ref().map(SeriesLogger::new).transpose()?;
    let mut ws = Workspace::new(args.data_dir.clone(), args.output_dir.clone(), series_log.as_mut());

    eprintln!("Loading logs from: {}", ws.data_dir().display());
    eprintln!("Writing charts to: {}", ws.output_dir().display());

    let set = args.figures.unwrap_or_default();
    let mut generated = Vec::new();
    if matches!(set, FigureSet::Figure9 | FigureSet::All) {
        eprintln!("\nfigure-9");
        generated.extend(figures::figure9::render_all(&mut ws)?);
    }
    if matches!(set, FigureSet::Spdk | FigureSet::All) {
        eprintln!("\nspdk");
        generated.extend(figures::spdk::render_all(&mut ws)?);
    }

    let mut records_logged = 0;
    if let Some(log) = series_log.as_mut() {
        log.flush()?;
        records_logged = log.records_written();
    }
    Ok(RunReport {
        charts: generated,
        records_logged,
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    let report = match run(&args) {
        Ok(report) => report,
        Err(e) => {
            if e.downcast_ref::<ExtractError>().is_some_and(ExtractError::is_malformed) {
                eprintln!("Error: a benchmark log does not have the expected summary format");
            }
            return Err(e);
        }
    };

    eprintln!("\nGenerated {} charts", report.charts.len());
    if let Some(ref log_path) = args.series_log {
        eprintln!("Series logged to: {} ({} records)", log_path.display(), report.records_logged);
    }
    Ok(())
}
