//! Figure 9: latency and throughput of the four storage paths.
//!
//! Logs are read from `<system>-3.txt` and `<system>-6.txt` (thread sweeps
//! over 3- and 6-level lookups) and `<system>-chain.txt` (I/O chain length
//! sweep). Each log holds one summary block per point on the x axis.

use super::{int_domain, Workspace};
use crate::display::throughput_summary;
use crate::extract::{Series, P99_LATENCY, THROUGHPUT};
use crate::render::{Bounds, ChartSpec, PlotSeries};
use crate::style::{ChartStyle, LegendPosition, Scale};
use crate::system::System;
use anyhow::Result;
use std::path::PathBuf;

/// Legend order of the latency chart
const LATENCY_ORDER: [System; 4] = System::ALL;
/// Legend order of the throughput charts
const THROUGHPUT_ORDER: [System; 4] = [System::Spdk, System::Xrp, System::Read, System::IoUring];

pub fn threads() -> Series {
    int_domain(1..=12)
}

pub fn chain_lengths() -> Series {
    int_domain(1..=6)
}

pub fn render_all(ws: &mut Workspace<'_>) -> Result<Vec<PathBuf>> {
    let style = ChartStyle::figure9();
    Ok(vec![
        latency_vs_threads(ws, &style)?,
        throughput_vs_threads(ws, &style, "figure-9-b", "3")?,
        throughput_vs_threads(ws, &style, "figure-9-c", "6")?,
        throughput_vs_chain_length(ws, &style)?,
    ])
}

/// 99th percentile latency over thread count, 3-level lookups
pub fn latency_vs_threads(ws: &mut Workspace<'_>, style: &ChartStyle) -> Result<PathBuf> {
    let name = "figure-9-a";
    let mut spec = ChartSpec::new(name, "Threads", "99th Latency (μs)")
        .x_bounds(Bounds::fixed(0.5, 12.5))
        .x_tick_step(1.0)
        .y_scale(Scale::Log)
        .legend(LegendPosition::UpperLeft);

    for sys in LATENCY_ORDER {
        let latency = ws.load_series(name, sys.label(), &sys.log_name("3"), P99_LATENCY)?;
        spec = spec.series(PlotSeries::new(sys.label(), threads(), latency, sys.color(), sys.marker()));
    }

    ws.render(&spec, style)
}

/// Average throughput over thread count for one lookup depth
pub fn throughput_vs_threads(ws: &mut Workspace<'_>, style: &ChartStyle, name: &str, variant: &str) -> Result<PathBuf> {
    let mut spec = ChartSpec::new(name, "Threads", "Throughput (ops/sec)")
        .y_bounds(Bounds::from_zero())
        .x_tick_step(1.0)
        .legend(LegendPosition::LowerRight);

    for sys in THROUGHPUT_ORDER {
        let throughput = ws.load_series(name, sys.label(), &sys.log_name(variant), THROUGHPUT)?;
        eprintln!("  {}", throughput_summary(sys.label(), &throughput));
        spec = spec.series(PlotSeries::new(sys.label(), threads(), throughput, sys.color(), sys.marker()));
    }

    ws.render(&spec, style)
}

/// Average throughput over the number of dependent I/Os per request
pub fn throughput_vs_chain_length(ws: &mut Workspace<'_>, style: &ChartStyle) -> Result<PathBuf> {
    let name = "figure-9-d";
    let mut spec = ChartSpec::new(name, "I/O Chain Length", "Throughput (ops/sec)")
        .y_bounds(Bounds::from_zero())
        .x_tick_step(1.0);

    for sys in THROUGHPUT_ORDER {
        let throughput = ws.load_series(name, sys.label(), &sys.log_name("chain"), THROUGHPUT)?;
        spec = spec.series(PlotSeries::new(sys.label(), chain_lengths(), throughput, sys.color(), sys.marker()));
    }

    ws.render(&spec, style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figures::testutil::write_sweep;
    use crate::render::RenderError;
    use std::fs;

    fn data_dir_with(variants: &[(&str, u32)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for sys in System::ALL {
            for (variant, runs) in variants {
                write_sweep(dir.path(), &sys.log_name(variant), *runs);
            }
        }
        dir
    }

    #[test]
    fn renders_all_four_charts() {
        let data = data_dir_with(&[("3", 12), ("6", 12), ("chain", 6)]);
        let out = tempfile::tempdir().unwrap();
        let mut ws = Workspace::new(data.path().to_path_buf(), out.path().to_path_buf(), None);

        let written = render_all(&mut ws).unwrap();

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["figure-9-a.svg", "figure-9-b.svg", "figure-9-c.svg", "figure-9-d.svg"]);
        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 4);
    }

    #[test]
    fn short_sweep_is_a_length_mismatch() {
        let data = data_dir_with(&[("3", 11)]);
        let out = tempfile::tempdir().unwrap();
        let mut ws = Workspace::new(data.path().to_path_buf(), out.path().to_path_buf(), None);

        let err = latency_vs_threads(&mut ws, &ChartStyle::figure9()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RenderError>(),
            Some(RenderError::LengthMismatch { x: 12, y: 11, .. })
        ));
        assert!(!out.path().join("figure-9-a.svg").exists());
    }

    #[test]
    fn zero_latency_fails_on_the_log_axis() {
        let data = data_dir_with(&[("3", 12)]);
        let mut contents = fs::read_to_string(data.path().join("read-3.txt")).unwrap();
        contents = contents.replacen("99%   latency: 12.000000 us", "99%   latency: 0.000000 us", 1);
        fs::write(data.path().join("read-3.txt"), contents).unwrap();
        let out = tempfile::tempdir().unwrap();
        let mut ws = Workspace::new(data.path().to_path_buf(), out.path().to_path_buf(), None);

        let err = latency_vs_threads(&mut ws, &ChartStyle::figure9()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RenderError>(),
            Some(RenderError::NonPositiveOnLogAxis { .. })
        ));
    }

    #[test]
    fn missing_system_log_aborts() {
        let data = data_dir_with(&[("chain", 6)]);
        fs::remove_file(data.path().join("io_uring-chain.txt")).unwrap();
        let out = tempfile::tempdir().unwrap();
        let mut ws = Workspace::new(data.path().to_path_buf(), out.path().to_path_buf(), None);

        assert!(throughput_vs_chain_length(&mut ws, &ChartStyle::figure9()).is_err());
        assert!(!out.path().join("figure-9-d.svg").exists());
    }
}
