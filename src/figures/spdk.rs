//! SPDK vs. XRP: thread scalability and latency under load.

use super::{int_domain, Workspace};
use crate::display::{format_latency, format_ops, peak};
use crate::extract::{Series, AVG_LATENCY, P95_LATENCY, P999_LATENCY, P99_LATENCY, THROUGHPUT};
use crate::render::{Bounds, ChartSpec, PlotSeries, ReferenceLine};
use crate::style::{ChartStyle, LegendPosition, LineKind, Marker, Scale};
use crate::system::{CYCLE_BLUE, CYCLE_ORANGE, MPL_BLUE, MPL_RED};
use anyhow::{anyhow, Result};
use plotters::style::RGBColor;
use std::path::PathBuf;

/// Measured throughput (op/s) at 6..=24 threads
const SPDK_SCALABILITY: [f64; 19] = [
    697046.9758, 665379.6229, 625176.7638, 604199.9895, 551595.1093, 506739.3245, 461518.7572,
    441649.0087, 405917.9065, 359946.3352, 387235.9762, 315002.0367, 312038.8661, 285033.2001,
    263546.7527, 258897.8283, 223314.2115, 200517.0509, 190620.779,
];
const XRP_SCALABILITY: [f64; 19] = [
    708964.9917, 706577.358, 703521.6036, 700908.1714, 698775.5837, 698436.3271, 699695.8742,
    695898.0707, 698472.3006, 696774.4961, 696896.8216, 697747.3257, 699138.5369, 696613.8805,
    697182.465, 700964.0176, 702165.3548, 698442.4334, 700138.5618,
];

/// Peak IOPS of the device under test
pub const DEVICE_LIMIT_OPS: f64 = 714285.714;

const SPDK_LAT_THRU_LOG: &str = "spdk-new-lat-thru.out";
const XRP_LAT_THRU_LOG: &str = "ebpf-lat-thru.out";

pub fn scalability_threads() -> Series {
    int_domain(6..=24)
}

pub fn render_all(ws: &mut Workspace<'_>) -> Result<Vec<PathBuf>> {
    let style = ChartStyle::spdk();
    Ok(vec![
        scalability(ws, &style)?,
        latency_vs_throughput(ws, &style)?,
        tail_latency_vs_throughput(ws, &style)?,
    ])
}

/// Throughput over thread count against the device limit
pub fn scalability(ws: &mut Workspace<'_>, style: &ChartStyle) -> Result<PathBuf> {
    let spec = ChartSpec::new("spdk-scalability", "Thread Number", "Throughput (op/s)")
        .x_bounds(Bounds::fixed(5.1, 24.9))
        .y_bounds(Bounds::fixed(0.0, 750000.0))
        .x_tick_step(1.0)
        .legend(LegendPosition::LowerLeft)
        .series(PlotSeries::new(
            "SPDK",
            scalability_threads(),
            SPDK_SCALABILITY.to_vec(),
            CYCLE_BLUE,
            Marker::Point,
        ))
        .series(PlotSeries::new(
            "XRP",
            scalability_threads(),
            XRP_SCALABILITY.to_vec(),
            CYCLE_ORANGE,
            Marker::TriangleUp,
        ))
        .reference_line(ReferenceLine {
            y: DEVICE_LIMIT_OPS,
            color: MPL_RED,
            line: LineKind::Dashed,
        });

    ws.render(&spec, style)
}

/// Latency/throughput sweep of one system, read from a single log
#[derive(Debug, Clone, PartialEq)]
pub struct LatThru {
    pub throughput: Series,
    pub avg: Series,
    pub p95: Series,
    pub p99: Series,
    pub p999: Series,
}

impl LatThru {
    pub fn load(ws: &mut Workspace<'_>, chart: &str, label: &str, file: &str) -> Result<Self> {
        let fields = [THROUGHPUT, AVG_LATENCY, P95_LATENCY, P99_LATENCY, P999_LATENCY];
        let series = ws.load_fields(chart, label, file, &fields)?;
        let [throughput, avg, p95, p99, p999]: [Series; 5] = series
            .try_into()
            .map_err(|_| anyhow!("expected {} series from {}", fields.len(), file))?;
        Ok(Self {
            throughput,
            avg,
            p95,
            p99,
            p999,
        })
    }

    fn report(&self, label: &str) {
        if let Some(ops) = peak(&self.throughput) {
            let best_avg = self.avg.iter().copied().reduce(f64::min).unwrap_or(f64::NAN);
            eprintln!(
                "  {}: peak {} op/s, lowest avg latency {}",
                label,
                format_ops(ops),
                format_latency(best_avg)
            );
        }
    }
}

/// One system's curves on a latency/throughput chart
struct Sweep {
    label: &'static str,
    color: RGBColor,
    data: LatThru,
}

fn load_both(ws: &mut Workspace<'_>, chart: &str) -> Result<[Sweep; 2]> {
    let spdk = LatThru::load(ws, chart, "SPDK", SPDK_LAT_THRU_LOG)?;
    let xrp = LatThru::load(ws, chart, "XRP", XRP_LAT_THRU_LOG)?;
    Ok([
        Sweep {
            label: "SPDK",
            color: MPL_RED,
            data: spdk,
        },
        Sweep {
            label: "XRP",
            color: MPL_BLUE,
            data: xrp,
        },
    ])
}

/// 99th percentile and average latency over achieved throughput
pub fn latency_vs_throughput(ws: &mut Workspace<'_>, style: &ChartStyle) -> Result<PathBuf> {
    let name = "spdk-lat-thru";
    let [spdk, xrp] = load_both(ws, name)?;
    let mut spec = ChartSpec::new(name, "Throughput (op/s)", "Latency (usec)").legend(LegendPosition::UpperLeft);

    for (sys, p99_marker, avg_marker) in [
        (&spdk, Marker::Square, Marker::Point),
        (&xrp, Marker::Diamond, Marker::TriangleUp),
    ] {
        sys.data.report(sys.label);
        spec = spec
            .series(
                PlotSeries::new(
                    format!("99% latency ({})", sys.label),
                    sys.data.throughput.clone(),
                    sys.data.p99.clone(),
                    sys.color,
                    p99_marker,
                )
                .dashed(),
            )
            .series(PlotSeries::new(
                format!("avg latency ({})", sys.label),
                sys.data.throughput.clone(),
                sys.data.avg.clone(),
                sys.color,
                avg_marker,
            ));
    }

    ws.render(&spec, style)
}

/// 95th, 99th and 99.9th percentile latency over achieved throughput
pub fn tail_latency_vs_throughput(ws: &mut Workspace<'_>, style: &ChartStyle) -> Result<PathBuf> {
    let name = "spdk-lat-thru-tail";
    let systems = load_both(ws, name)?;
    let mut spec = ChartSpec::new(name, "Throughput (op/s)", "Latency (usec)")
        .y_scale(Scale::Log)
        .legend(LegendPosition::UpperLeft);

    for sys in &systems {
        let percentiles = [
            ("95%", &sys.data.p95, Marker::TriangleUp, LineKind::Solid),
            ("99%", &sys.data.p99, Marker::Square, LineKind::Dashed),
            ("99.9%", &sys.data.p999, Marker::Diamond, LineKind::Dashed),
        ];
        for (pct, values, marker, line) in percentiles {
            let mut series = PlotSeries::new(
                format!("{} latency ({})", pct, sys.label),
                sys.data.throughput.clone(),
                values.clone(),
                sys.color,
                marker,
            );
            series.line = line;
            spec = spec.series(series);
        }
    }

    ws.render(&spec, style)
}
