//! Chart rendering to SVG.

use crate::extract::Series;
use crate::style::{ChartStyle, LegendPosition, LineKind, Marker, Scale};
use plotters::coord::ranged1d::{Ranged, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::element::{Drawable, PointCollection};
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters_backend::{BackendCoord, DrawingErrorKind};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("series {label:?} has {x} x values but {y} y values")]
    LengthMismatch { label: String, x: usize, y: usize },

    #[error("{label:?} has non-finite value {value}")]
    NonFinite { label: String, value: f64 },

    #[error("{label:?} has value {value}, which a logarithmic axis cannot show")]
    NonPositiveOnLogAxis { label: String, value: f64 },

    #[error("axis range {min}..{max} is empty")]
    EmptyRange { min: f64, max: f64 },

    #[error("drawing failed: {0}")]
    Backend(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Backend(err.to_string())
    }
}

/// One labeled line on a chart
#[derive(Debug, Clone)]
pub struct PlotSeries {
    pub label: String,
    pub x: Series,
    pub y: Series,
    pub color: RGBColor,
    pub marker: Marker,
    pub line: LineKind,
}

impl PlotSeries {
    pub fn new(label: impl Into<String>, x: Series, y: Series, color: RGBColor, marker: Marker) -> Self {
        Self {
            label: label.into(),
            x,
            y,
            color,
            marker,
            line: LineKind::Solid,
        }
    }

    pub fn dashed(mut self) -> Self {
        self.line = LineKind::Dashed;
        self
    }
}

/// Horizontal line spanning the whole x range
#[derive(Debug, Clone, Copy)]
pub struct ReferenceLine {
    pub y: f64,
    pub color: RGBColor,
    pub line: LineKind,
}

/// Axis limits; an unset side is derived from the data
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    pub fn fixed(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn from_zero() -> Self {
        Self {
            min: Some(0.0),
            max: None,
        }
    }
}

/// Everything needed to draw one chart
#[derive(Debug, Clone)]
pub struct ChartSpec {
    /// Output file stem, written as `<name>.svg`
    pub name: String,
    pub x_label: String,
    pub y_label: String,
    pub x_bounds: Bounds,
    pub y_bounds: Bounds,
    pub y_scale: Scale,
    /// Fixed spacing between x ticks
    pub x_tick_step: Option<f64>,
    pub legend: LegendPosition,
    pub series: Vec<PlotSeries>,
    pub reference_lines: Vec<ReferenceLine>,
}

impl ChartSpec {
    pub fn new(name: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            x_bounds: Bounds::default(),
            y_bounds: Bounds::default(),
            y_scale: Scale::Linear,
            x_tick_step: None,
            legend: LegendPosition::default(),
            series: Vec::new(),
            reference_lines: Vec::new(),
        }
    }

    pub fn x_bounds(mut self, bounds: Bounds) -> Self {
        self.x_bounds = bounds;
        self
    }

    pub fn y_bounds(mut self, bounds: Bounds) -> Self {
        self.y_bounds = bounds;
        self
    }

    pub fn y_scale(mut self, scale: Scale) -> Self {
        self.y_scale = scale;
        self
    }

    pub fn x_tick_step(mut self, step: f64) -> Self {
        self.x_tick_step = Some(step);
        self
    }

    pub fn legend(mut self, position: LegendPosition) -> Self {
        self.legend = position;
        self
    }

    pub fn series(mut self, series: PlotSeries) -> Self {
        self.series.push(series);
        self
    }

    pub fn reference_line(mut self, line: ReferenceLine) -> Self {
        self.reference_lines.push(line);
        self
    }

    /// Reject data the chart cannot represent faithfully
    pub fn validate(&self) -> Result<(), RenderError> {
        for s in &self.series {
            if s.x.len() != s.y.len() {
                return Err(RenderError::LengthMismatch {
                    label: s.label.clone(),
                    x: s.x.len(),
                    y: s.y.len(),
                });
            }
            if let Some(&value) = s.x.iter().chain(&s.y).find(|v| !v.is_finite()) {
                return Err(RenderError::NonFinite {
                    label: s.label.clone(),
                    value,
                });
            }
        }
        if let Some(line) = self.reference_lines.iter().find(|l| !l.y.is_finite()) {
            return Err(RenderError::NonFinite {
                label: "reference line".to_string(),
                value: line.y,
            });
        }

        if self.y_scale == Scale::Log {
            for s in &self.series {
                if let Some(&value) = s.y.iter().find(|v| **v <= 0.0) {
                    return Err(RenderError::NonPositiveOnLogAxis {
                        label: s.label.clone(),
                        value,
                    });
                }
            }
            if let Some(line) = self.reference_lines.iter().find(|l| l.y <= 0.0) {
                return Err(RenderError::NonPositiveOnLogAxis {
                    label: "reference line".to_string(),
                    value: line.y,
                });
            }
        }

        Ok(())
    }

    fn x_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.series.iter().flat_map(|s| s.x.iter().copied())
    }

    fn y_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.series
            .iter()
            .flat_map(|s| s.y.iter().copied())
            .chain(self.reference_lines.iter().map(|l| l.y))
    }
}

/// Draw `spec` into `<output_dir>/<name>.svg`, replacing any existing file.
///
/// The drawing area is dropped before returning, so nothing is held across
/// charts.
pub fn render_chart(spec: &ChartSpec, style: &ChartStyle, output_dir: &Path) -> Result<PathBuf, RenderError> {
    spec.validate()?;

    let (x_min, x_max) = resolve_range(spec.x_bounds, spec.x_values(), Scale::Linear)?;
    let (y_min, y_max) = resolve_range(spec.y_bounds, spec.y_values(), spec.y_scale)?;

    let path = output_dir.join(format!("{}.svg", spec.name));
    {
        let root = SVGBackend::new(&path, (style.width, style.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut builder = ChartBuilder::on(&root);
        builder.margin(15).x_label_area_size(60).y_label_area_size(90);

        match spec.y_scale {
            Scale::Linear => {
                let mut chart = builder.build_cartesian_2d(x_min..x_max, y_min..y_max)?;
                draw_chart(&mut chart, spec, style, (x_min, x_max))?;
            }
            Scale::Log => {
                let mut chart = builder.build_cartesian_2d(x_min..x_max, (y_min..y_max).log_scale())?;
                draw_chart(&mut chart, spec, style, (x_min, x_max))?;
            }
        }

        root.present()?;
    }
    Ok(path)
}

fn draw_chart<'a, Y>(
    chart: &mut ChartContext<'a, SVGBackend<'a>, Cartesian2d<RangedCoordf64, Y>>,
    spec: &ChartSpec,
    style: &ChartStyle,
    (x_min, x_max): (f64, f64),
) -> Result<(), RenderError>
where
    Y: Ranged<ValueType = f64> + ValueFormatter<f64>,
{
    {
        let mut mesh = chart.configure_mesh();
        mesh.disable_mesh()
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .label_style(("sans-serif", style.font_size))
            .axis_desc_style(("sans-serif", style.axis_label_font_size));
        if let Some(step) = spec.x_tick_step {
            mesh.x_labels(tick_count(x_min, x_max, step))
                .x_label_formatter(&whole_tick);
        }
        mesh.draw()?;
    }

    for line in &spec.reference_lines {
        let points = vec![(x_min, line.y), (x_max, line.y)];
        let line_style = line.color.stroke_width(style.line_width);
        match line.line {
            LineKind::Solid => {
                chart.draw_series(LineSeries::new(points, line_style))?;
            }
            LineKind::Dashed => {
                chart.draw_series(DashedLineSeries::new(points, 8, 6, line_style))?;
            }
        }
    }

    for series in &spec.series {
        let points: Vec<(f64, f64)> = series.x.iter().copied().zip(series.y.iter().copied()).collect();
        let color = series.color;
        let line_style = color.stroke_width(style.line_width);

        let anno = match series.line {
            LineKind::Solid => chart.draw_series(LineSeries::new(points.clone(), line_style))?,
            LineKind::Dashed => chart.draw_series(DashedLineSeries::new(points.clone(), 8, 6, line_style))?,
        };
        let marker = series.marker;
        let legend_size = style.marker_size.min(6);
        anno.label(series.label.as_str()).legend(move |(x, y)| {
            EmptyElement::at((x, y))
                + PathElement::new(vec![(0, 0), (20, 0)], color.stroke_width(2))
                + Glyph::new((10, 0), marker, legend_size, color)
        });

        chart.draw_series(
            points
                .iter()
                .map(|&p| Glyph::new(p, marker, style.marker_size, color)),
        )?;
    }

    if !spec.series.is_empty() {
        chart
            .configure_series_labels()
            .position(spec.legend.into())
            .label_font(("sans-serif", style.legend_font_size))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    Ok(())
}

/// Marker glyph centered on a data point
pub struct Glyph<Coord> {
    at: Coord,
    marker: Marker,
    size: i32,
    color: RGBColor,
}

impl<Coord> Glyph<Coord> {
    pub fn new(at: Coord, marker: Marker, size: i32, color: RGBColor) -> Self {
        Self { at, marker, size, color }
    }
}

impl<'a, Coord: 'a> PointCollection<'a, Coord> for &'a Glyph<Coord> {
    type Point = &'a Coord;
    type IntoIter = std::iter::Once<&'a Coord>;

    fn point_iter(self) -> Self::IntoIter {
        std::iter::once(&self.at)
    }
}

impl<Coord, DB: DrawingBackend> Drawable<DB> for Glyph<Coord> {
    fn draw<I: Iterator<Item = BackendCoord>>(
        &self,
        mut points: I,
        backend: &mut DB,
        _: (u32, u32),
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        let Some((x, y)) = points.next() else {
            return Ok(());
        };
        let s = self.size;
        let fill = self.color.filled();

        match self.marker {
            Marker::Point => backend.draw_circle((x, y), (s / 2).max(2) as u32, &fill, true),
            Marker::TriangleUp => backend.fill_polygon(vec![(x - s, y + s / 2), (x + s, y + s / 2), (x, y - s)], &fill),
            Marker::TriangleDown => backend.fill_polygon(vec![(x - s, y - s / 2), (x + s, y - s / 2), (x, y + s)], &fill),
            Marker::Diamond => {
                let w = s * 2 / 3;
                backend.fill_polygon(vec![(x, y - s), (x + w, y), (x, y + s), (x - w, y)], &fill)
            }
            Marker::Square => {
                let h = s * 3 / 4;
                backend.draw_rect((x - h, y - h), (x + h, y + h), &fill, true)
            }
            Marker::Plus => {
                let stroke = self.color.stroke_width(2);
                backend.draw_line((x - s, y), (x + s, y), &stroke)?;
                backend.draw_line((x, y - s), (x, y + s), &stroke)
            }
        }
    }
}

fn whole_tick(x: &f64) -> String {
    format!("{}", x)
}

/// Label count that makes the mesh land on multiples of `step`
fn tick_count(min: f64, max: f64, step: f64) -> usize {
    if step <= 0.0 || max <= min {
        return 1;
    }
    ((max - min) / step).floor() as usize + 1
}

/// Resolve the drawn range of one axis.
///
/// Unset bounds come from the data plus a 5% margin, measured in decades on
/// a log axis.
pub fn resolve_range(
    bounds: Bounds,
    values: impl Iterator<Item = f64>,
    scale: Scale,
) -> Result<(f64, f64), RenderError> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    let (auto_min, auto_max) = if lo > hi {
        match scale {
            Scale::Linear => (0.0, 1.0),
            Scale::Log => (1.0, 10.0),
        }
    } else {
        match scale {
            Scale::Linear => {
                let span = if hi > lo { hi - lo } else { lo.abs().max(1.0) };
                (lo - span * 0.05, hi + span * 0.05)
            }
            Scale::Log => {
                let (lo, hi) = (lo.log10(), hi.log10());
                let span = if hi > lo { hi - lo } else { 1.0 };
                (10f64.powf(lo - span * 0.05), 10f64.powf(hi + span * 0.05))
            }
        }
    };

    let min = bounds.min.unwrap_or(auto_min);
    let max = bounds.max.unwrap_or(auto_max);

    if let Some(value) = [min, max].into_iter().find(|v| !v.is_finite()) {
        return Err(RenderError::NonFinite {
            label: "axis range".to_string(),
            value,
        });
    }
    if scale == Scale::Log && min <= 0.0 {
        return Err(RenderError::NonPositiveOnLogAxis {
            label: "axis minimum".to_string(),
            value: min,
        });
    }
    if !(min < max) {
        return Err(RenderError::EmptyRange { min, max });
    }

    Ok((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::System;
    use pretty_assertions::assert_eq;

    fn threads() -> Series {
        (1..=12).map(f64::from).collect()
    }

    fn four_systems(spec: ChartSpec, y: impl Fn(usize) -> Series) -> ChartSpec {
        System::ALL.iter().enumerate().fold(spec, |spec, (i, sys)| {
            spec.series(PlotSeries::new(sys.label(), threads(), y(i), sys.color(), sys.marker()))
        })
    }

    #[test]
    fn renders_one_file_per_chart() {
        let dir = tempfile::tempdir().unwrap();
        let spec = four_systems(
            ChartSpec::new("threads", "Threads", "99th Latency (μs)")
                .x_bounds(Bounds::fixed(0.5, 12.5))
                .x_tick_step(1.0)
                .y_scale(Scale::Log),
            |i| threads().iter().map(|t| t * 10.0 + i as f64).collect(),
        );

        let path = render_chart(&spec, &ChartStyle::figure9(), dir.path()).unwrap();

        assert_eq!(path, dir.path().join("threads.svg"));
        let written: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(written.len(), 1);
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("io_uring"));
    }

    #[test]
    fn rendering_overwrites_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("again.svg"), "stale").unwrap();
        let spec = ChartSpec::new("again", "x", "y").series(PlotSeries::new(
            "only",
            vec![1.0, 2.0],
            vec![3.0, 4.0],
            RED,
            Marker::Square,
        ));

        let path = render_chart(&spec, &ChartStyle::default(), dir.path()).unwrap();
        assert_ne!(std::fs::read_to_string(path).unwrap(), "stale");
    }

    #[test]
    fn dashed_series_and_reference_lines_render() {
        let dir = tempfile::tempdir().unwrap();
        let spec = ChartSpec::new("dashed", "Thread Number", "Throughput (op/s)")
            .y_bounds(Bounds::fixed(0.0, 750_000.0))
            .series(PlotSeries::new("SPDK", vec![6.0, 7.0, 8.0], vec![697_046.9, 665_379.6, 625_176.7], BLUE, Marker::Plus).dashed())
            .reference_line(ReferenceLine {
                y: 714_285.714,
                color: RED,
                line: LineKind::Dashed,
            });

        let path = render_chart(&spec, &ChartStyle::spdk(), dir.path()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let spec = ChartSpec::new("short", "x", "y").series(PlotSeries::new(
            "xrp",
            threads(),
            vec![1.0; 11],
            RED,
            Marker::TriangleDown,
        ));

        let err = render_chart(&spec, &ChartStyle::default(), dir.path()).unwrap_err();
        assert!(matches!(err, RenderError::LengthMismatch { x: 12, y: 11, .. }));
        assert!(!dir.path().join("short.svg").exists());
    }

    #[test]
    fn log_axis_rejects_zero_and_negative_values() {
        let dir = tempfile::tempdir().unwrap();
        for bad in [0.0, -3.0] {
            let spec = ChartSpec::new("log", "x", "y").y_scale(Scale::Log).series(PlotSeries::new(
                "read",
                vec![1.0, 2.0, 3.0],
                vec![5.0, bad, 7.0],
                GREEN,
                Marker::Diamond,
            ));

            match render_chart(&spec, &ChartStyle::default(), dir.path()) {
                Err(RenderError::NonPositiveOnLogAxis { label, value }) => {
                    assert_eq!(label, "read");
                    assert_eq!(value, bad);
                }
                other => panic!("expected log domain error, got {other:?}"),
            }
        }
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for (scale, bad) in [(Scale::Linear, f64::INFINITY), (Scale::Log, f64::NAN), (Scale::Log, f64::NEG_INFINITY)] {
            let spec = ChartSpec::new("nonfinite", "x", "y").y_scale(scale).series(PlotSeries::new(
                "spdk",
                vec![1.0, 2.0],
                vec![3.0, bad],
                BLUE,
                Marker::Point,
            ));

            match render_chart(&spec, &ChartStyle::default(), dir.path()) {
                Err(RenderError::NonFinite { label, value }) => {
                    assert_eq!(label, "spdk");
                    assert!(!value.is_finite());
                }
                other => panic!("expected non-finite error, got {other:?}"),
            }
        }
        assert!(!dir.path().join("nonfinite.svg").exists());

        let spec = ChartSpec::new("nonfinite", "x", "y")
            .series(PlotSeries::new("xrp", vec![f64::NAN], vec![1.0], RED, Marker::Point));
        assert!(matches!(spec.validate(), Err(RenderError::NonFinite { .. })));

        let spec = ChartSpec::new("nonfinite", "x", "y").reference_line(ReferenceLine {
            y: f64::INFINITY,
            color: RED,
            line: LineKind::Solid,
        });
        assert!(matches!(spec.validate(), Err(RenderError::NonFinite { .. })));
    }

    #[test]
    fn infinite_bound_is_rejected() {
        let err = resolve_range(Bounds::fixed(0.0, f64::INFINITY), std::iter::empty(), Scale::Linear).unwrap_err();
        assert!(matches!(err, RenderError::NonFinite { .. }));
    }

    #[test]
    fn legend_entries_carry_the_marker_glyph() {
        let dir = tempfile::tempdir().unwrap();
        let rects = |name: &str, marker: Marker| {
            let spec = ChartSpec::new(name, "x", "y").series(PlotSeries::new(
                "read",
                vec![1.0, 2.0],
                vec![3.0, 4.0],
                GREEN,
                marker,
            ));
            let path = render_chart(&spec, &ChartStyle::default(), dir.path()).unwrap();
            std::fs::read_to_string(path).unwrap().matches("<rect").count()
        };

        // two data points plus one legend sample
        assert_eq!(rects("square", Marker::Square), rects("plus", Marker::Plus) + 3);
    }

    #[test]
    fn log_axis_rejects_zero_lower_bound() {
        let err = resolve_range(Bounds::from_zero(), [1.0, 10.0].into_iter(), Scale::Log).unwrap_err();
        assert!(matches!(err, RenderError::NonPositiveOnLogAxis { .. }));
    }

    #[test]
    fn unset_bounds_pad_the_data() {
        let (min, max) = resolve_range(Bounds::default(), [0.0, 100.0].into_iter(), Scale::Linear).unwrap();
        assert_eq!((min, max), (-5.0, 105.0));

        let (min, max) = resolve_range(Bounds::from_zero(), [10.0, 20.0].into_iter(), Scale::Linear).unwrap();
        assert_eq!((min, max), (0.0, 20.5));

        let (min, max) = resolve_range(Bounds::default(), [10.0, 1000.0].into_iter(), Scale::Log).unwrap();
        assert!((min - 10f64.powf(0.9)).abs() < 1e-9);
        assert!((max - 10f64.powf(3.1)).abs() < 1e-9);
    }

    #[test]
    fn fixed_bounds_win_over_data() {
        let range = resolve_range(Bounds::fixed(0.5, 12.5), threads().into_iter(), Scale::Linear).unwrap();
        assert_eq!(range, (0.5, 12.5));
    }

    #[test]
    fn inverted_bounds_are_empty() {
        let err = resolve_range(Bounds::fixed(3.0, 3.0), std::iter::empty(), Scale::Linear).unwrap_err();
        assert!(matches!(err, RenderError::EmptyRange { .. }));
    }

    #[test]
    fn tick_count_follows_step() {
        assert_eq!(tick_count(0.5, 12.5, 1.0), 13);
        assert_eq!(tick_count(5.1, 24.9, 1.0), 20);
        assert_eq!(tick_count(1.0, 1.0, 1.0), 1);
    }
}
