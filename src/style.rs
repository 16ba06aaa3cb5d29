//! Chart styling configuration.

use plotters::chart::SeriesLabelPosition;

/// Styling shared by every chart of one figure set.
///
/// Passed explicitly to each render call; nothing here is process-global.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    /// Canvas size in pixels
    pub width: u32,
    pub height: u32,
    /// Tick label font size
    pub font_size: f64,
    /// Axis description font size
    pub axis_label_font_size: f64,
    /// Legend font size
    pub legend_font_size: f64,
    /// Marker radius in pixels
    pub marker_size: i32,
    pub line_width: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            font_size: 14.0,
            axis_label_font_size: 20.0,
            legend_font_size: 14.0,
            marker_size: 7,
            line_width: 2,
        }
    }
}

impl ChartStyle {
    /// Thread/chain-length sweeps of figure 9
    pub fn figure9() -> Self {
        Self {
            font_size: 14.0,
            legend_font_size: 14.0,
            marker_size: 7,
            ..Default::default()
        }
    }

    /// SPDK vs. XRP scalability and latency/throughput charts
    pub fn spdk() -> Self {
        Self {
            font_size: 12.0,
            legend_font_size: 14.0,
            marker_size: 5,
            ..Default::default()
        }
    }
}

/// Marker glyph drawn at every data point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Point,
    Plus,
    Diamond,
    Square,
    TriangleUp,
    TriangleDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineKind {
    #[default]
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scale {
    #[default]
    Linear,
    Log,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendPosition {
    #[default]
    UpperRight,
    UpperLeft,
    LowerRight,
    LowerLeft,
}

impl From<LegendPosition> for SeriesLabelPosition {
    fn from(pos: LegendPosition) -> Self {
        match pos {
            LegendPosition::UpperRight => SeriesLabelPosition::UpperRight,
            LegendPosition::UpperLeft => SeriesLabelPosition::UpperLeft,
            LegendPosition::LowerRight => SeriesLabelPosition::LowerRight,
            LegendPosition::LowerLeft => SeriesLabelPosition::LowerLeft,
        }
    }
}
