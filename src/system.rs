//! Storage-access methods compared in the benchmark figures.

use crate::style::Marker;
use plotters::style::RGBColor;
use std::fmt;

/// matplotlib's named colors, so the charts keep the paper's palette
pub const MPL_BLUE: RGBColor = RGBColor(0, 0, 255);
pub const MPL_RED: RGBColor = RGBColor(255, 0, 0);
pub const MPL_ORANGE: RGBColor = RGBColor(255, 165, 0);
pub const MPL_GREEN: RGBColor = RGBColor(0, 128, 0);

/// Default color cycle (tab:blue, tab:orange)
pub const CYCLE_BLUE: RGBColor = RGBColor(31, 119, 180);
pub const CYCLE_ORANGE: RGBColor = RGBColor(255, 127, 14);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum System {
    Spdk,
    IoUring,
    Read,
    Xrp,
}

impl System {
    pub const ALL: [System; 4] = [System::Spdk, System::IoUring, System::Read, System::Xrp];

    /// Label used both in legends and in data file names
    pub fn label(self) -> &'static str {
        match self {
            System::Spdk => "spdk",
            System::IoUring => "io_uring",
            System::Read => "read",
            System::Xrp => "xrp",
        }
    }

    pub fn color(self) -> RGBColor {
        match self {
            System::Spdk => MPL_BLUE,
            System::IoUring => MPL_ORANGE,
            System::Read => MPL_GREEN,
            System::Xrp => MPL_RED,
        }
    }

    pub fn marker(self) -> Marker {
        match self {
            System::Spdk => Marker::Point,
            System::IoUring => Marker::Plus,
            System::Read => Marker::Diamond,
            System::Xrp => Marker::TriangleDown,
        }
    }

    /// Log file for a benchmark variant, e.g. `spdk-3.txt` or `xrp-chain.txt`
    pub fn log_name(self, variant: &str) -> String {
        format!("{}-{}.txt", self.label(), variant)
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
