//! Console formatting of extracted series.

use num_format::{Locale, ToFormattedString};

/// Format operations per second with thousands separators
pub fn format_ops(ops_per_sec: f64) -> String {
    if !ops_per_sec.is_finite() || ops_per_sec < 0.0 {
        return format!("{ops_per_sec:.0}");
    }
    (ops_per_sec.round() as u64).to_formatted_string(&Locale::en)
}

/// Format a latency in microseconds
pub fn format_latency(us: f64) -> String {
    if us >= 1000.0 {
        format!("{:.2} ms", us / 1000.0)
    } else {
        format!("{:.1} us", us)
    }
}

/// One-line summary of a throughput series
pub fn throughput_summary(label: &str, series: &[f64]) -> String {
    let values: Vec<String> = series.iter().map(|v| format_ops(*v)).collect();
    format!("{:<10} [{}]", label, values.join(", "))
}

/// Peak of a series, if any
pub fn peak(series: &[f64]) -> Option<f64> {
    series.iter().copied().reduce(f64::max)
}
