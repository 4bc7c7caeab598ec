// src/figures/format.rs

/// Compact count for axis ticks: `950`, `12k`, `1.2M`.
///
/// Thresholds sit half a unit below each boundary so a value that would round
/// up to `1000k` is shown as `1M`.
pub fn format_count(v: f64) -> String {
    let a = v.abs();
    let (scaled, suffix) = if a >= 999_500.0 {
        (v / 1_000_000.0, "M")
    } else if a >= 999.5 {
        (v / 1_000.0, "k")
    } else {
        (v, "")
    };

    if suffix.is_empty() || scaled.abs() >= 10.0 {
        format!("{:.0}{}", scaled, suffix)
    } else {
        let s = format!("{:.1}", scaled);
        format!("{}{}", s.trim_end_matches(".0"), suffix)
    }
}

pub fn format_pct(v: f64) -> String {
    format!("{:.0}%", v)
}
