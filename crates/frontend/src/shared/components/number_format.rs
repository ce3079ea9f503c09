//! Number formatting for KPI cards and matrix cells.

use contracts::kpi::{KpiKey, KpiUnit};

/// Barrels, shown in millions with one decimal.
pub fn format_bbls(value: f64) -> String {
    if !value.is_finite() {
        return "\u{2014}".to_string();
    }
    format!("{:.1}M", value / 1_000_000.0)
}

/// Compact magnitude formatting for counts and currency: 1.2B / 415.0K / 87.
pub fn format_compact(value: f64) -> String {
    if !value.is_finite() {
        return "\u{2014}".to_string();
    }
    let abs = value.abs();
    if abs >= 1_000_000_000.0 {
        format!("{:.1}B", value / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{:.0}", value)
    }
}

pub fn format_pct(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "\u{2014}".to_string();
    }
    format!("{:.prec$}%", value, prec = decimals)
}

/// Signed delta chip text: "+1.25%" / "-0.40%" / "+0.00%".
pub fn format_delta(pct: f64) -> String {
    if !pct.is_finite() {
        return "\u{2014}".to_string();
    }
    let sign = if pct >= 0.0 { "+" } else { "" };
    format!("{}{:.2}%", sign, pct)
}

/// Display form of a metric value, dispatched on the metric's unit.
pub fn format_metric(kpi: KpiKey, value: f64) -> String {
    match kpi.unit() {
        KpiUnit::Bbl => format_bbls(value),
        KpiUnit::Usd => format!("${}", format_compact(value)),
        KpiUnit::Pct => format_pct(value, 1),
        KpiUnit::Count => format_compact(value),
        KpiUnit::Index => format!("{:.1}", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bbls() {
        assert_eq!(format_bbls(12_345_678.0), "12.3M");
        assert_eq!(format_bbls(0.0), "0.0M");
        assert_eq!(format_bbls(f64::NAN), "\u{2014}");
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(1_234_567_890.0), "1.2B");
        assert_eq!(format_compact(415_000.0), "415.0K");
        assert_eq!(format_compact(1_234_567.0), "1.2M");
        assert_eq!(format_compact(87.0), "87");
        assert_eq!(format_compact(-12_500.0), "-12.5K");
    }

    #[test]
    fn test_format_delta() {
        assert_eq!(format_delta(1.25), "+1.25%");
        assert_eq!(format_delta(-0.4), "-0.40%");
        assert_eq!(format_delta(0.0), "+0.00%");
    }

    #[test]
    fn test_format_metric_by_unit() {
        assert_eq!(format_metric(KpiKey::Volume, 2_500_000.0), "2.5M");
        assert_eq!(format_metric(KpiKey::Revenue, 1_200_000_000.0), "$1.2B");
        assert_eq!(format_metric(KpiKey::Share, 23.44), "23.4%");
        assert_eq!(format_metric(KpiKey::Pods, 415_000.0), "415.0K");
        assert_eq!(format_metric(KpiKey::Avd, 7.82), "7.8");
    }
}
