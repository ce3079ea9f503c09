use contracts::kpi::{KpiKey, TimeScope};

/// One calendar period of a metric's time series.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodRow {
    /// Period key, `YYYYMM`.
    pub period: String,
    pub current: f64,
    pub prior: f64,
}

/// Full time series for one metric and one grouping context, ascending by
/// period. The first row is assumed to be the calendar year's first period.
pub type PeriodSeries = Vec<PeriodRow>;

/// Headline figures derived from a period series. Recomputed from scratch on
/// every filter, period or scope change; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedKpi {
    /// The value shown on the card for the active scope.
    pub display_value: f64,
    /// Period the figures are anchored on.
    pub anchor_period: String,
    pub mtd_current: f64,
    pub mtd_prior: f64,
    pub mtd_delta_pct: f64,
    pub ytd_current: f64,
    pub ytd_prior: f64,
    pub ytd_delta_pct: f64,
    /// Unmodified series, retained for charting.
    pub series: PeriodSeries,
}

/// Percentage change vs the prior figure. A zero prior is defined as a 0%
/// delta so Infinity/NaN never reach the UI.
pub fn delta_pct(current: f64, prior: f64) -> f64 {
    if prior == 0.0 {
        0.0
    } else {
        (current - prior) / prior * 100.0
    }
}

/// Compute MTD and YTD figures from `series`, anchored on `anchor`.
///
/// The anchor row is located by exact period match, falling back to the last
/// row when the anchor is not present. An empty series yields `None` -- the
/// "no data" outcome callers render as an empty card.
///
/// For the YTD display value, additive metrics use the cumulative sum through
/// the anchor; non-additive metrics (shares, averages) keep the anchor
/// period's own value, since summing ratios across months is meaningless.
pub fn aggregate(
    kpi: KpiKey,
    series: &PeriodSeries,
    anchor: &str,
    scope: TimeScope,
) -> Option<AggregatedKpi> {
    if series.is_empty() {
        return None;
    }

    let anchor_idx = series
        .iter()
        .position(|row| row.period == anchor)
        .unwrap_or(series.len() - 1);
    let anchor_row = &series[anchor_idx];

    let mtd_current = anchor_row.current;
    let mtd_prior = anchor_row.prior;
    let mtd_delta = delta_pct(mtd_current, mtd_prior);

    // Cumulative from the start of the series through the anchor, inclusive.
    let mut ytd_current = 0.0;
    let mut ytd_prior = 0.0;
    for row in &series[..=anchor_idx] {
        ytd_current += row.current;
        ytd_prior += row.prior;
    }
    let ytd_delta = delta_pct(ytd_current, ytd_prior);

    let display_value = match scope {
        TimeScope::Mtd => mtd_current,
        TimeScope::Ytd => {
            if kpi.is_additive() {
                ytd_current
            } else {
                mtd_current
            }
        }
    };

    Some(AggregatedKpi {
        display_value,
        anchor_period: anchor_row.period.clone(),
        mtd_current,
        mtd_prior,
        mtd_delta_pct: mtd_delta,
        ytd_current,
        ytd_prior,
        ytd_delta_pct: ytd_delta,
        series: series.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(rows: &[(&str, f64, f64)]) -> PeriodSeries {
        rows.iter()
            .map(|(p, c, l)| PeriodRow {
                period: p.to_string(),
                current: *c,
                prior: *l,
            })
            .collect()
    }

    #[test]
    fn test_ytd_sums_through_anchor() {
        let s = series(&[("202501", 100.0, 90.0), ("202502", 110.0, 100.0)]);
        let agg = aggregate(KpiKey::Volume, &s, "202502", TimeScope::Ytd).unwrap();
        assert_eq!(agg.ytd_current, 210.0);
        assert_eq!(agg.ytd_prior, 190.0);
        assert!((agg.ytd_delta_pct - 10.526315789473683).abs() < 1e-6);
        assert_eq!(agg.display_value, 210.0);
    }

    #[test]
    fn test_mtd_uses_anchor_row_only() {
        let s = series(&[("202501", 100.0, 90.0), ("202502", 110.0, 100.0)]);
        let agg = aggregate(KpiKey::Volume, &s, "202502", TimeScope::Mtd).unwrap();
        assert_eq!(agg.display_value, 110.0);
        assert_eq!(agg.mtd_delta_pct, 10.0);
    }

    #[test]
    fn test_anchor_at_first_period_ytd_equals_mtd() {
        let s = series(&[("202501", 100.0, 80.0), ("202502", 110.0, 100.0)]);
        let agg = aggregate(KpiKey::Volume, &s, "202501", TimeScope::Ytd).unwrap();
        assert_eq!(agg.ytd_current, agg.mtd_current);
        assert_eq!(agg.ytd_prior, agg.mtd_prior);
        assert_eq!(agg.display_value, 100.0);
    }

    #[test]
    fn test_missing_anchor_falls_back_to_last_row() {
        let s = series(&[("202501", 100.0, 90.0), ("202502", 110.0, 100.0)]);
        let agg = aggregate(KpiKey::Volume, &s, "202512", TimeScope::Mtd).unwrap();
        assert_eq!(agg.anchor_period, "202502");
        assert_eq!(agg.display_value, 110.0);
    }

    #[test]
    fn test_zero_prior_is_zero_delta() {
        let s = series(&[("202501", 50.0, 0.0)]);
        let agg = aggregate(KpiKey::Volume, &s, "202501", TimeScope::Mtd).unwrap();
        assert_eq!(agg.mtd_delta_pct, 0.0);
        assert_eq!(agg.ytd_delta_pct, 0.0);
        assert!(agg.mtd_delta_pct.is_finite());
    }

    #[test]
    fn test_non_additive_ytd_displays_anchor_value() {
        let s = series(&[("202501", 22.0, 21.0), ("202502", 23.5, 22.0)]);
        let agg = aggregate(KpiKey::Share, &s, "202502", TimeScope::Ytd).unwrap();
        // Shares are not summed across months; the anchor month stands in.
        assert_eq!(agg.display_value, 23.5);
        // The YTD delta is still reported from the cumulative sums.
        assert_eq!(agg.ytd_current, 45.5);
    }

    #[test]
    fn test_empty_series_is_no_data() {
        assert!(aggregate(KpiKey::Volume, &Vec::new(), "202501", TimeScope::Ytd).is_none());
    }

    #[test]
    fn test_series_retained_unmodified() {
        let s = series(&[("202501", 1.0, 2.0), ("202502", 3.0, 4.0)]);
        let agg = aggregate(KpiKey::Volume, &s, "202502", TimeScope::Ytd).unwrap();
        assert_eq!(agg.series, s);
    }
}
