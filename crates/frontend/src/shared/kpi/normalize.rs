use contracts::kpi::{GroupBy, QueryResult};
use std::collections::HashMap;

use super::aggregate::{PeriodRow, PeriodSeries};

/// Current/prior value pair for one dimension value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KpiCell {
    pub current: f64,
    pub prior: f64,
}

/// Normalized group response: dimension value -> cell.
pub type KpiRowMap = HashMap<String, KpiCell>;

/// Response shape, resolved exactly once at the normalization boundary.
/// Downstream code matches on the variant and never re-inspects row widths.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedResponse {
    /// `groupBy=time`: one row per period, ascending by period key.
    TimeSeries(PeriodSeries),
    /// Any categorical grouping: one row per dimension value.
    GroupTotals(KpiRowMap),
    /// `groupBy=total`: a single grand-total cell.
    Scalar(KpiCell),
}

/// Parse one numeric cell. A missing or malformed value becomes 0.0 so a
/// single bad cell cannot poison an aggregate sum or a delta with NaN.
fn parse_cell(row: &[String], idx: usize) -> f64 {
    row.get(idx)
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Normalize raw rows into a map keyed by column 0 (case-sensitive).
/// Zero rows normalize to an empty map: "no data for this slice" is a valid
/// outcome, not an error.
pub fn normalize_rows(rows: &[Vec<String>]) -> KpiRowMap {
    let mut map = KpiRowMap::with_capacity(rows.len());
    for row in rows {
        let Some(key) = row.first() else { continue };
        map.insert(
            key.clone(),
            KpiCell {
                current: parse_cell(row, 1),
                prior: parse_cell(row, 2),
            },
        );
    }
    map
}

/// Normalize raw rows into a period series sorted ascending by period key.
pub fn normalize_series(rows: &[Vec<String>]) -> PeriodSeries {
    let mut series: PeriodSeries = rows
        .iter()
        .filter_map(|row| {
            let period = row.first()?.clone();
            Some(PeriodRow {
                period,
                current: parse_cell(row, 1),
                prior: parse_cell(row, 2),
            })
        })
        .collect();
    series.sort_by(|a, b| a.period.cmp(&b.period));
    series
}

/// Resolve the shape of a successful response based on the grouping that was
/// requested. The service sometimes returns bare scalars (`[["123.4"]]`) and
/// sometimes keyed rows; both collapse to `Scalar` for `groupBy=total`.
pub fn normalize(group_by: GroupBy, result: &QueryResult) -> NormalizedResponse {
    match group_by {
        GroupBy::Time => NormalizedResponse::TimeSeries(normalize_series(&result.data_array)),
        GroupBy::Total => {
            let cell = match result.data_array.first() {
                Some(row) if row.len() == 1 => KpiCell {
                    current: parse_cell(row, 0),
                    prior: 0.0,
                },
                Some(row) => KpiCell {
                    current: parse_cell(row, 1),
                    prior: parse_cell(row, 2),
                },
                None => KpiCell::default(),
            };
            NormalizedResponse::Scalar(cell)
        }
        _ => NormalizedResponse::GroupTotals(normalize_rows(&result.data_array)),
    }
}
