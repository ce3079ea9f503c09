//! Fetch helpers for the executive summary dashboard.
//!
//! Each helper builds the canonical request from a filter snapshot, sends it
//! through the shared transport client and normalizes the rows. Everything
//! after the await is synchronous computation.

use contracts::kpi::{GroupBy, KpiKey, TimeScope};
use futures::future::join_all;
use std::collections::{BTreeSet, HashMap};

use crate::shared::api_client::{ApiClient, TransportError};
use crate::shared::kpi::{
    build_request, grand_total, normalize, reconcile, FilterDimension, FilterState, GroupColumn,
    KpiCell, KpiRowMap, NormalizedResponse, PeriodSeries, ReconciledRow,
};

/// Anchor for a fetch: the most recent selected period, else the configured
/// default (latest warehouse period, falling back to the current month).
pub fn anchor_for(client: &ApiClient, filters: &FilterState) -> String {
    crate::shared::kpi::anchor_period(&filters.selected_periods)
        .unwrap_or_else(|| client.config().default_anchor())
}

/// Monthly series for one metric. Always requests the full YTD history so
/// the sparkline has every month, whatever the display scope is.
pub async fn fetch_period_series(
    client: &ApiClient,
    kpi: KpiKey,
    filters: &FilterState,
    anchor: &str,
) -> Result<PeriodSeries, TransportError> {
    let request = build_request(kpi, GroupBy::Time, filters, anchor, TimeScope::Ytd);
    let result = client.post_query(&request).await?;
    Ok(match normalize(GroupBy::Time, &result) {
        NormalizedResponse::TimeSeries(series) => series,
        _ => PeriodSeries::new(),
    })
}

/// One row per value of `group_by`, keyed by the dimension value.
pub async fn fetch_group_totals(
    client: &ApiClient,
    kpi: KpiKey,
    group_by: GroupBy,
    filters: &FilterState,
    anchor: &str,
    scope: TimeScope,
) -> Result<KpiRowMap, TransportError> {
    let request = build_request(kpi, group_by, filters, anchor, scope);
    let result = client.post_query(&request).await?;
    Ok(match normalize(group_by, &result) {
        NormalizedResponse::GroupTotals(rows) => rows,
        _ => KpiRowMap::new(),
    })
}

/// Independently computed grand total (blended share, weighted average).
pub async fn fetch_grand_total(
    client: &ApiClient,
    kpi: KpiKey,
    filters: &FilterState,
    anchor: &str,
    scope: TimeScope,
) -> Result<KpiCell, TransportError> {
    let request = build_request(kpi, GroupBy::Total, filters, anchor, scope);
    let result = client.post_query(&request).await?;
    Ok(match normalize(GroupBy::Total, &result) {
        NormalizedResponse::Scalar(cell) => cell,
        _ => KpiCell::default(),
    })
}

/// Brand-column matrix: one fetch per megabrand plus one unfiltered fetch
/// for the TOTAL column, merged through the reconciliation engine. Row keys
/// are values of `row_group` (regions, or states when drilled into one
/// region).
pub async fn fetch_brand_columns(
    client: &ApiClient,
    kpi: KpiKey,
    brands: &[&str],
    row_group: GroupBy,
    filters: &FilterState,
    anchor: &str,
    scope: TimeScope,
) -> Result<Vec<ReconciledRow>, TransportError> {
    let column_futures = brands.iter().map(|brand| {
        let client = client.clone();
        let scoped = filters.scoped(FilterDimension::Megabrand, brand);
        let brand = (*brand).to_string();
        let anchor = anchor.to_string();
        async move {
            let rows =
                fetch_group_totals(&client, kpi, row_group, &scoped, &anchor, scope).await?;
            Ok::<GroupColumn, TransportError>(GroupColumn { key: brand, rows })
        }
    });
    let total_future = fetch_group_totals(client, kpi, row_group, filters, anchor, scope);

    let (columns, total) = futures::join!(join_all(column_futures), total_future);
    let groups: Vec<GroupColumn> = columns.into_iter().collect::<Result<_, _>>()?;
    let total = total?;
    Ok(reconcile(kpi, &groups, Some(&total)))
}

/// One geography row of the region matrix: a cell per metric column.
#[derive(Debug, Clone)]
pub struct GeoRow {
    pub key: String,
    pub cells: Vec<KpiCell>,
}

/// Region matrix payload: per-geography rows plus the trailing totals row,
/// one cell per entry of `KpiKey::ALL`.
#[derive(Debug, Clone)]
pub struct GeoMatrixData {
    pub rows: Vec<GeoRow>,
    pub totals: Vec<KpiCell>,
}

/// Fetch all metric columns for one geography level, plus the grand-total
/// row. One request per metric; the three non-additive metrics need one
/// extra request each for their independently computed totals.
pub async fn fetch_geo_matrix(
    client: &ApiClient,
    group_by: GroupBy,
    filters: &FilterState,
    anchor: &str,
    scope: TimeScope,
) -> Result<GeoMatrixData, TransportError> {
    let column_futures = KpiKey::ALL.map(|kpi| {
        let client = client.clone();
        let filters = filters.clone();
        let anchor = anchor.to_string();
        async move { fetch_group_totals(&client, kpi, group_by, &filters, &anchor, scope).await }
    });
    let fetched_total_futures = KpiKey::ALL
        .iter()
        .filter(|kpi| !kpi.is_additive())
        .map(|kpi| {
            let client = client.clone();
            let filters = filters.clone();
            let anchor = anchor.to_string();
            let kpi = *kpi;
            async move {
                fetch_grand_total(&client, kpi, &filters, &anchor, scope)
                    .await
                    .map(|cell| (kpi, cell))
            }
        });

    let (columns, fetched_totals) =
        futures::join!(join_all(column_futures), join_all(fetched_total_futures));
    let columns: Vec<KpiRowMap> = columns.into_iter().collect::<Result<_, _>>()?;
    let fetched_totals: HashMap<KpiKey, KpiCell> =
        fetched_totals.into_iter().collect::<Result<_, _>>()?;

    // Union of geography keys across the metric columns; a geography with
    // data for only some metrics still gets a full row.
    let mut keys: BTreeSet<&str> = BTreeSet::new();
    for column in &columns {
        keys.extend(column.keys().map(String::as_str));
    }

    let mut rows: Vec<GeoRow> = keys
        .into_iter()
        .map(|key| GeoRow {
            key: key.to_string(),
            cells: columns
                .iter()
                .map(|column| column.get(key).copied().unwrap_or_default())
                .collect(),
        })
        .collect();
    // Largest volume first; ties resolved by key for stable output.
    rows.sort_by(|a, b| {
        b.cells[0]
            .current
            .partial_cmp(&a.cells[0].current)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });

    let totals = KpiKey::ALL
        .iter()
        .zip(&columns)
        .map(|(kpi, column)| {
            grand_total(
                *kpi,
                column.values().copied(),
                fetched_totals.get(kpi).copied(),
            )
        })
        .collect();

    Ok(GeoMatrixData { rows, totals })
}

/// Display name for a sales region code; other levels show their key.
pub fn region_name(code: &str) -> &str {
    match code {
        "NE" => "Northeast",
        "MW" => "Midwest",
        "S" => "Great Lakes",
        "W" => "Southeast",
        "C" => "South Central",
        "O" => "West",
        other => other,
    }
}
