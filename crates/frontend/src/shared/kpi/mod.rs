//! Client-side KPI core: filter state, request building, response
//! normalization, additive reconciliation and period aggregation.
//!
//! Everything here is pure, synchronous computation; the only suspension
//! points of the dashboard live in the transport client.

pub mod aggregate;
pub mod filter_state;
pub mod normalize;
pub mod reconcile;
pub mod request;

pub use aggregate::{aggregate, delta_pct, AggregatedKpi, PeriodRow, PeriodSeries};
pub use filter_state::{FilterDimension, FilterState, ALL_SENTINEL};
pub use normalize::{normalize, KpiCell, KpiRowMap, NormalizedResponse};
pub use reconcile::{grand_total, reconcile, GroupColumn, ReconciledRow};
pub use request::{anchor_period, build_request};
