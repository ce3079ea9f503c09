use contracts::kpi::KpiKey;
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::collections::HashMap;

use crate::dashboards::d500_executive_summary::api;
use crate::dashboards::d500_executive_summary::ui::brand_matrix::BrandMatrix;
use crate::dashboards::d500_executive_summary::ui::filter_bar::FilterBar;
use crate::dashboards::d500_executive_summary::ui::region_matrix::RegionMatrix;
use crate::dashboards::d500_executive_summary::ui::trend_chart::TrendChart;
use crate::layout::global_context::use_dashboard;
use crate::shared::api_client::use_api_client;
use crate::shared::components::number_format::format_metric;
use crate::shared::components::stat_card::StatCard;
use crate::shared::kpi::{aggregate, AggregatedKpi};

/// Executive summary: eight KPI cards, a trend drawer for the active metric,
/// and the two drillable matrices.
///
/// Every selection change bumps the context generation and re-issues all
/// card fetches; completions from a superseded generation are discarded, so
/// the last-landed response of the *current* generation always wins the slot
/// regardless of arrival order. A failed card keeps the failure to itself.
#[component]
pub fn ExecutiveSummaryDashboard() -> impl IntoView {
    let ctx = use_dashboard();
    let client = use_api_client();

    let aggregates = RwSignal::new(HashMap::<KpiKey, AggregatedKpi>::new());
    let card_errors = RwSignal::new(HashMap::<KpiKey, String>::new());
    let active_metric = RwSignal::new(None::<KpiKey>);

    Effect::new(move |_| {
        let filters = ctx.snapshot();
        let generation = ctx.generation();
        aggregates.set(HashMap::new());
        card_errors.set(HashMap::new());

        for kpi in KpiKey::ALL {
            let client = client.get_value();
            let filters = filters.clone();
            spawn_local(async move {
                let anchor = api::anchor_for(&client, &filters);
                let outcome = api::fetch_period_series(&client, kpi, &filters, &anchor).await;
                if !ctx.is_current(generation) {
                    log::debug!("discarding stale series for {}", kpi.as_str());
                    return;
                }
                match outcome {
                    Ok(series) => {
                        // An empty series stays an empty card.
                        if let Some(agg) = aggregate(kpi, &series, &anchor, filters.scope) {
                            aggregates.update(|m| {
                                m.insert(kpi, agg);
                            });
                        }
                    }
                    Err(err) => {
                        log::error!("KPI {} failed to load: {}", kpi.as_str(), err);
                        card_errors.update(|m| {
                            m.insert(kpi, err.to_string());
                        });
                    }
                }
            });
        }
    });

    let cards = move || {
        KpiKey::ALL
            .iter()
            .copied()
            .map(|kpi| {
                let value = Signal::derive(move || {
                    aggregates.with(|m| m.get(&kpi).map(|a| format_metric(kpi, a.display_value)))
                });
                let mtd_delta = Signal::derive(move || {
                    aggregates.with(|m| m.get(&kpi).map(|a| a.mtd_delta_pct))
                });
                let ytd_delta = Signal::derive(move || {
                    aggregates.with(|m| m.get(&kpi).map(|a| a.ytd_delta_pct))
                });
                let error = Signal::derive(move || card_errors.with(|m| m.get(&kpi).cloned()));
                let active = Signal::derive(move || active_metric.get() == Some(kpi));
                let on_click = Callback::new(move |_: ()| {
                    active_metric.update(|current| {
                        *current = if *current == Some(kpi) { None } else { Some(kpi) };
                    });
                });
                view! {
                    <StatCard
                        label=kpi.label().to_uppercase()
                        icon_name=kpi.as_str().to_string()
                        value=value
                        mtd_delta=mtd_delta
                        ytd_delta=ytd_delta
                        error=error
                        active=active
                        on_click=on_click
                    />
                }
            })
            .collect_view()
    };

    let trend_drawer = move || {
        let kpi = active_metric.get()?;
        let agg = aggregates.with(|m| m.get(&kpi).cloned())?;
        Some(view! {
            <div class="exec-summary__trend">
                <TrendChart
                    title=format!("{} \u{00b7} monthly vs LY", kpi.label())
                    series=agg.series
                />
            </div>
        })
    };

    let brand_metric = Signal::derive(move || active_metric.get().unwrap_or(KpiKey::Volume));

    view! {
        <div id="d500_executive_summary--dashboard" class="exec-summary" data-page-category="dashboard">
            <FilterBar />

            <div class="exec-summary__cards">{cards}</div>

            {trend_drawer}

            <div class="exec-summary__matrices">
                <div class="exec-summary__panel">
                    <RegionMatrix active_metric=active_metric />
                </div>
                <div class="exec-summary__panel">
                    <BrandMatrix metric=brand_metric />
                </div>
            </div>
        </div>
    }
}
