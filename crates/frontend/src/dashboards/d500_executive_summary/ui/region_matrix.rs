use contracts::kpi::{GroupBy, KpiKey};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::dashboards::d500_executive_summary::api;
use crate::layout::global_context::use_dashboard;
use crate::shared::api_client::use_api_client;
use crate::shared::components::number_format::{format_delta, format_metric};
use crate::shared::drill::{DrillCommand, DrillLevel, DrillTree, NodeId, RowState};
use crate::shared::icons::icon;
use crate::shared::kpi::{delta_pct, KpiCell};

fn level_display_name(level: DrillLevel, key: &str) -> String {
    match level {
        DrillLevel::Region => api::region_name(key).to_string(),
        _ => key.to_string(),
    }
}

/// Geography x KPI matrix: regions drill into states, states into
/// wholesalers. The trailing US TOTAL row is reconciled per metric.
#[component]
pub fn RegionMatrix(
    /// Metric highlighted by the active KPI card; other columns are faded.
    #[prop(into)]
    active_metric: Signal<Option<KpiKey>>,
) -> impl IntoView {
    let ctx = use_dashboard();
    let client = use_api_client();

    let tree = RwSignal::new(DrillTree::new());
    let totals = RwSignal::new(Vec::<KpiCell>::new());
    let loading = RwSignal::new(false);
    let error_msg = RwSignal::new(None::<String>);

    // Rebuild the root rows on any selection change. Every expansion belongs
    // to the previous slice, so the whole tree is replaced.
    Effect::new(move |_| {
        let filters = ctx.snapshot();
        let generation = ctx.generation();
        let client = client.get_value();
        loading.set(true);
        error_msg.set(None);
        spawn_local(async move {
            let anchor = api::anchor_for(&client, &filters);
            let scope = filters.scope;
            let outcome =
                api::fetch_geo_matrix(&client, GroupBy::Region, &filters, &anchor, scope).await;
            if !ctx.is_current(generation) {
                log::debug!("discarding stale region matrix response");
                return;
            }
            match outcome {
                Ok(data) => {
                    totals.set(data.totals);
                    tree.update(|t| {
                        t.set_roots(
                            DrillLevel::Region,
                            data.rows
                                .into_iter()
                                .map(|row| {
                                    let name = level_display_name(DrillLevel::Region, &row.key);
                                    (row.key, name, row.cells)
                                })
                                .collect(),
                        )
                    });
                }
                Err(err) => {
                    log::error!("region matrix load failed: {}", err);
                    error_msg.set(Some(err.to_string()));
                }
            }
            loading.set(false);
        });
    });

    let on_toggle = Callback::new(move |id: NodeId| {
        let command = tree
            .try_update(|t| t.toggle(id))
            .unwrap_or(DrillCommand::Nothing);
        let DrillCommand::Fetch {
            ticket,
            child_level,
        } = command
        else {
            return;
        };

        let filters = ctx.snapshot_untracked();
        let generation = ctx.generation();
        let scoped = tree.with_untracked(|t| t.scoped_filters(ticket.node, &filters));
        let client = client.get_value();
        spawn_local(async move {
            let anchor = api::anchor_for(&client, &scoped);
            let outcome = api::fetch_geo_matrix(
                &client,
                child_level.group_by(),
                &scoped,
                &anchor,
                scoped.scope,
            )
            .await;
            if !ctx.is_current(generation) {
                // The filters moved on; the rebuilt tree owns these ids now.
                return;
            }
            match outcome {
                Ok(data) => {
                    tree.update(|t| {
                        t.apply_children(
                            ticket,
                            data.rows
                                .into_iter()
                                .map(|row| {
                                    let name = level_display_name(child_level, &row.key);
                                    (row.key, name, row.cells)
                                })
                                .collect(),
                        );
                    });
                }
                Err(err) => {
                    log::error!("drill fetch failed: {}", err);
                    tree.update(|t| {
                        t.apply_error(ticket, err.to_string());
                    });
                }
            }
        });
    });

    let cell_class = move |kpi: KpiKey| {
        let faded = matches!(active_metric.get(), Some(active) if active != kpi);
        if faded {
            "geo-matrix__cell geo-matrix__cell--faded"
        } else {
            "geo-matrix__cell"
        }
    };

    let header = move || {
        KpiKey::ALL
            .iter()
            .map(|kpi| {
                view! {
                    <div class=cell_class(*kpi)>
                        <div class="geo-matrix__col-icon">{icon(kpi.as_str())}</div>
                        <div class="geo-matrix__col-label">{kpi.label()}</div>
                    </div>
                }
            })
            .collect_view()
    };

    let metric_cells = move |cells: Vec<KpiCell>| {
        KpiKey::ALL
            .iter()
            .zip(cells)
            .map(|(kpi, cell)| {
                let pct = delta_pct(cell.current, cell.prior);
                view! {
                    <div class=cell_class(*kpi)>
                        <div class="geo-matrix__value">{format_metric(*kpi, cell.current)}</div>
                        <div class={if pct >= 0.0 {
                            "geo-matrix__delta geo-matrix__delta--up"
                        } else {
                            "geo-matrix__delta geo-matrix__delta--down"
                        }}>
                            {format_delta(pct)}
                        </div>
                    </div>
                }
            })
            .collect_view()
    };

    let body = move || {
        tree.with(|t| {
            t.visible()
                .into_iter()
                .filter_map(|id| {
                    let node = t.node(id)?;
                    let depth = node.level.depth();
                    let chevron = match node.state {
                        RowState::Expanded => "\u{25be}",
                        RowState::Loading => "\u{22ef}",
                        _ => "\u{25b8}",
                    };
                    let name = node.display_name.clone();
                    let error_note = match &node.state {
                        RowState::Error(message) => Some(view! {
                            <span class="geo-matrix__row-error" title=message.clone()>
                                "load failed \u{2014} click to retry"
                            </span>
                        }),
                        _ => None,
                    };
                    let cells = node.cells.clone();
                    Some(view! {
                        <div
                            class={if depth == 0 { "geo-matrix__row" } else { "geo-matrix__row geo-matrix__row--sub" }}
                            on:click=move |_| on_toggle.run(id)
                        >
                            <div
                                class="geo-matrix__name"
                                style=format!("padding-left: {}px;", 4 + depth * 18)
                            >
                                <span class="geo-matrix__chevron">{chevron}</span>
                                {name}
                                {error_note}
                            </div>
                            {metric_cells(cells)}
                        </div>
                    })
                })
                .collect_view()
        })
    };

    let totals_row = move || {
        let cells = totals.get();
        if cells.is_empty() {
            return None;
        }
        Some(view! {
            <div class="geo-matrix__row geo-matrix__row--totals">
                <div class="geo-matrix__name">"US TOTAL"</div>
                {metric_cells(cells)}
            </div>
        })
    };

    view! {
        <div class="geo-matrix">
            <div class="geo-matrix__title">"Regional Performance"</div>
            <div class="geo-matrix__subtitle">"By KPI \u{00b7} Click rows to drill"</div>

            {move || error_msg.get().map(|msg| view! {
                <div class="alert alert--error">{msg}</div>
            })}
            {move || {
                if loading.get() {
                    Some(view! { <div class="geo-matrix__loading">"Loading\u{2026}"</div> })
                } else {
                    None
                }
            }}

            <div class="geo-matrix__header">
                <div class="geo-matrix__name"></div>
                {header}
            </div>
            {totals_row}
            {body}
        </div>
    }
}
