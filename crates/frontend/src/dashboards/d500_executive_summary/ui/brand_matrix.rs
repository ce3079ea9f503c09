use contracts::kpi::{GroupBy, KpiKey};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::dashboards::d500_executive_summary::{api, BRANDS};
use crate::layout::global_context::use_dashboard;
use crate::shared::api_client::use_api_client;
use crate::shared::components::number_format::{format_delta, format_metric};
use crate::shared::drill::{DrillCommand, DrillLevel, DrillTree, NodeId, RowState};
use crate::shared::kpi::{delta_pct, KpiCell, ReconciledRow};

fn brand_codes() -> Vec<&'static str> {
    BRANDS.iter().map(|(code, _)| *code).collect()
}

fn seed_cells(row: ReconciledRow) -> (String, String, Vec<KpiCell>) {
    // Brand cells plus the trailing reconciled TOTAL cell.
    let mut cells = row.cells;
    cells.push(row.total);
    let name = api::region_name(&row.key).to_string();
    (row.key, name, cells)
}

/// Geography x megabrand matrix for the active metric. Each row is built
/// from one fetch per brand plus one unfiltered fetch for the TOTAL column;
/// the engine guarantees additive totals equal the visible column sum while
/// shares keep their independently blended total.
#[component]
pub fn BrandMatrix(
    /// Metric the matrix is showing (active card, defaulting to volume).
    #[prop(into)]
    metric: Signal<KpiKey>,
) -> impl IntoView {
    let ctx = use_dashboard();
    let client = use_api_client();

    let tree = RwSignal::new(DrillTree::new());
    let loading = RwSignal::new(false);
    let error_msg = RwSignal::new(None::<String>);

    // Reload roots when the selection or the displayed metric changes.
    Effect::new(move |_| {
        let filters = ctx.snapshot();
        let kpi = metric.get();
        let generation = ctx.generation();
        let client = client.get_value();
        loading.set(true);
        error_msg.set(None);
        spawn_local(async move {
            let anchor = api::anchor_for(&client, &filters);
            let outcome = api::fetch_brand_columns(
                &client,
                kpi,
                &brand_codes(),
                GroupBy::Region,
                &filters,
                &anchor,
                filters.scope,
            )
            .await;
            if !ctx.is_current(generation) {
                log::debug!("discarding stale brand matrix response");
                return;
            }
            match outcome {
                Ok(rows) => {
                    tree.update(|t| {
                        t.set_roots(
                            DrillLevel::Region,
                            rows.into_iter().map(seed_cells).collect(),
                        )
                    });
                }
                Err(err) => {
                    log::error!("brand matrix load failed: {}", err);
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
        let kpi = metric.get_untracked();
        let generation = ctx.generation();
        let scoped = tree.with_untracked(|t| t.scoped_filters(ticket.node, &filters));
        let client = client.get_value();
        spawn_local(async move {
            let anchor = api::anchor_for(&client, &scoped);
            let outcome = api::fetch_brand_columns(
                &client,
                kpi,
                &brand_codes(),
                child_level.group_by(),
                &scoped,
                &anchor,
                scoped.scope,
            )
            .await;
            if !ctx.is_current(generation) {
                return;
            }
            match outcome {
                Ok(rows) => {
                    tree.update(|t| {
                        t.apply_children(ticket, rows.into_iter().map(seed_cells).collect());
                    });
                }
                Err(err) => {
                    log::error!("brand drill fetch failed: {}", err);
                    tree.update(|t| {
                        t.apply_error(ticket, err.to_string());
                    });
                }
            }
        });
    });

    let header = move || {
        let kpi = metric.get();
        let mut labels: Vec<String> = BRANDS.iter().map(|(_, name)| (*name).to_string()).collect();
        labels.push("TOTAL".to_string());
        view! {
            <div class="brand-matrix__header">
                <div class="brand-matrix__name">{format!("{} by Brand", kpi.label())}</div>
                {labels
                    .into_iter()
                    .map(|label| view! { <div class="brand-matrix__col-label">{label}</div> })
                    .collect_view()}
            </div>
        }
    };

    let body = move || {
        let kpi = metric.get();
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
                            <span class="brand-matrix__row-error" title=message.clone()>
                                "load failed \u{2014} click to retry"
                            </span>
                        }),
                        _ => None,
                    };
                    let cells = node
                        .cells
                        .iter()
                        .map(|cell| {
                            let pct = delta_pct(cell.current, cell.prior);
                            view! {
                                <div class="brand-matrix__cell">
                                    <div class="brand-matrix__value">
                                        {format_metric(kpi, cell.current)}
                                    </div>
                                    <div class={if pct >= 0.0 {
                                        "brand-matrix__delta brand-matrix__delta--up"
                                    } else {
                                        "brand-matrix__delta brand-matrix__delta--down"
                                    }}>
                                        {format_delta(pct)}
                                    </div>
                                </div>
                            }
                        })
                        .collect_view();
                    Some(view! {
                        <div
                            class={if depth == 0 { "brand-matrix__row" } else { "brand-matrix__row brand-matrix__row--sub" }}
                            on:click=move |_| on_toggle.run(id)
                        >
                            <div
                                class="brand-matrix__name"
                                style=format!("padding-left: {}px;", 4 + depth * 18)
                            >
                                <span class="brand-matrix__chevron">{chevron}</span>
                                {name}
                                {error_note}
                            </div>
                            {cells}
                        </div>
                    })
                })
                .collect_view()
        })
    };

    view! {
        <div class="brand-matrix">
            <div class="brand-matrix__title">"Brand Performance"</div>
            <div class="brand-matrix__subtitle">"Columns sum into TOTAL for additive KPIs"</div>

            {move || error_msg.get().map(|msg| view! {
                <div class="alert alert--error">{msg}</div>
            })}
            {move || {
                if loading.get() {
                    Some(view! { <div class="brand-matrix__loading">"Loading\u{2026}"</div> })
                } else {
                    None
                }
            }}

            {header}
            {body}
        </div>
    }
}
