use contracts::kpi::{FilterOption, TimeScope};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::collections::HashSet;
use thaw::*;

use crate::layout::global_context::{use_dashboard, DashboardContext};
use crate::shared::api_client::use_api_client;
use crate::shared::components::period_selector::PeriodSelector;
use crate::shared::date_utils::periods_through;
use crate::shared::icons::icon;
use crate::shared::kpi::{FilterDimension, ALL_SENTINEL};

/// One dimension's multi-select, fed by the filter-options endpoint with an
/// "ALL" entry prepended. Checking "ALL" collapses the dimension back to
/// unconstrained.
#[component]
fn DimensionFilter(dim: FilterDimension) -> impl IntoView {
    let ctx = use_dashboard();
    let client = use_api_client();

    let options = RwSignal::new(Vec::<FilterOption>::new());
    let selected: RwSignal<HashSet<String>> = RwSignal::new(HashSet::new());

    // Load options on mount and whenever the period selection changes: the
    // available wholesalers/brands depend on the months in view. The memo
    // keeps unrelated filter edits from re-fetching options.
    let months = Memo::new(move |_| ctx.filters.with(|f| f.selected_periods.clone()));
    Effect::new(move |_| {
        let months = months.get();
        let client = client.get_value();
        spawn_local(async move {
            match client.fetch_filter_options(dim.wire_name(), &months).await {
                Ok(fetched) => options.set(fetched),
                Err(err) => {
                    log::warn!("filter options for {} failed: {}", dim.wire_name(), err)
                }
            }
        });
    });

    // Push checkbox changes into the dashboard state. Publishing only when
    // the value actually differs keeps the mount run and sync echoes from
    // bumping the fetch generation.
    Effect::new(move |_| {
        let mut values: Vec<String> = selected.get().into_iter().collect();
        values.sort();

        if values.iter().any(|v| v == ALL_SENTINEL) {
            // Collapse to unconstrained; the echo run publishes the clear.
            selected.set(HashSet::new());
            return;
        }
        let mut current = ctx.filters.with_untracked(|f| f.values(dim).to_vec());
        current.sort();
        if values != current {
            ctx.set_filter(dim, values);
        }
    });

    // Mirror outside changes (the Clear button) back into the checkboxes.
    Effect::new(move |_| {
        let from_ctx: HashSet<String> =
            ctx.filters.with(|f| f.values(dim).iter().cloned().collect());
        if selected.with_untracked(|s| *s != from_ctx) {
            selected.set(from_ctx);
        }
    });

    view! {
        <div class="filter-bar__dimension">
            <div class="filter-bar__dimension-label">{dim.label()}</div>
            <CheckboxGroup value=selected>
                <div class="filter-bar__options">
                    <Checkbox value=ALL_SENTINEL.to_string() label=format!("All {}s", dim.label()) />
                    {move || options.get().into_iter().map(|option| {
                        view! {
                            <Checkbox value=option.value label=option.label />
                        }
                    }).collect_view()}
                </div>
            </CheckboxGroup>
        </div>
    }
}

fn scope_button(ctx: DashboardContext, scope: TimeScope, label: &'static str) -> impl IntoView {
    view! {
        <button
            class=move || {
                if ctx.filters.with(|f| f.scope) == scope {
                    "filter-bar__scope-btn filter-bar__scope-btn--active"
                } else {
                    "filter-bar__scope-btn"
                }
            }
            on:click=move |_| ctx.set_scope(scope)
        >
            {label}
        </button>
    }
}

/// Filter bar: period multi-select, MTD/YTD toggle, extended-product-set
/// toggle and the five dimension filters.
#[component]
pub fn FilterBar() -> impl IntoView {
    let ctx = use_dashboard();
    let client = use_api_client();

    let available_periods = periods_through(&client.get_value().config().default_anchor());
    let selected_periods = Signal::derive(move || ctx.filters.with(|f| f.selected_periods.clone()));
    let on_periods = Callback::new(move |periods: Vec<String>| ctx.set_periods(periods));

    let active_count = Signal::derive(move || ctx.filters.with(|f| f.active_filter_count()));

    view! {
        <div class="filter-bar">
            <div class="filter-bar__row">
                <span class="filter-bar__icon">{icon("filter")}</span>
                <span class="filter-bar__title">"Filters"</span>
                {move || {
                    let count = active_count.get();
                    if count > 0 {
                        Some(view! { <span class="badge badge--primary">{count}</span> })
                    } else {
                        None
                    }
                }}
                <button class="filter-bar__clear" on:click=move |_| ctx.clear_filters()>
                    "Clear"
                </button>

                <div class="filter-bar__scope">
                    {scope_button(ctx, TimeScope::Mtd, "MTD")}
                    {scope_button(ctx, TimeScope::Ytd, "YTD")}
                </div>

                <label class="filter-bar__ao">
                    <input
                        type="checkbox"
                        prop:checked=move || ctx.filters.with(|f| f.include_ao)
                        on:change=move |ev| ctx.set_include_ao(event_target_checked(&ev))
                    />
                    "Include AO brands"
                </label>
            </div>

            <PeriodSelector
                available=Signal::derive(move || available_periods.clone())
                selected=selected_periods
                on_change=on_periods
            />

            <div class="filter-bar__dimensions">
                {FilterDimension::ALL
                    .into_iter()
                    .map(|dim| view! { <DimensionFilter dim=dim /> })
                    .collect_view()}
            </div>
        </div>
    }
}
