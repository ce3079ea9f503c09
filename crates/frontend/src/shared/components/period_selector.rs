use leptos::prelude::*;

use crate::shared::date_utils::month_label;

/// Month multi-select: one toggle button per available period. An empty
/// selection means "default anchor" (the most recent period).
#[component]
pub fn PeriodSelector(
    /// Selectable periods, ascending `YYYYMM`
    #[prop(into)]
    available: Signal<Vec<String>>,
    /// Currently selected periods
    #[prop(into)]
    selected: Signal<Vec<String>>,
    /// Called with the full new selection on every toggle
    on_change: Callback<Vec<String>>,
) -> impl IntoView {
    view! {
        <div class="period-selector">
            {move || {
                available
                    .get()
                    .into_iter()
                    .map(|period| {
                        let is_selected = {
                            let period = period.clone();
                            move || selected.get().iter().any(|p| *p == period)
                        };
                        let label = month_label(&period);
                        let toggle = {
                            let period = period.clone();
                            move |_| {
                                let mut next = selected.get_untracked();
                                if let Some(idx) = next.iter().position(|p| *p == period) {
                                    next.remove(idx);
                                } else {
                                    next.push(period.clone());
                                    next.sort();
                                }
                                on_change.run(next);
                            }
                        };
                        view! {
                            <button
                                class=move || {
                                    if is_selected() {
                                        "period-selector__month period-selector__month--selected"
                                    } else {
                                        "period-selector__month"
                                    }
                                }
                                on:click=toggle
                            >
                                {label}
                            </button>
                        }
                    })
                    .collect_view()
            }}
        </div>
    }
}
