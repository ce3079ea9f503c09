use leptos::prelude::*;

use super::number_format::format_delta;
use crate::shared::icons::icon;

fn delta_class(pct: f64) -> &'static str {
    if pct > 0.0 {
        "stat-card__delta stat-card__delta--up"
    } else if pct < 0.0 {
        "stat-card__delta stat-card__delta--down"
    } else {
        "stat-card__delta stat-card__delta--flat"
    }
}

/// One KPI headline card. Clicking toggles the metric as the active one
/// (drives the trend drawer and matrix highlighting).
#[component]
pub fn StatCard(
    /// Card label, e.g. "VOLUME"
    label: String,
    /// Icon name from the icon() helper (metric wire name)
    icon_name: String,
    /// Formatted display value (None = loading or no data)
    #[prop(into)]
    value: Signal<Option<String>>,
    /// MTD change vs LY, percent
    #[prop(into)]
    mtd_delta: Signal<Option<f64>>,
    /// YTD change vs LY, percent
    #[prop(into)]
    ytd_delta: Signal<Option<f64>>,
    /// Fetch failure for this card only
    #[prop(into)]
    error: Signal<Option<String>>,
    #[prop(into)]
    active: Signal<bool>,
    on_click: Callback<()>,
) -> impl IntoView {
    let card_class = move || {
        if active.get() {
            "stat-card stat-card--active"
        } else {
            "stat-card"
        }
    };

    let value_view = move || match value.get() {
        Some(v) => v,
        None => "\u{2014}".to_string(),
    };

    let chip = |prefix: &'static str, delta: Signal<Option<f64>>| {
        move || {
            delta.get().map(|pct| {
                view! {
                    <span class=delta_class(pct)>
                        {format!("{} {}", prefix, format_delta(pct))}
                    </span>
                }
            })
        }
    };
    let mtd_chip = chip("MTD", mtd_delta);
    let ytd_chip = chip("YTD", ytd_delta);

    let error_view = move || {
        error.get().map(|message| {
            view! { <div class="stat-card__error" title=message>"loading failed"</div> }
        })
    };

    view! {
        <div class=card_class on:click=move |_| on_click.run(())>
            <div class="stat-card__icon">{icon(&icon_name)}</div>
            <div class="stat-card__content">
                <div class="stat-card__label">{label}</div>
                <div class="stat-card__value">{value_view}</div>
                <div class="stat-card__deltas">
                    {mtd_chip}
                    {ytd_chip}
                </div>
                {error_view}
            </div>
        </div>
    }
}
