use leptos::prelude::*;

use crate::shared::date_utils::month_label;
use crate::shared::kpi::PeriodSeries;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 180.0;
const PAD: f64 = 18.0;

fn polyline_points(series: &PeriodSeries, min: f64, max: f64, pick: impl Fn(usize) -> f64) -> String {
    let span = (max - min).max(f64::EPSILON);
    let step = if series.len() > 1 {
        (WIDTH - 2.0 * PAD) / (series.len() - 1) as f64
    } else {
        0.0
    };
    (0..series.len())
        .map(|i| {
            let x = PAD + step * i as f64;
            let y = HEIGHT - PAD - (pick(i) - min) / span * (HEIGHT - 2.0 * PAD);
            format!("{:.1},{:.1}", x, y)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Current-year vs last-year sparkline of a metric's monthly series.
/// Pure view: re-created by the parent whenever the series changes.
#[component]
pub fn TrendChart(title: String, series: PeriodSeries) -> impl IntoView {
    if series.is_empty() {
        return view! {
            <div class="trend-chart trend-chart--empty">"No data for this slice"</div>
        }
        .into_any();
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for row in &series {
        min = min.min(row.current).min(row.prior);
        max = max.max(row.current).max(row.prior);
    }

    let current_points = polyline_points(&series, min, max, |i| series[i].current);
    let prior_points = polyline_points(&series, min, max, |i| series[i].prior);
    let first_label = month_label(&series[0].period);
    let last_label = month_label(&series[series.len() - 1].period);

    view! {
        <div class="trend-chart">
            <div class="trend-chart__header">
                <span class="trend-chart__title">{title}</span>
                <span class="trend-chart__legend">
                    <span class="trend-chart__legend-cy">"CY"</span>
                    <span class="trend-chart__legend-ly">"LY"</span>
                </span>
            </div>
            <svg
                viewBox=format!("0 0 {} {}", WIDTH, HEIGHT)
                preserveAspectRatio="none"
                class="trend-chart__svg"
            >
                <polyline
                    points=prior_points
                    fill="none"
                    stroke="var(--color-text-secondary, #9ca3af)"
                    stroke-width="1.5"
                    stroke-dasharray="4 3"
                />
                <polyline
                    points=current_points
                    fill="none"
                    stroke="var(--color-primary, #2563eb)"
                    stroke-width="2"
                />
            </svg>
            <div class="trend-chart__axis">
                <span>{first_label}</span>
                <span>{last_label}</span>
            </div>
        </div>
    }
    .into_any()
}
