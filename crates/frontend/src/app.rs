use leptos::prelude::*;

use crate::dashboards::ExecutiveSummaryDashboard;
use crate::layout::global_context::DashboardContext;
use crate::layout::Shell;
use crate::shared::api_client::{provide_api_client, ApiClient, DashboardConfig};

#[component]
pub fn App() -> impl IntoView {
    // Provide the selection state to the whole app via context.
    provide_context(DashboardContext::new());

    // Endpoint configuration is injected by the hosting page. Without it no
    // KPI can load, so this failure is page-wide, not per-widget.
    match DashboardConfig::from_window() {
        Ok(config) => {
            provide_api_client(ApiClient::new(config));
            view! {
                <Shell>
                    <ExecutiveSummaryDashboard />
                </Shell>
            }
            .into_any()
        }
        Err(err) => {
            log::error!("{}", err);
            view! {
                <div class="config-error">
                    <strong>"Dashboard unavailable: "</strong>
                    {err.to_string()}
                </div>
            }
            .into_any()
        }
    }
}
