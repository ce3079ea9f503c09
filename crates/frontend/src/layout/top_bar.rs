use leptos::prelude::*;

use super::global_context::user_first_name;

/// Top bar: product title and the display-name greeting. The name comes from
/// a page-injected value or localStorage; there is no real authentication.
#[component]
pub fn TopBar() -> impl IntoView {
    let first_name = user_first_name();

    view! {
        <header class="top-bar">
            <div class="top-bar__brand">
                <span class="top-bar__mark">"\u{25a0}"</span>
                <span class="top-bar__title">"Mission Control"</span>
                <span class="top-bar__subtitle">"Executive Summary"</span>
            </div>
            <div class="top-bar__user">
                {format!("Welcome back, {}", first_name)}
            </div>
        </header>
    }
}
