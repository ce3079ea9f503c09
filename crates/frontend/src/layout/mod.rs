pub mod global_context;
pub mod top_bar;

use leptos::prelude::*;
use top_bar::TopBar;

/// Application shell: top bar over a single scrolling content area.
///
/// ```text
/// +------------------------------------------+
/// |                 TopBar                    |
/// +------------------------------------------+
/// |                 Content                   |
/// +------------------------------------------+
/// ```
#[component]
pub fn Shell(children: Children) -> impl IntoView {
    view! {
        <div class="app-layout">
            <TopBar />
            <main class="app-main">
                {children()}
            </main>
        </div>
    }
}
