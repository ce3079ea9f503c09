use leptos::prelude::*;

use crate::shared::kpi::filter_state::{FilterDimension, FilterState};
use contracts::kpi::TimeScope;

/// Dashboard-wide selection state, provided once via Leptos context.
///
/// The filter state itself is a plain struct; request construction always
/// works on a `snapshot()` so it stays a pure function of its inputs. Every
/// mutation bumps the generation counter: a fetch captures the generation it
/// was issued under and its completion is discarded when the counter has
/// moved on, which covers both cancellation and out-of-order arrival.
#[derive(Clone, Copy)]
pub struct DashboardContext {
    pub filters: RwSignal<FilterState>,
    generation: RwSignal<u64>,
}

impl DashboardContext {
    pub fn new() -> Self {
        Self {
            filters: RwSignal::new(FilterState::default()),
            generation: RwSignal::new(0),
        }
    }

    /// Reactive read used by effects that re-fetch on any selection change.
    pub fn snapshot(&self) -> FilterState {
        self.filters.get()
    }

    /// Non-reactive read for event handlers.
    pub fn snapshot_untracked(&self) -> FilterState {
        self.filters.get_untracked()
    }

    pub fn set_filter(&self, dim: FilterDimension, values: Vec<String>) {
        self.filters.update(|f| f.set_filter(dim, values));
        self.bump();
    }

    pub fn clear_filters(&self) {
        self.filters.update(|f| f.clear_filters());
        self.bump();
    }

    pub fn set_periods(&self, periods: Vec<String>) {
        self.filters.update(|f| f.selected_periods = periods);
        self.bump();
    }

    pub fn set_scope(&self, scope: TimeScope) {
        self.filters.update(|f| f.scope = scope);
        self.bump();
    }

    pub fn set_include_ao(&self, include_ao: bool) {
        self.filters.update(|f| f.include_ao = include_ao);
        self.bump();
    }

    fn bump(&self) {
        self.generation.update(|g| *g += 1);
    }

    /// Generation a fetch should capture at issue time.
    pub fn generation(&self) -> u64 {
        self.generation.get_untracked()
    }

    /// Is a captured generation still the live one?
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.get_untracked() == generation
    }
}

impl Default for DashboardContext {
    fn default() -> Self {
        Self::new()
    }
}

pub fn use_dashboard() -> DashboardContext {
    use_context::<DashboardContext>().expect("DashboardContext not provided")
}

// ---------------------------------------------------------------------------
// Display name side channel
// ---------------------------------------------------------------------------

const DEFAULT_FIRST_NAME: &str = "Traveler";

/// First name shown in the top bar greeting. Priority: page-injected
/// `window.APP_USER.firstName`, then the localStorage fallback, then the
/// default. Persisted back for session continuity. Display only, no auth.
pub fn user_first_name() -> String {
    let Some(window) = web_sys::window() else {
        return DEFAULT_FIRST_NAME.to_string();
    };

    let injected = js_sys::Reflect::get(&window, &wasm_bindgen::JsValue::from_str("APP_USER"))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
        .and_then(|user| {
            js_sys::Reflect::get(&user, &wasm_bindgen::JsValue::from_str("firstName")).ok()
        })
        .and_then(|v| v.as_string())
        .filter(|s| !s.is_empty());

    let storage = window.local_storage().ok().flatten();
    let stored = storage
        .as_ref()
        .and_then(|s| s.get_item("firstName").ok().flatten())
        .filter(|s| !s.is_empty());

    let first_name = injected
        .or(stored)
        .unwrap_or_else(|| DEFAULT_FIRST_NAME.to_string());

    if let Some(storage) = storage {
        let _ = storage.set_item("firstName", &first_name);
    }
    first_name
}
