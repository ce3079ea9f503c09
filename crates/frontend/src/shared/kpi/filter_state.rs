use contracts::kpi::{KpiFilters, TimeScope};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Sentinel option value meaning "no constraint". Never sent to the service.
pub const ALL_SENTINEL: &str = "ALL";

/// Megabrand display name -> request code, used when a dropdown reports the
/// display name instead of the code.
pub static BRAND_CODES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("MICHELOB ULTRA", "MUL"),
        ("BUD LIGHT", "BDL"),
        ("BUSCH LIGHT", "BHL"),
        ("BUDWEISER", "BUD"),
        ("STELLA ARTOIS", "STA"),
        ("NUTRL", "NUTRL"),
        ("KONA BIG WAVE", "KGA"),
        ("CUTWATER", "CWFM"),
    ])
});

/// Categorical filter dimensions of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterDimension {
    Megabrand,
    Region,
    State,
    Wholesaler,
    Channel,
}

impl FilterDimension {
    pub const ALL: [FilterDimension; 5] = [
        FilterDimension::Megabrand,
        FilterDimension::Region,
        FilterDimension::State,
        FilterDimension::Wholesaler,
        FilterDimension::Channel,
    ];

    /// Name used by the filter-options endpoint.
    pub fn wire_name(&self) -> &'static str {
        match self {
            FilterDimension::Megabrand => "megabrand",
            FilterDimension::Region => "region",
            FilterDimension::State => "state",
            FilterDimension::Wholesaler => "wholesaler_id",
            FilterDimension::Channel => "channel",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterDimension::Megabrand => "Brand",
            FilterDimension::Region => "Region",
            FilterDimension::State => "State",
            FilterDimension::Wholesaler => "Wholesaler",
            FilterDimension::Channel => "Channel",
        }
    }
}

/// Full selection state of the dashboard. Plain data: request construction is
/// a pure function of a `FilterState` snapshot, never of ambient context.
///
/// Empty vector = "all values" for that dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub megabrand: Vec<String>,
    pub region: Vec<String>,
    pub state: Vec<String>,
    pub wholesaler: Vec<String>,
    pub channel: Vec<String>,
    /// Selected periods, `YYYYMM`. Empty = default anchor.
    pub selected_periods: Vec<String>,
    pub scope: TimeScope,
    pub include_ao: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            megabrand: Vec::new(),
            region: Vec::new(),
            state: Vec::new(),
            wholesaler: Vec::new(),
            channel: Vec::new(),
            selected_periods: Vec::new(),
            scope: TimeScope::Ytd,
            include_ao: false,
        }
    }
}

impl FilterState {
    pub fn values(&self, dim: FilterDimension) -> &[String] {
        match dim {
            FilterDimension::Megabrand => &self.megabrand,
            FilterDimension::Region => &self.region,
            FilterDimension::State => &self.state,
            FilterDimension::Wholesaler => &self.wholesaler,
            FilterDimension::Channel => &self.channel,
        }
    }

    fn values_mut(&mut self, dim: FilterDimension) -> &mut Vec<String> {
        match dim {
            FilterDimension::Megabrand => &mut self.megabrand,
            FilterDimension::Region => &mut self.region,
            FilterDimension::State => &mut self.state,
            FilterDimension::Wholesaler => &mut self.wholesaler,
            FilterDimension::Channel => &mut self.channel,
        }
    }

    /// Replace the selection for one dimension. The "ALL" sentinel, alone or
    /// anywhere in the list, collapses the dimension to unconstrained.
    /// Megabrand display names are translated to request codes.
    pub fn set_filter(&mut self, dim: FilterDimension, values: Vec<String>) {
        if values.iter().any(|v| v == ALL_SENTINEL) {
            self.values_mut(dim).clear();
            return;
        }
        let values = if dim == FilterDimension::Megabrand {
            values
                .into_iter()
                .map(|v| match BRAND_CODES.get(v.as_str()) {
                    Some(code) => (*code).to_string(),
                    None => v,
                })
                .collect()
        } else {
            values
        };
        *self.values_mut(dim) = values;
    }

    /// Reset the categorical dimensions; periods, scope and the AO toggle are
    /// separate controls and survive a filter reset.
    pub fn clear_filters(&mut self) {
        for dim in FilterDimension::ALL {
            self.values_mut(dim).clear();
        }
    }

    pub fn is_unconstrained(&self, dim: FilterDimension) -> bool {
        self.values(dim).is_empty()
    }

    pub fn active_filter_count(&self) -> usize {
        FilterDimension::ALL
            .iter()
            .filter(|d| !self.is_unconstrained(**d))
            .count()
    }

    /// Copy of this state with `dim` narrowed to exactly `key`. Used when a
    /// drill row fans out into its children: the child scope intersects the
    /// parent scope, it never widens it.
    pub fn scoped(&self, dim: FilterDimension, key: &str) -> Self {
        let mut scoped = self.clone();
        *scoped.values_mut(dim) = vec![key.to_string()];
        scoped
    }

    /// Wire payload for a KPI request. Unconstrained dimensions are omitted.
    pub fn payload(&self) -> KpiFilters {
        fn some_if_nonempty(v: &[String]) -> Option<Vec<String>> {
            if v.is_empty() {
                None
            } else {
                Some(v.to_vec())
            }
        }
        KpiFilters {
            megabrand: some_if_nonempty(&self.megabrand),
            region: some_if_nonempty(&self.region),
            state: some_if_nonempty(&self.state),
            wholesaler_id: some_if_nonempty(&self.wholesaler),
            channel: some_if_nonempty(&self.channel),
            include_ao: self.include_ao,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_sentinel_collapses() {
        let mut state = FilterState::default();
        state.set_filter(FilterDimension::Region, vec!["NE".to_string()]);
        assert_eq!(state.region, vec!["NE"]);

        state.set_filter(FilterDimension::Region, vec!["ALL".to_string()]);
        assert!(state.region.is_empty());

        // Sentinel inside a list also collapses.
        state.set_filter(
            FilterDimension::Region,
            vec!["NE".to_string(), "ALL".to_string()],
        );
        assert!(state.region.is_empty());
    }

    #[test]
    fn test_brand_name_maps_to_code() {
        let mut state = FilterState::default();
        state.set_filter(
            FilterDimension::Megabrand,
            vec!["MICHELOB ULTRA".to_string(), "CWFM".to_string()],
        );
        assert_eq!(state.megabrand, vec!["MUL", "CWFM"]);
    }

    #[test]
    fn test_payload_omits_unconstrained() {
        let mut state = FilterState::default();
        state.set_filter(FilterDimension::Channel, vec!["grocery".to_string()]);
        let payload = state.payload();
        assert_eq!(payload.channel, Some(vec!["grocery".to_string()]));
        assert!(payload.megabrand.is_none());
        assert!(payload.region.is_none());
        assert!(!payload.include_ao);
    }

    #[test]
    fn test_scoped_narrows_single_dimension() {
        let mut state = FilterState::default();
        state.set_filter(FilterDimension::Megabrand, vec!["BDL".to_string()]);
        let scoped = state.scoped(FilterDimension::Region, "MW");
        assert_eq!(scoped.region, vec!["MW"]);
        // Parent constraints are preserved.
        assert_eq!(scoped.megabrand, vec!["BDL"]);
        // Original untouched.
        assert!(state.region.is_empty());
    }

    #[test]
    fn test_clear_keeps_time_controls() {
        let mut state = FilterState::default();
        state.set_filter(FilterDimension::State, vec!["TX".to_string()]);
        state.selected_periods = vec!["202504".to_string()];
        state.include_ao = true;
        state.clear_filters();
        assert!(state.state.is_empty());
        assert_eq!(state.selected_periods, vec!["202504"]);
        assert!(state.include_ao);
        assert_eq!(state.active_filter_count(), 0);
    }
}
