use contracts::kpi::{GroupBy, KpiKey, KpiRequest, TimeScope};

use super::filter_state::FilterState;

/// Anchor period for a period selection: the most recent (lexicographically
/// greatest, since `YYYYMM` sorts naturally) selected period. `None` when
/// nothing is selected; callers substitute the configured default anchor.
pub fn anchor_period(selected: &[String]) -> Option<String> {
    selected.iter().max().cloned()
}

/// Build the canonical request for one KPI fetch. Pure: same inputs, same
/// request. Malformed metric or grouping values cannot occur, both are closed
/// enums.
pub fn build_request(
    kpi: KpiKey,
    group_by: GroupBy,
    filters: &FilterState,
    anchor: &str,
    scope: TimeScope,
) -> KpiRequest {
    KpiRequest::new(kpi, group_by, anchor.to_string(), scope, filters.payload())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::kpi::filter_state::FilterDimension;

    #[test]
    fn test_anchor_is_most_recent_selected() {
        let periods = vec![
            "202503".to_string(),
            "202512".to_string(),
            "202501".to_string(),
        ];
        assert_eq!(anchor_period(&periods).as_deref(), Some("202512"));
        assert_eq!(anchor_period(&[]), None);
    }

    #[test]
    fn test_anchor_crosses_year_boundary() {
        let periods = vec!["202512".to_string(), "202601".to_string()];
        assert_eq!(anchor_period(&periods).as_deref(), Some("202601"));
    }

    #[test]
    fn test_build_request_snapshot() {
        let mut filters = FilterState::default();
        filters.set_filter(FilterDimension::Megabrand, vec!["BDL".to_string()]);
        filters.include_ao = true;

        let req = build_request(
            KpiKey::Revenue,
            GroupBy::Region,
            &filters,
            "202506",
            TimeScope::Mtd,
        );
        assert_eq!(req.contract_version, "kpi_request.v1");
        assert_eq!(req.kpi, KpiKey::Revenue);
        assert_eq!(req.group_by, GroupBy::Region);
        assert_eq!(req.max_month, "202506");
        assert_eq!(req.scope, TimeScope::Mtd);
        assert_eq!(req.filters.megabrand, Some(vec!["BDL".to_string()]));
        assert!(req.filters.include_ao);

        // Mutating the state afterwards must not affect the built request.
        filters.set_filter(FilterDimension::Megabrand, vec!["ALL".to_string()]);
        assert_eq!(req.filters.megabrand, Some(vec!["BDL".to_string()]));
    }
}
