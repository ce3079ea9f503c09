use serde::{Deserialize, Serialize};

use super::{GroupBy, KpiKey, TimeScope};

/// Version tag carried in every outbound KPI request.
pub const CONTRACT_VERSION: &str = "kpi_request.v1";

/// Filter payload of a KPI request. A dimension is omitted entirely when
/// unconstrained; the "ALL" sentinel never appears on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub megabrand: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wholesaler_id: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<Vec<String>>,
    /// Include the extended ("all other") product set. Always explicit.
    #[serde(default)]
    pub include_ao: bool,
}

/// One parameterized KPI query. Immutable; constructed fresh per fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiRequest {
    pub contract_version: String,
    pub kpi: KpiKey,
    #[serde(rename = "groupBy")]
    pub group_by: GroupBy,
    /// Anchor period, `YYYYMM`.
    pub max_month: String,
    pub scope: TimeScope,
    pub filters: KpiFilters,
}

impl KpiRequest {
    pub fn new(
        kpi: KpiKey,
        group_by: GroupBy,
        max_month: String,
        scope: TimeScope,
        filters: KpiFilters,
    ) -> Self {
        Self {
            contract_version: CONTRACT_VERSION.to_string(),
            kpi,
            group_by,
            max_month,
            scope,
            filters,
        }
    }

    /// Canonical serialized form, used as the de-duplication key by the
    /// transport client. Field order is fixed by the struct definition, so
    /// equal requests serialize identically.
    pub fn dedupe_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let req = KpiRequest::new(
            KpiKey::Volume,
            GroupBy::Time,
            "202506".to_string(),
            TimeScope::Ytd,
            KpiFilters {
                megabrand: Some(vec!["MUL".to_string()]),
                include_ao: true,
                ..Default::default()
            },
        );
        let json: serde_json::Value = serde_json::to_value(&req).unwrap();
        assert_eq!(json["contract_version"], "kpi_request.v1");
        assert_eq!(json["kpi"], "volume");
        assert_eq!(json["groupBy"], "time");
        assert_eq!(json["max_month"], "202506");
        assert_eq!(json["scope"], "YTD");
        assert_eq!(json["filters"]["megabrand"][0], "MUL");
        assert_eq!(json["filters"]["include_ao"], true);
        // Unconstrained dimensions must be absent, not empty or "ALL".
        assert!(json["filters"].get("region").is_none());
        assert!(json["filters"].get("wholesaler_id").is_none());
    }

    #[test]
    fn test_dedupe_key_stable() {
        let mk = || {
            KpiRequest::new(
                KpiKey::Share,
                GroupBy::Region,
                "202503".to_string(),
                TimeScope::Mtd,
                KpiFilters::default(),
            )
        };
        assert_eq!(mk().dedupe_key(), mk().dedupe_key());

        let other = KpiRequest::new(
            KpiKey::Share,
            GroupBy::Region,
            "202504".to_string(),
            TimeScope::Mtd,
            KpiFilters::default(),
        );
        assert_ne!(mk().dedupe_key(), other.dedupe_key());
    }
}
