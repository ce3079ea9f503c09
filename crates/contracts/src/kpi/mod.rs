use serde::{Deserialize, Serialize};

mod request;
mod response;

pub use request::{KpiFilters, KpiRequest, CONTRACT_VERSION};
pub use response::{
    FilterOption, FilterOptionsRequest, FilterOptionsResponse, QueryResponse, QueryResult,
};

// ---------------------------------------------------------------------------
// Metric keys & classification
// ---------------------------------------------------------------------------

/// KPI identifier understood by the query service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiKey {
    Volume,
    Revenue,
    Share,
    Pods,
    Taps,
    Displays,
    Avd,
    Adshare,
}

/// Whether a metric's grand total may be computed by summing its per-group
/// values, or must be fetched independently (blended shares, averages).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Additivity {
    Additive,
    NonAdditive,
}

/// Display unit for a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiUnit {
    Bbl,
    Usd,
    Pct,
    Count,
    Index,
}

impl KpiKey {
    /// All metrics in dashboard display order.
    pub const ALL: [KpiKey; 8] = [
        KpiKey::Volume,
        KpiKey::Revenue,
        KpiKey::Share,
        KpiKey::Pods,
        KpiKey::Taps,
        KpiKey::Displays,
        KpiKey::Avd,
        KpiKey::Adshare,
    ];

    /// Fixed classification table. Not derived from data.
    pub fn additivity(&self) -> Additivity {
        match self {
            KpiKey::Volume
            | KpiKey::Revenue
            | KpiKey::Pods
            | KpiKey::Taps
            | KpiKey::Displays => Additivity::Additive,
            KpiKey::Share | KpiKey::Adshare | KpiKey::Avd => Additivity::NonAdditive,
        }
    }

    pub fn is_additive(&self) -> bool {
        self.additivity() == Additivity::Additive
    }

    pub fn unit(&self) -> KpiUnit {
        match self {
            KpiKey::Volume => KpiUnit::Bbl,
            KpiKey::Revenue => KpiUnit::Usd,
            KpiKey::Share | KpiKey::Adshare => KpiUnit::Pct,
            KpiKey::Pods | KpiKey::Taps | KpiKey::Displays => KpiUnit::Count,
            KpiKey::Avd => KpiUnit::Index,
        }
    }

    /// Wire name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            KpiKey::Volume => "volume",
            KpiKey::Revenue => "revenue",
            KpiKey::Share => "share",
            KpiKey::Pods => "pods",
            KpiKey::Taps => "taps",
            KpiKey::Displays => "displays",
            KpiKey::Avd => "avd",
            KpiKey::Adshare => "adshare",
        }
    }

    /// Column/card label.
    pub fn label(&self) -> &'static str {
        match self {
            KpiKey::Volume => "Volume",
            KpiKey::Revenue => "Net Revenue",
            KpiKey::Share => "Share",
            KpiKey::Pods => "PODs",
            KpiKey::Taps => "TAPs",
            KpiKey::Displays => "Displays",
            KpiKey::Avd => "AVD",
            KpiKey::Adshare => "Ad Share",
        }
    }
}

// ---------------------------------------------------------------------------
// Request dimensions
// ---------------------------------------------------------------------------

/// Grouping dimension for a KPI query: one row per distinct value of this
/// dimension (or one scalar row for `Total`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Time,
    Region,
    State,
    Wholesaler,
    Megabrand,
    Channel,
    Total,
}

/// Time scope toggle for display figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeScope {
    Mtd,
    Ytd,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_additivity_table() {
        assert_eq!(KpiKey::Volume.additivity(), Additivity::Additive);
        assert_eq!(KpiKey::Revenue.additivity(), Additivity::Additive);
        assert_eq!(KpiKey::Pods.additivity(), Additivity::Additive);
        assert_eq!(KpiKey::Taps.additivity(), Additivity::Additive);
        assert_eq!(KpiKey::Displays.additivity(), Additivity::Additive);
        assert_eq!(KpiKey::Share.additivity(), Additivity::NonAdditive);
        assert_eq!(KpiKey::Adshare.additivity(), Additivity::NonAdditive);
        assert_eq!(KpiKey::Avd.additivity(), Additivity::NonAdditive);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&KpiKey::Adshare).unwrap(), "\"adshare\"");
        assert_eq!(serde_json::to_string(&GroupBy::Megabrand).unwrap(), "\"megabrand\"");
        assert_eq!(serde_json::to_string(&TimeScope::Ytd).unwrap(), "\"YTD\"");
        for kpi in KpiKey::ALL {
            let json = serde_json::to_string(&kpi).unwrap();
            assert_eq!(json, format!("\"{}\"", kpi.as_str()));
        }
    }

    #[test]
    fn test_unknown_kpi_rejected() {
        assert!(serde_json::from_str::<KpiKey>("\"margin\"").is_err());
    }
}
