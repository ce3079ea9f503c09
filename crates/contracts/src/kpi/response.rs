use serde::{Deserialize, Serialize};

/// Tabular payload of a successful KPI query.
///
/// Each inner vector is one row: column 0 is the group/period key, column 1
/// the current-period value, column 2 the prior-year value. Columns 1 and 2
/// may be absent for scalar responses; values arrive as numeric strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub data_array: Vec<Vec<String>>,
}

/// Envelope returned by the query endpoint.
///
/// `ok: true` carries `result`; `ok: false` carries `error` (and optionally
/// `details`). The transport client folds non-2xx and unparseable bodies into
/// this same shape before the core ever sees them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<QueryResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

// ---------------------------------------------------------------------------
// Filter options endpoint
// ---------------------------------------------------------------------------

/// Request for the distinct values of one filter dimension, optionally
/// narrowed to the selected months.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterOptionsRequest {
    pub dimension: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub months: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterOptionsResponse {
    pub ok: bool,
    #[serde(default)]
    pub options: Vec<FilterOption>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_envelope() {
        let json = r#"{"ok":true,"result":{"data_array":[["202501","100","90"],["202502","110","100"]]}}"#;
        let resp: QueryResponse = serde_json::from_str(json).unwrap();
        assert!(resp.ok);
        let result = resp.result.unwrap();
        assert_eq!(result.data_array.len(), 2);
        assert_eq!(result.data_array[0], vec!["202501", "100", "90"]);
    }

    #[test]
    fn test_parse_failure_envelope() {
        let json = r#"{"ok":false,"error":"warehouse query failed","details":"timeout"}"#;
        let resp: QueryResponse = serde_json::from_str(json).unwrap();
        assert!(!resp.ok);
        assert_eq!(resp.error.as_deref(), Some("warehouse query failed"));
        assert!(resp.result.is_none());
    }

    #[test]
    fn test_parse_scalar_and_empty() {
        // Scalar: one row, one column.
        let resp: QueryResponse =
            serde_json::from_str(r#"{"ok":true,"result":{"data_array":[["12345.6"]]}}"#).unwrap();
        assert_eq!(resp.result.unwrap().data_array, vec![vec!["12345.6"]]);

        // Missing data_array defaults to empty: "no data" is a valid outcome.
        let resp: QueryResponse = serde_json::from_str(r#"{"ok":true,"result":{}}"#).unwrap();
        assert!(resp.result.unwrap().data_array.is_empty());
    }
}
