//! Transport client for the KPI query service.
//!
//! Wraps `gloo-net` with a bounded deadline, in-flight de-duplication of
//! identical requests and a typed error discriminant, so the KPI core never
//! inspects HTTP status codes or raw bodies.

use contracts::kpi::{
    FilterOption, FilterOptionsRequest, FilterOptionsResponse, KpiRequest, QueryResponse,
    QueryResult,
};
use futures::future::{LocalBoxFuture, Shared};
use futures::FutureExt;
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::{provide_context, use_context, LocalStorage, StoredValue};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;
use wasm_bindgen::JsValue;
use web_sys::AbortController;

/// Default fetch deadline.
pub const DEFAULT_TIMEOUT_MS: u32 = 12_000;

/// Name of the page-injected configuration global.
pub const CONFIG_GLOBAL: &str = "__EXEC_DASH_CONFIG__";

/// Failure of a single fetch. Isolated to the widget that issued it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("request failed (HTTP {status}): {message}")]
    Http { status: u16, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("service error: {message}")]
    Api {
        message: String,
        details: Option<String>,
    },
}

/// Missing or unusable endpoint configuration. Unlike a `TransportError`
/// this is fatal for the whole dashboard: no KPI can load without it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("dashboard is not configured: {0}")]
pub struct ConfigError(pub String);

/// Endpoint configuration injected by the hosting page as
/// `window.__EXEC_DASH_CONFIG__ = { queryUrl, filtersUrl?, latestPeriod?, timeoutMs? }`.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub query_url: String,
    pub filters_url: Option<String>,
    /// Most recent period known to the warehouse, `YYYYMM`. Used as the
    /// default anchor when no period is selected.
    pub latest_period: Option<String>,
    pub timeout_ms: u32,
}

impl DashboardConfig {
    pub fn from_window() -> Result<Self, ConfigError> {
        let window =
            web_sys::window().ok_or_else(|| ConfigError("window is not available".to_string()))?;
        let raw = js_sys::Reflect::get(&window, &JsValue::from_str(CONFIG_GLOBAL))
            .map_err(|_| ConfigError(format!("window.{} is not readable", CONFIG_GLOBAL)))?;
        if raw.is_undefined() || raw.is_null() {
            return Err(ConfigError(format!(
                "window.{} is missing",
                CONFIG_GLOBAL
            )));
        }

        let get_str = |key: &str| -> Option<String> {
            js_sys::Reflect::get(&raw, &JsValue::from_str(key))
                .ok()
                .and_then(|v| v.as_string())
                .filter(|s| !s.is_empty())
        };
        let query_url = get_str("queryUrl")
            .ok_or_else(|| ConfigError("queryUrl is missing from the config".to_string()))?;
        let timeout_ms = js_sys::Reflect::get(&raw, &JsValue::from_str("timeoutMs"))
            .ok()
            .and_then(|v| v.as_f64())
            .map(|v| v as u32)
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        Ok(Self {
            query_url,
            filters_url: get_str("filtersUrl"),
            latest_period: get_str("latestPeriod"),
            timeout_ms,
        })
    }

    /// Anchor substituted when no period is selected: the configured latest
    /// warehouse period, else the current calendar month.
    pub fn default_anchor(&self) -> String {
        match &self.latest_period {
            Some(period) => period.clone(),
            None => chrono::Utc::now().format("%Y%m").to_string(),
        }
    }
}

type SharedFetch = Shared<LocalBoxFuture<'static, Result<QueryResult, TransportError>>>;

/// Context handle for the client. The client itself holds `Rc`s and is not
/// `Send`, so it lives in local storage and only the `Copy` handle travels
/// through context and into effect closures.
pub type ApiClientHandle = StoredValue<ApiClient, LocalStorage>;

pub fn provide_api_client(client: ApiClient) {
    provide_context::<ApiClientHandle>(StoredValue::new_local(client));
}

pub fn use_api_client() -> ApiClientHandle {
    use_context::<ApiClientHandle>().expect("ApiClient not provided")
}

/// HTTP client for the KPI endpoints. Cheap to clone; clones share the
/// in-flight table.
#[derive(Clone)]
pub struct ApiClient {
    config: Rc<DashboardConfig>,
    in_flight: Rc<RefCell<HashMap<String, SharedFetch>>>,
}

impl ApiClient {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config: Rc::new(config),
            in_flight: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Issue one KPI query. Identical concurrent requests (same endpoint and
    /// serialized payload) share a single in-flight fetch; the table entry is
    /// removed when the fetch settles, so a later identical request starts a
    /// fresh one.
    pub async fn post_query(&self, request: &KpiRequest) -> Result<QueryResult, TransportError> {
        let body = request.dedupe_key();
        let key = format!("{}::{}", self.config.query_url, body);

        let existing = self.in_flight.borrow().get(&key).cloned();
        if let Some(shared) = existing {
            return shared.await;
        }

        let shared: SharedFetch = {
            let url = self.config.query_url.clone();
            let timeout_ms = self.config.timeout_ms;
            let in_flight = Rc::clone(&self.in_flight);
            let key = key.clone();
            async move {
                let outcome = send_json(&url, body, timeout_ms).await;
                in_flight.borrow_mut().remove(&key);
                match outcome {
                    Ok((status, text)) => decode_query_response(status, &text),
                    Err(err) => Err(err),
                }
            }
            .boxed_local()
            .shared()
        };
        self.in_flight.borrow_mut().insert(key, shared.clone());
        shared.await
    }

    /// Fetch the distinct values of one filter dimension. Absent endpoint
    /// configuration yields an empty option list, not an error: the filter
    /// simply stays free-text-less.
    pub async fn fetch_filter_options(
        &self,
        dimension: &str,
        months: &[String],
    ) -> Result<Vec<FilterOption>, TransportError> {
        let Some(url) = self.config.filters_url.clone() else {
            return Ok(Vec::new());
        };
        let request = FilterOptionsRequest {
            dimension: dimension.to_string(),
            months: months.to_vec(),
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| TransportError::Malformed(e.to_string()))?;
        let (status, text) = send_json(&url, body, self.config.timeout_ms).await?;
        decode_filter_options(status, &text)
    }
}

/// POST a JSON body and return `(status, body text)`. Transport-level
/// failures (network, abort, deadline) are already folded into
/// `TransportError` here; status interpretation is left to the decoders.
async fn send_json(
    url: &str,
    body: String,
    timeout_ms: u32,
) -> Result<(u16, String), TransportError> {
    let controller = AbortController::new().ok();
    let signal = controller.as_ref().map(|c| c.signal());

    let request = Request::post(url)
        .header("Content-Type", "application/json")
        .abort_signal(signal.as_ref())
        .body(body)
        .map_err(|e| TransportError::Network(e.to_string()))?;

    let send = request.send().fuse();
    let deadline = TimeoutFuture::new(timeout_ms).fuse();
    futures::pin_mut!(send, deadline);

    let response = futures::select! {
        res = send => res.map_err(|e| TransportError::Network(e.to_string()))?,
        _ = deadline => {
            if let Some(controller) = &controller {
                controller.abort();
            }
            log::warn!("KPI request to {} exceeded {}ms deadline", url, timeout_ms);
            return Err(TransportError::Timeout);
        }
    };

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| TransportError::Network(e.to_string()))?;
    Ok((status, text))
}

/// Fold an HTTP status + body into the typed query result. Non-2xx,
/// unparseable JSON and `ok: false` all become `TransportError` variants.
fn decode_query_response(status: u16, text: &str) -> Result<QueryResult, TransportError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<QueryResponse>(text)
            .ok()
            .and_then(|r| r.error)
            .unwrap_or_else(|| format!("request failed ({})", status));
        return Err(TransportError::Http { status, message });
    }

    let envelope: QueryResponse =
        serde_json::from_str(text).map_err(|e| TransportError::Malformed(e.to_string()))?;
    if !envelope.ok {
        return Err(TransportError::Api {
            message: envelope
                .error
                .unwrap_or_else(|| "service reported a failure".to_string()),
            details: envelope.details,
        });
    }
    Ok(envelope.result.unwrap_or_default())
}

fn decode_filter_options(status: u16, text: &str) -> Result<Vec<FilterOption>, TransportError> {
    if !(200..300).contains(&status) {
        return Err(TransportError::Http {
            status,
            message: format!("request failed ({})", status),
        });
    }
    let envelope: FilterOptionsResponse =
        serde_json::from_str(text).map_err(|e| TransportError::Malformed(e.to_string()))?;
    if !envelope.ok {
        return Err(TransportError::Api {
            message: "filter options request failed".to_string(),
            details: None,
        });
    }
    Ok(envelope.options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_success() {
        let result = decode_query_response(
            200,
            r#"{"ok":true,"result":{"data_array":[["202501","1","2"]]}}"#,
        )
        .unwrap();
        assert_eq!(result.data_array.len(), 1);
    }

    #[test]
    fn test_decode_missing_result_is_empty() {
        let result = decode_query_response(200, r#"{"ok":true}"#).unwrap();
        assert!(result.data_array.is_empty());
    }

    #[test]
    fn test_decode_service_failure() {
        let err = decode_query_response(
            200,
            r#"{"ok":false,"error":"warehouse busy","details":"queue full"}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            TransportError::Api {
                message: "warehouse busy".to_string(),
                details: Some("queue full".to_string()),
            }
        );
    }

    #[test]
    fn test_decode_http_failure_uses_body_message() {
        let err = decode_query_response(502, r#"{"ok":false,"error":"upstream down"}"#)
            .unwrap_err();
        assert_eq!(
            err,
            TransportError::Http {
                status: 502,
                message: "upstream down".to_string(),
            }
        );

        // Unparseable error body still yields a usable message.
        let err = decode_query_response(500, "<html>oops</html>").unwrap_err();
        assert!(matches!(err, TransportError::Http { status: 500, .. }));
    }

    #[test]
    fn test_decode_malformed_body() {
        let err = decode_query_response(200, "not json").unwrap_err();
        assert!(matches!(err, TransportError::Malformed(_)));
    }

    #[test]
    fn test_decode_filter_options() {
        let options = decode_filter_options(
            200,
            r#"{"ok":true,"options":[{"label":"Northeast","value":"NE"}]}"#,
        )
        .unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].value, "NE");
    }
}
