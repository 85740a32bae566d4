//! # Analytics Service Client
//!
//! The boundary between the dashboard and the analytics service.
//!
//! [`AnalyticsService`] is what the dashboard drives; [`HttpAnalyticsClient`]
//! implements it over the service's REST API:
//!
//! - `GET  /api/analytics/unique/organizations`
//! - `GET  /api/analytics/unique/campaigns?{filters}`
//! - `POST /api/analytics/metrics`

use adscope_core::{MetricsIntent, Payload, Report, ServiceCall, ServiceResponse};
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

const ORGANIZATIONS_PATH: &str = "/api/analytics/unique/organizations";
const CAMPAIGNS_PATH: &str = "/api/analytics/unique/campaigns";
const METRICS_PATH: &str = "/api/analytics/metrics";

// =============================================================================
// ERRORS
// =============================================================================

/// Errors from the HTTP client layer.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Cannot reach the analytics service.
    #[error("Cannot connect to analytics service at {0}")]
    ConnectionFailed(String),

    /// 401 Unauthorized - invalid or missing API key.
    #[error("Unauthorized: invalid or missing API key")]
    Unauthorized,

    /// 429 Too Many Requests.
    #[error("Rate limited: too many requests")]
    RateLimited,

    /// The service refused the request (other 4xx).
    #[error("Request rejected ({0}): {1}")]
    Rejected(u16, String),

    /// Server returned a 5xx error.
    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    /// Failed to parse response body.
    #[error("Parse error: {0}")]
    ParseError(String),
}

// =============================================================================
// SERVICE TRAIT
// =============================================================================

/// Executes the calls the orchestrator asks for.
pub trait AnalyticsService: Send + Sync + 'static {
    fn call(
        &self,
        call: ServiceCall,
    ) -> impl Future<Output = Result<ServiceResponse, ClientError>> + Send;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

/// HTTP client that wraps calls to the analytics REST API.
#[derive(Debug, Clone)]
pub struct HttpAnalyticsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpAnalyticsClient {
    /// Create a client pointing at `base_url` with no request timeout.
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::ConnectionFailed(format!("{base_url}: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request with optional Bearer auth.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method, &url);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    /// Send a request and handle connection errors.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        req.send()
            .await
            .map_err(|e| ClientError::ConnectionFailed(format!("{}: {e}", self.base_url)))
    }

    /// Check status codes and parse the JSON body.
    async fn handle_response(&self, resp: reqwest::Response) -> Result<Value, ClientError> {
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RateLimited);
        }
        if status.is_server_error() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::ServerError(status.as_u16(), body));
        }
        if status.is_client_error() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Rejected(status.as_u16(), body));
        }
        resp.json::<Value>()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))
    }

    /// GET /api/analytics/unique/organizations
    pub async fn organizations(&self) -> Result<Vec<String>, ClientError> {
        let req = self.request(reqwest::Method::GET, ORGANIZATIONS_PATH);
        let resp = self.send(req).await?;
        decode_listing(self.handle_response(resp).await?)
    }

    /// GET /api/analytics/unique/campaigns with the filters as query string.
    pub async fn campaigns(&self, filters: &Payload) -> Result<Vec<String>, ClientError> {
        let req = self
            .request(reqwest::Method::GET, CAMPAIGNS_PATH)
            .query(&filters.query_pairs());
        let resp = self.send(req).await?;
        decode_listing(self.handle_response(resp).await?)
    }

    /// POST /api/analytics/metrics with the payload as JSON body.
    pub async fn metrics(
        &self,
        payload: &Payload,
        intent: MetricsIntent,
    ) -> Result<Report, ClientError> {
        let req = self.request(reqwest::Method::POST, METRICS_PATH).json(payload);
        let resp = self.send(req).await?;
        decode_report(self.handle_response(resp).await?, intent)
    }
}

impl AnalyticsService for HttpAnalyticsClient {
    async fn call(&self, call: ServiceCall) -> Result<ServiceResponse, ClientError> {
        match call {
            ServiceCall::Organizations => self.organizations().await.map(ServiceResponse::Listing),
            ServiceCall::Campaigns(filters) => self
                .campaigns(&filters)
                .await
                .map(ServiceResponse::Listing),
            ServiceCall::Metrics { payload, intent } => self
                .metrics(&payload, intent)
                .await
                .map(ServiceResponse::Report),
        }
    }
}

/// A listing is an array of names; `null` means no entries.
fn decode_listing(body: Value) -> Result<Vec<String>, ClientError> {
    if body.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(body).map_err(|e| ClientError::ParseError(e.to_string()))
}

/// A `null` report means "no data": no candidates, or no sections.
fn decode_report(body: Value, intent: MetricsIntent) -> Result<Report, ClientError> {
    if body.is_null() {
        return Ok(match intent {
            MetricsIntent::Report => Report::Sections(BTreeMap::new()),
            MetricsIntent::Assets | MetricsIntent::Products => Report::Items(Vec::new()),
        });
    }
    serde_json::from_value(body).map_err(|e| ClientError::ParseError(e.to_string()))
}

// =============================================================================
// TESTS
// =============================================================================
