//! Integration tests for the analytics HTTP client.
//!
//! Runs the client against an in-process axum stub of the analytics service
//! bound to an ephemeral local port.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use adscope::{AnalyticsService, ClientError, Dashboard, HttpAnalyticsClient};
use adscope_core::{
    AssetKind, AssetRef, Collection, Completion, Dimension, FetchOrchestrator, FixedClock, Report,
    Selector, ServiceCall, ServiceResponse,
};
use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::{Value, json};
use std::collections::BTreeMap;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

const ORGANIZATIONS: &str = "/api/analytics/unique/organizations";
const CAMPAIGNS: &str = "/api/analytics/unique/campaigns";
const METRICS: &str = "/api/analytics/metrics";

/// Serve `router` on an ephemeral port and return its base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn orchestrator() -> FetchOrchestrator<FixedClock> {
    FetchOrchestrator::new(FixedClock(NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()))
}

/// Echo the query string back as `key=value` listing entries.
async fn echo_query(Query(params): Query<BTreeMap<String, String>>) -> Json<Vec<String>> {
    Json(params.iter().map(|(k, v)| format!("{k}={v}")).collect())
}

/// Asset intent gets one item; anything else gets the request echoed as a
/// report section.
async fn echo_metrics(Json(body): Json<Value>) -> Json<Value> {
    if body.get("fetch_assets") == Some(&json!(true)) {
        return Json(json!([
            {"_id": "row-1", "type": "image_asset", "value": {"id": "img-1"}}
        ]));
    }
    Json(json!({ "request": body, "conversions": null }))
}

fn stub_service() -> Router {
    Router::new()
        .route(ORGANIZATIONS, get(|| async { Json(json!(["acme", "globex"])) }))
        .route(CAMPAIGNS, get(echo_query))
        .route(METRICS, post(echo_metrics))
}

// =============================================================================
// LISTINGS
// =============================================================================

#[tokio::test]
async fn test_organizations_listing() {
    let client = HttpAnalyticsClient::new(&serve(stub_service()).await, None);

    let organizations = client.organizations().await.unwrap();

    assert_eq!(organizations, vec!["acme".to_string(), "globex".to_string()]);
}

#[tokio::test]
async fn test_null_listing_is_empty() {
    let router = Router::new().route(ORGANIZATIONS, get(|| async { Json(Value::Null) }));
    let client = HttpAnalyticsClient::new(&serve(router).await, None);

    assert!(client.organizations().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_campaign_filters_sent_as_query() {
    let client = HttpAnalyticsClient::new(&serve(stub_service()).await, None);
    let mut orch = orchestrator();
    let request = orch.set_selector(Selector::Brand, "Arti").remove(0);

    let response = client.call(request.call).await.unwrap();

    let ServiceResponse::Listing(params) = response else {
        panic!("campaigns must return a listing");
    };
    assert!(params.contains(&"brand=Arti".to_string()));
    assert!(params.contains(&"channel=facebook".to_string()));
    assert!(params.contains(&"start_date=2016-10-15".to_string()));
    assert!(params.contains(&"end_date=2026-10-15".to_string()));
    assert!(!params.iter().any(|p| p.starts_with("source=")));
}

// =============================================================================
// METRICS
// =============================================================================

#[tokio::test]
async fn test_asset_intent_returns_items() {
    let client = HttpAnalyticsClient::new(&serve(stub_service()).await, None);
    let mut orch = orchestrator();
    let request = orch.set_dimension(Dimension::Gender, "female").remove(0);

    let response = client.call(request.call).await.unwrap();

    let ServiceResponse::Report(Report::Items(items)) = response else {
        panic!("asset intent must return items");
    };
    assert_eq!(items[0].selection_id(), Some("img-1"));
    assert_eq!(
        orch.complete(request.ticket, ServiceResponse::Report(Report::Items(items))),
        Completion::Applied(Collection::Assets)
    );
}

#[tokio::test]
async fn test_submit_posts_full_state() {
    let client = HttpAnalyticsClient::new(&serve(stub_service()).await, None);
    let mut orch = orchestrator();
    orch.set_selector(Selector::Campaign, "spring");
    orch.set_dimension(Dimension::ShowProducts, "show");
    orch.select_asset(AssetRef::new(AssetKind::ImageAsset, "img-1"));
    let request = orch.submit();

    let report = client.call(request.call).await.unwrap();

    let ServiceResponse::Report(Report::Sections(sections)) = report else {
        panic!("report intent must return sections");
    };
    assert!(sections["conversions"].is_none());
    let echoed = sections["request"].as_ref().unwrap();
    assert_eq!(echoed["campaign"], json!("spring"));
    assert_eq!(echoed["show_products"], json!("hide"));
    assert_eq!(echoed["asset"], json!({"type": "image_asset", "id": "img-1"}));
    assert!(!echoed.contains_key("fetch_assets"));
    assert!(!echoed.contains_key("brand"));
}

// =============================================================================
// ERRORS
// =============================================================================

#[tokio::test]
async fn test_status_codes_map_to_errors() {
    let router = Router::new()
        .route(ORGANIZATIONS, get(|| async { StatusCode::UNAUTHORIZED }))
        .route(CAMPAIGNS, get(|| async { StatusCode::TOO_MANY_REQUESTS }))
        .route(
            METRICS,
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        );
    let client = HttpAnalyticsClient::new(&serve(router).await, None);
    let mut orch = orchestrator();

    assert!(matches!(
        client.call(ServiceCall::Organizations).await,
        Err(ClientError::Unauthorized)
    ));

    let campaigns = orch.set_date_range("today").remove(0);
    assert!(matches!(
        client.call(campaigns.call).await,
        Err(ClientError::RateLimited)
    ));

    let submit = orch.submit();
    match client.call(submit.call).await {
        Err(ClientError::ServerError(503, body)) => assert_eq!(body, "maintenance"),
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bad_request_is_rejected() {
    let router = Router::new().route(
        METRICS,
        post(|| async { (StatusCode::BAD_REQUEST, "unknown channel") }),
    );
    let client = HttpAnalyticsClient::new(&serve(router).await, None);

    let result = client.call(orchestrator().submit().call).await;

    assert!(matches!(result, Err(ClientError::Rejected(400, _))));
}

#[tokio::test]
async fn test_unexpected_body_is_parse_error() {
    let router = Router::new().route(ORGANIZATIONS, get(|| async { Json(json!({"a": 1})) }));
    let client = HttpAnalyticsClient::new(&serve(router).await, None);

    assert!(matches!(
        client.organizations().await,
        Err(ClientError::ParseError(_))
    ));
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let router = Router::new().route(
        ORGANIZATIONS,
        get(|headers: HeaderMap| async move {
            match headers.get("authorization").and_then(|v| v.to_str().ok()) {
                Some("Bearer secret") => Ok(Json(json!(["acme"]))),
                _ => Err(StatusCode::UNAUTHORIZED),
            }
        }),
    );
    let base = serve(router).await;

    let anonymous = HttpAnalyticsClient::new(&base, None);
    assert!(matches!(
        anonymous.organizations().await,
        Err(ClientError::Unauthorized)
    ));

    let authorized = HttpAnalyticsClient::new(&base, Some("secret".to_string()));
    assert_eq!(authorized.organizations().await.unwrap(), vec!["acme"]);
}

#[tokio::test]
async fn test_unreachable_service() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpAnalyticsClient::new(&format!("http://{addr}"), None);

    assert!(matches!(
        client.organizations().await,
        Err(ClientError::ConnectionFailed(_))
    ));
}

// =============================================================================
// END TO END
// =============================================================================

#[tokio::test]
async fn test_dashboard_over_http() {
    let client = HttpAnalyticsClient::new(&serve(stub_service()).await, None);
    let mut dashboard = Dashboard::new(orchestrator(), client);

    dashboard.start();
    let failures = dashboard.settle().await;

    assert!(failures.is_empty());
    let collections = dashboard.orchestrator().collections();
    assert_eq!(collections.organizations().map(<[String]>::len), Some(2));
    assert!(collections.campaigns().is_some());
}
