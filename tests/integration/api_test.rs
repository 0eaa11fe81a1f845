//! HTTP API tests driven through the router

use super::support::{book, FailingSource, ScriptedSource};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use orderflow::api::{router, AppState};
use orderflow::config::MonitorConfig;
use orderflow::depth::DepthSource;
use orderflow::monitor::MonitoringRegistry;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn bullish_source() -> Arc<ScriptedSource> {
    Arc::new(ScriptedSource::new(vec![
        book(
            &[(dec!(100), dec!(40)), (dec!(99), dec!(30))],
            &[(dec!(101), dec!(25)), (dec!(102), dec!(10))],
        ),
        book(
            &[(dec!(100), dec!(50)), (dec!(99), dec!(30))],
            &[(dec!(101), dec!(20)), (dec!(102), dec!(10))],
        ),
    ]))
}

fn build_app(source: Arc<dyn DepthSource>) -> (Router, Arc<MonitoringRegistry>) {
    let registry = Arc::new(MonitoringRegistry::with_defaults(source));
    let state = AppState::new(Arc::clone(&registry), MonitorConfig::default());
    (router(state), registry)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn test_health() {
    let (app, _) = build_app(bullish_source());
    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_unknown_instrument_reads_are_empty() {
    let (app, _) = build_app(bullish_source());

    let (status, body) = get(&app, "/api/current_data/999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let (_, body) = get(&app, "/api/delta_data/999").await;
    assert_eq!(body, json!([]));

    let (_, body) = get(&app, "/api/summary/999").await;
    assert_eq!(body, json!({}));

    let (_, body) = get(&app, "/api/instruments").await;
    assert_eq!(body, json!([]));
}

#[tokio::test(start_paused = true)]
async fn test_start_poll_read_stop() {
    let source = bullish_source();
    let (app, registry) = build_app(source.clone());

    let (status, body) = post(
        &app,
        "/api/start_monitoring",
        json!({"security_id": "53216", "exchange": "NSE_FO", "interval": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "started");
    assert_eq!(body["message"], "Monitoring started for NSE_FNO:53216");

    tokio::time::sleep(Duration::from_millis(1500)).await;

    let (_, current) = get(&app, "/api/current_data/53216").await;
    assert_eq!(current["signal"], "BULLISH_FLOW");
    assert_eq!(current["sequence"], 2);
    assert_eq!(current["netFlow"], json!(15.0));
    assert_eq!(current["orderBook"]["bids"].as_array().unwrap().len(), 2);
    assert_eq!(current["largeOrders"]["largeBids"], 0);

    let (_, deltas) = get(&app, "/api/delta_data/53216").await;
    let deltas = deltas.as_array().unwrap();
    assert_eq!(deltas.len(), 1);
    assert_eq!(deltas[0]["net_flow"], json!(15.0));

    let (_, summary) = get(&app, "/api/summary/53216?lookback_minutes=5").await;
    assert_eq!(summary["period_minutes"], 5);
    assert_eq!(summary["data_points"], 2);
    assert_eq!(summary["dominant_signal"], "BULLISH_FLOW");
    assert_eq!(summary["total_net_flow"], json!(15.0));
    assert!(summary["avg_imbalance_ratio"].is_f64());

    let (_, listing) = get(&app, "/api/instruments").await;
    assert_eq!(listing[0]["security_id"], "53216");
    assert_eq!(listing[0]["segment"], "NSE_FNO");
    assert_eq!(listing[0]["monitoring"], true);
    assert_eq!(listing[0]["records"], 2);

    let (_, body) = post(&app, "/api/stop_monitoring", json!({"security_id": "53216"})).await;
    assert_eq!(body["status"], "stopped");

    let (_, body) = post(&app, "/api/stop_monitoring", json!({"security_id": "53216"})).await;
    assert_eq!(body["status"], "not_running");

    // History survives the stop
    let (_, current) = get(&app, "/api/current_data/53216").await;
    assert_eq!(current["sequence"], 2);
    assert!(!registry.is_running("53216").await);
}

#[tokio::test(start_paused = true)]
async fn test_double_start_reports_already_running() {
    let source = bullish_source();
    let (app, registry) = build_app(source.clone());
    let request = json!({"security_id": "53216", "interval": 1});

    let (_, first) = post(&app, "/api/start_monitoring", request.clone()).await;
    let (_, second) = post(&app, "/api/start_monitoring", request).await;
    assert_eq!(first["status"], "started");
    assert_eq!(second["status"], "already_running");

    tokio::time::sleep(Duration::from_millis(4500)).await;
    registry.shutdown().await;

    assert_eq!(source.calls(), 5);
    let (_, current) = get(&app, "/api/current_data/53216").await;
    assert_eq!(current["sequence"], 5);
}

#[tokio::test]
async fn test_start_defaults_from_config() {
    let (app, registry) = build_app(bullish_source());

    let (status, _) = post(&app, "/api/start_monitoring", json!({"security_id": "777"})).await;
    assert_eq!(status, StatusCode::OK);

    let listing = registry.instruments().await;
    assert_eq!(listing[0].segment, orderflow::depth::Segment::NseFno);
    registry.shutdown().await;
}

#[tokio::test]
async fn test_start_rejects_bad_input() {
    let (app, registry) = build_app(bullish_source());

    let (status, body) = post(
        &app,
        "/api/start_monitoring",
        json!({"security_id": "53216", "interval": 0}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("interval"));

    let (status, body) = post(
        &app,
        "/api/start_monitoring",
        json!({"security_id": "53216", "exchange": "LSE"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("LSE"));

    let (status, body) = post(&app, "/api/start_monitoring", json!({"exchange": "NSE_EQ"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    assert_eq!(registry.running_count().await, 0);
}

#[tokio::test]
async fn test_summary_rejects_bad_lookback() {
    let (app, _) = build_app(bullish_source());
    let (status, body) = get(&app, "/api/summary/53216?lookback_minutes=abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test(start_paused = true)]
async fn test_failing_broker_keeps_api_healthy() {
    let (app, registry) = build_app(Arc::new(FailingSource));

    let (_, body) = post(
        &app,
        "/api/start_monitoring",
        json!({"security_id": "53216", "interval": 1}),
    )
    .await;
    assert_eq!(body["status"], "started");

    tokio::time::sleep(Duration::from_secs(3)).await;

    assert!(registry.is_running("53216").await);
    let (status, body) = get(&app, "/api/current_data/53216").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    registry.shutdown().await;
}
