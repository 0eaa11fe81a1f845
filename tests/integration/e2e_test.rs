//! End-to-end tests against a local stand-in for the broker quote API

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use orderflow::config::Config;
use orderflow::depth::{DepthSource, DhanClient, DhanConfig, FetchError, Instrument, Segment};
use orderflow::monitor::MonitoringRegistry;
use orderflow::signal::FlowSignal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Default)]
struct Broker {
    requests: Arc<AtomicUsize>,
}

async fn quote(
    State(broker): State<Broker>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if headers.get("access-token").is_none() || headers.get("client-id").is_none() {
        return (StatusCode::UNAUTHORIZED, Json(json!({"status": "failure"})));
    }
    if body != json!({"NSE_FNO": [53216]}) {
        return (StatusCode::BAD_REQUEST, Json(json!({"status": "failure"})));
    }

    let n = broker.requests.fetch_add(1, Ordering::SeqCst) as u64;
    let response = json!({
        "status": "success",
        "data": {
            "data": {
                "NSE_FNO": {
                    "53216": {
                        "last_price": 22150.5,
                        "depth": {
                            "buy": [
                                {"price": 22150, "quantity": 500 + 10 * n, "orders": 4},
                                {"price": 22149.5, "quantity": "300", "orders": 2}
                            ],
                            "sell": [
                                {"price": 22151, "quantity": 200, "orders": 3},
                                {"price": 22151.5, "quantity": 100, "orders": 1}
                            ]
                        }
                    }
                }
            }
        }
    });
    (StatusCode::OK, Json(response))
}

async fn empty_depth_quote() -> Json<Value> {
    Json(json!({
        "status": "success",
        "data": {"NSE_FNO": {"53216": {"last_price": 22150.5, "depth": {"buy": [], "sell": []}}}}
    }))
}

async fn failing_quote() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream unavailable")
}

/// Serve `app` on an ephemeral port and return its base URL
async fn spawn_broker(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base_url: String) -> DhanClient {
    DhanClient::with_config(DhanConfig {
        base_url,
        client_id: "1000000001".to_string(),
        access_token: "test-token".to_string(),
        timeout: Duration::from_secs(2),
    })
    .unwrap()
}

#[test]
fn test_config_example_parses() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    assert_eq!(config.monitor.default_segment, Segment::NseFno);
    assert_eq!(config.monitor.default_interval_secs, 2);
    assert_eq!(config.history.max_delta_points, 60);
}

#[tokio::test]
async fn test_client_fetches_and_normalizes_depth() {
    let broker = Broker::default();
    let app = Router::new()
        .route("/v2/marketfeed/quote", post(quote))
        .with_state(broker.clone());
    let client = client(spawn_broker(app).await);

    let snapshot = client
        .fetch_depth(&Instrument::new("53216", Segment::NseFno))
        .await
        .unwrap();

    assert_eq!(snapshot.ltp, dec!(22150.5));
    assert_eq!(snapshot.bids.len(), 2);
    assert_eq!(snapshot.bids[0].quantity, dec!(500));
    assert_eq!(snapshot.bids[1].quantity, dec!(300));
    assert_eq!(snapshot.asks[0].orders, 3);
    assert_eq!(broker.requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_client_accepts_empty_depth() {
    let app = Router::new().route("/v2/marketfeed/quote", post(empty_depth_quote));
    let client = client(spawn_broker(app).await);

    let snapshot = client
        .fetch_depth(&Instrument::new("53216", Segment::NseFno))
        .await
        .unwrap();

    assert!(snapshot.is_empty());
    assert_eq!(snapshot.ltp, dec!(22150.5));
}

#[tokio::test]
async fn test_client_reports_http_status() {
    let app = Router::new().route("/v2/marketfeed/quote", post(failing_quote));
    let client = client(spawn_broker(app).await);

    let err = client
        .fetch_depth(&Instrument::new("53216", Segment::NseFno))
        .await
        .unwrap_err();

    match err {
        FetchError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream unavailable");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_client_rejects_non_numeric_security_id() {
    let client = client("http://127.0.0.1:9".to_string());
    let err = client
        .fetch_depth(&Instrument::new("NIFTY", Segment::NseFno))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::InvalidSecurityId(_)));
}

#[tokio::test]
async fn test_monitoring_against_broker() {
    let broker = Broker::default();
    let app = Router::new()
        .route("/v2/marketfeed/quote", post(quote))
        .with_state(broker.clone());
    let registry = MonitoringRegistry::with_defaults(Arc::new(client(spawn_broker(app).await)));

    registry
        .start(
            Instrument::new("53216", Segment::NseFno),
            Duration::from_millis(50),
        )
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;
    registry.stop("53216").await;

    let after_stop = broker.requests.load(Ordering::SeqCst);
    assert!(after_stop >= 2);

    let latest = registry.latest("53216").await.unwrap();
    assert_eq!(latest.signal, FlowSignal::BullishFlow);
    assert_eq!(latest.ltp, dec!(22150.5));
    assert_eq!(latest.metrics.delta.unwrap().net_flow, dec!(10));

    let summary = registry.summary("53216", 30).await.unwrap().unwrap();
    assert_eq!(summary.data_points as u64, latest.sequence);
    assert_eq!(summary.dominant_signal, FlowSignal::BullishFlow);

    // A request already on the wire may still land; nothing new is sent
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(broker.requests.load(Ordering::SeqCst) <= after_stop + 1);
    assert_eq!(registry.latest("53216").await.unwrap().sequence, latest.sequence);
}
