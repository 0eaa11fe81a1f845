//! Route handlers

use super::error::ApiError;
use super::view::{DashboardView, DeltaView};
use super::AppState;
use crate::depth::{Instrument, Segment};
use crate::monitor::{InstrumentStatus, StartOutcome, StopOutcome};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

pub const DEFAULT_LOOKBACK_MINUTES: u64 = 30;

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub security_id: String,
    /// Segment code; `NSE_FO` is accepted for `NSE_FNO`
    pub exchange: Option<String>,
    /// Poll interval in seconds
    pub interval: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct StopRequest {
    pub security_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub lookback_minutes: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: String,
}

/// `{}` when there is nothing to show
fn json_or_empty<T: Serialize>(value: Option<T>) -> Response {
    match value {
        Some(v) => Json(v).into_response(),
        None => Json(json!({})).into_response(),
    }
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn start_monitoring(
    State(state): State<AppState>,
    body: Result<Json<StartRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(request) = body?;

    let segment = match request.exchange.as_deref() {
        Some(code) => code.parse::<Segment>()?,
        None => state.defaults.default_segment,
    };
    let interval = request
        .interval
        .map(Duration::from_secs)
        .unwrap_or_else(|| state.defaults.default_interval());
    let instrument = Instrument::new(request.security_id.trim(), segment);

    let response = match state.registry.start(instrument.clone(), interval).await? {
        StartOutcome::Started { .. } => StatusResponse {
            status: "started",
            message: format!("Monitoring started for {}", instrument),
        },
        StartOutcome::AlreadyRunning { instrument } => StatusResponse {
            status: "already_running",
            message: format!("Monitoring already running for {}", instrument),
        },
    };

    Ok(Json(response))
}

pub async fn stop_monitoring(
    State(state): State<AppState>,
    body: Result<Json<StopRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(request) = body?;
    let security_id = request.security_id.trim();

    let response = match state.registry.stop(security_id).await {
        StopOutcome::Stopped => StatusResponse {
            status: "stopped",
            message: format!("Monitoring stopped for {}", security_id),
        },
        StopOutcome::NotRunning => StatusResponse {
            status: "not_running",
            message: format!("No active monitoring for {}", security_id),
        },
    };

    Ok(Json(response))
}

pub async fn current_data(
    State(state): State<AppState>,
    Path(security_id): Path<String>,
) -> Response {
    let latest = state.registry.latest(&security_id).await;
    json_or_empty(latest.as_ref().map(DashboardView::from))
}

pub async fn delta_data(
    State(state): State<AppState>,
    Path(security_id): Path<String>,
) -> Json<Vec<DeltaView>> {
    let series = state.registry.delta_series(&security_id).await;
    Json(series.iter().map(DeltaView::from).collect())
}

pub async fn summary(
    State(state): State<AppState>,
    Path(security_id): Path<String>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let lookback = query.lookback_minutes.unwrap_or(DEFAULT_LOOKBACK_MINUTES);

    let summary = state.registry.summary(&security_id, lookback).await?;
    Ok(json_or_empty(summary))
}

pub async fn instruments(State(state): State<AppState>) -> Json<Vec<InstrumentStatus>> {
    Json(state.registry.instruments().await)
}
