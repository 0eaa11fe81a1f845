//! Dhan market quote client
//!
//! Fetches full market depth from the Dhan `/v2/marketfeed/quote` endpoint
//! and normalizes it into a [`DepthSnapshot`].

use super::{DepthLevel, DepthSnapshot, DepthSource, Instrument};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Dhan API base URL
pub const DHAN_API_URL: &str = "https://api.dhan.co";

/// Path of the full quote (market depth) endpoint
const QUOTE_PATH: &str = "/v2/marketfeed/quote";

/// Errors returned when a depth snapshot cannot be produced
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Quote API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Quote API rejected request: {0}")]
    Rejected(String),

    #[error("Invalid security id: {0}")]
    InvalidSecurityId(String),

    #[error("Not found in quote response: {0}")]
    NotFound(String),

    #[error("Broker credentials are not configured")]
    MissingCredentials,
}

/// Configuration for the Dhan client
#[derive(Debug, Clone)]
pub struct DhanConfig {
    /// Base URL for the Dhan API
    pub base_url: String,
    /// Dhan client id
    pub client_id: String,
    /// Dhan access token
    pub access_token: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for DhanConfig {
    fn default() -> Self {
        Self {
            base_url: DHAN_API_URL.to_string(),
            client_id: String::new(),
            access_token: String::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Client for the Dhan market quote API
pub struct DhanClient {
    config: DhanConfig,
    client: Client,
}

impl DhanClient {
    /// Create a new client
    pub fn with_config(config: DhanConfig) -> Result<Self, FetchError> {
        if config.client_id.is_empty() || config.access_token.is_empty() {
            return Err(FetchError::MissingCredentials);
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { config, client })
    }

    fn quote_url(&self) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), QUOTE_PATH)
    }
}

#[async_trait]
impl DepthSource for DhanClient {
    async fn fetch_depth(&self, instrument: &Instrument) -> Result<DepthSnapshot, FetchError> {
        let body = quote_request_body(instrument)?;

        tracing::debug!(instrument = %instrument, request = %body, "Requesting market depth");

        let response = self
            .client
            .post(self.quote_url())
            .header("access-token", &self.config.access_token)
            .header("client-id", &self.config.client_id)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let payload: Value = response.json().await?;
        let snapshot = parse_quote_response(&payload, instrument, Utc::now())?;

        if snapshot.is_empty() {
            tracing::warn!(instrument = %instrument, "Quote response carried no depth levels");
        }

        tracing::debug!(
            instrument = %instrument,
            bid_levels = snapshot.bids.len(),
            ask_levels = snapshot.asks.len(),
            ltp = %snapshot.ltp,
            "Parsed market depth"
        );

        Ok(snapshot)
    }
}

/// Build the `{"<SEGMENT>": [<id>]}` request body
pub(crate) fn quote_request_body(instrument: &Instrument) -> Result<Value, FetchError> {
    let security_id: u64 = instrument
        .security_id
        .trim()
        .parse()
        .map_err(|_| FetchError::InvalidSecurityId(instrument.security_id.clone()))?;

    let mut body = serde_json::Map::new();
    body.insert(instrument.segment.to_string(), json!([security_id]));
    Ok(Value::Object(body))
}

/// Locate the instrument in a quote response and normalize it
///
/// Accepts both `data.<SEG>.<ID>` and the doubly nested
/// `data.data.<SEG>.<ID>` shape.
pub(crate) fn parse_quote_response(
    payload: &Value,
    instrument: &Instrument,
    captured_at: DateTime<Utc>,
) -> Result<DepthSnapshot, FetchError> {
    if let Some(status) = payload.get("status").and_then(Value::as_str) {
        if !status.eq_ignore_ascii_case("success") {
            let remarks = payload
                .get("remarks")
                .map(|r| r.to_string())
                .unwrap_or_else(|| status.to_string());
            return Err(FetchError::Rejected(remarks));
        }
    }

    let mut data = payload
        .get("data")
        .ok_or_else(|| FetchError::NotFound("data".to_string()))?;
    if let Some(inner) = data.get("data").filter(|v| v.is_object()) {
        data = inner;
    }

    let segment_code = instrument.segment.as_str();
    let segment_data = data.get(segment_code).ok_or_else(|| {
        let available: Vec<&String> = data
            .as_object()
            .map(|m| m.keys().collect())
            .unwrap_or_default();
        tracing::warn!(segment = segment_code, ?available, "Segment missing from quote response");
        FetchError::NotFound(format!("segment {segment_code}"))
    })?;

    let security_data = lookup_security(segment_data, &instrument.security_id).ok_or_else(|| {
        FetchError::NotFound(format!(
            "security {} in {segment_code}",
            instrument.security_id
        ))
    })?;

    let ltp = security_data
        .get("last_price")
        .or_else(|| security_data.get("ltp"))
        .map(|v| decimal_or_zero(v, "ltp"))
        .unwrap_or_default();

    let depth = security_data.get("depth");
    let bids = parse_levels(depth.and_then(|d| d.get("buy")));
    let asks = parse_levels(depth.and_then(|d| d.get("sell")));

    Ok(DepthSnapshot {
        instrument: instrument.clone(),
        ltp,
        bids,
        asks,
        captured_at,
    })
}

/// Security ids may be keyed as given or in canonical integer form
fn lookup_security<'a>(segment_data: &'a Value, security_id: &str) -> Option<&'a Value> {
    let trimmed = security_id.trim();
    segment_data.get(trimmed).or_else(|| {
        let canonical = trimmed.parse::<u64>().ok()?.to_string();
        segment_data.get(canonical.as_str())
    })
}

/// Parse a ladder; absent or non-array ladders are empty
fn parse_levels(levels: Option<&Value>) -> Vec<DepthLevel> {
    let Some(levels) = levels.and_then(Value::as_array) else {
        return vec![];
    };

    levels
        .iter()
        .map(|level| DepthLevel {
            price: level
                .get("price")
                .map(|v| decimal_or_zero(v, "price"))
                .unwrap_or_default(),
            quantity: level
                .get("quantity")
                .map(|v| decimal_or_zero(v, "quantity"))
                .unwrap_or_default(),
            orders: level
                .get("orders")
                .and_then(Value::as_u64)
                .and_then(|o| u32::try_from(o).ok())
                .unwrap_or(0),
        })
        .collect()
}

/// Unparsable numeric fields count as zero so ladder sums stay defined
fn decimal_or_zero(value: &Value, field: &'static str) -> Decimal {
    let parsed = match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        Value::Null => Some(Decimal::ZERO),
        _ => None,
    };

    parsed.unwrap_or_else(|| {
        tracing::warn!(field, value = %value, "Malformed numeric field in depth, using 0");
        Decimal::ZERO
    })
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}
