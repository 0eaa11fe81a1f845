//! Order flow metric types

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Failure to compute a metric
///
/// Distinct from a legitimately zero result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("arithmetic overflow computing {metric}")]
    Overflow { metric: &'static str },
}

/// A non-negative ratio that may be unbounded
///
/// `Unbounded` stands for a zero denominator: all visible liquidity sits
/// on the numerator side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ratio {
    Finite(Decimal),
    Unbounded,
}

impl Ratio {
    /// `numerator / denominator`, unbounded when the denominator is zero
    pub fn of(
        numerator: Decimal,
        denominator: Decimal,
        metric: &'static str,
    ) -> Result<Self, FlowError> {
        if denominator.is_zero() {
            return Ok(Ratio::Unbounded);
        }
        numerator
            .checked_div(denominator)
            .map(Ratio::Finite)
            .ok_or(FlowError::Overflow { metric })
    }

    /// Finite value, if any
    pub fn finite(&self) -> Option<Decimal> {
        match self {
            Ratio::Finite(v) => Some(*v),
            Ratio::Unbounded => None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Ratio::Unbounded)
    }

    /// Strictly greater than `threshold` (always true when unbounded)
    pub fn exceeds(&self, threshold: Decimal) -> bool {
        match self {
            Ratio::Finite(v) => *v > threshold,
            Ratio::Unbounded => true,
        }
    }

    /// Strictly less than `threshold` (never true when unbounded)
    pub fn below(&self, threshold: Decimal) -> bool {
        match self {
            Ratio::Finite(v) => *v < threshold,
            Ratio::Unbounded => false,
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Finite(v) => write!(f, "{}", v.round_dp(2)),
            Ratio::Unbounded => f.write_str("inf"),
        }
    }
}

impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Ratio::Finite(v) => Serialize::serialize(v, serializer),
            Ratio::Unbounded => serializer.serialize_str("inf"),
        }
    }
}

/// `serialize_with` helper: finite ratios as JSON numbers, unbounded as `"inf"`
pub fn ratio_as_float<S: Serializer>(ratio: &Ratio, serializer: S) -> Result<S::Ok, S::Error> {
    match ratio.finite().and_then(|v| v.to_f64()) {
        Some(v) => serializer.serialize_f64(v),
        None => serializer.serialize_str("inf"),
    }
}

impl<'de> Deserialize<'de> for Ratio {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) if s.eq_ignore_ascii_case("inf") || s.eq_ignore_ascii_case("infinity") => {
                Ok(Ratio::Unbounded)
            }
            Repr::Text(s) => Decimal::from_str(&s)
                .map(Ratio::Finite)
                .map_err(serde::de::Error::custom),
            Repr::Number(n) => Decimal::try_from(n)
                .map(Ratio::Finite)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Volume-weighted average price per side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedPrices {
    pub weighted_bid: Decimal,
    pub weighted_ask: Decimal,
    /// `weighted_ask - weighted_bid`; negative on a crossed book
    pub spread: Decimal,
}

/// Large resting order detection per side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LargeOrders {
    pub large_bid_count: usize,
    pub large_ask_count: usize,
    pub avg_bid_size: Decimal,
    pub avg_ask_size: Decimal,
    pub max_bid_size: Decimal,
    pub max_ask_size: Decimal,
}

/// Top-of-book quantity relative to deeper levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthConcentration {
    pub bid_ratio: Ratio,
    pub ask_ratio: Ratio,
    pub top_bid_qty: Decimal,
    pub top_ask_qty: Decimal,
    pub deep_bid_qty: Decimal,
    pub deep_ask_qty: Decimal,
}

/// Change in resting quantity between consecutive snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowDelta {
    pub bid_delta: Decimal,
    pub ask_delta: Decimal,
    /// `bid_delta - ask_delta`
    pub net_flow: Decimal,
}

/// All metrics derived from one snapshot (and its predecessor)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowMetrics {
    pub imbalance_ratio: Ratio,
    pub weighted: WeightedPrices,
    pub large_orders: LargeOrders,
    pub concentration: DepthConcentration,
    /// `None` when no previous snapshot existed for the instrument
    pub delta: Option<FlowDelta>,
}

impl FlowMetrics {
    /// Net flow for voting and display; zero when no delta is available
    pub fn net_flow_or_zero(&self) -> Decimal {
        self.delta.map(|d| d.net_flow).unwrap_or(Decimal::ZERO)
    }
}
