//! Dashboard response shapes

use crate::depth::DepthLevel;
use crate::flow::{ratio_as_float, Ratio};
use crate::history::{DeltaPoint, FlowRecord};
use crate::signal::FlowSignal;
use chrono::{DateTime, Local, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Wall-clock time of day shown on the dashboard
fn clock(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Latest record in the shape the dashboard renders
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    #[serde(with = "rust_decimal::serde::float")]
    pub ltp: Decimal,
    #[serde(serialize_with = "ratio_as_float")]
    pub imbalance_ratio: Ratio,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_flow: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub spread: Decimal,
    pub signal: FlowSignal,
    pub timestamp: String,
    pub sequence: u64,
    pub order_book: OrderBookView,
    pub large_orders: LargeOrdersView,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderBookView {
    pub bids: Vec<LevelView>,
    pub asks: Vec<LevelView>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LevelView {
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LargeOrdersView {
    pub large_bids: usize,
    pub large_asks: usize,
}

impl From<&DepthLevel> for LevelView {
    fn from(level: &DepthLevel) -> Self {
        Self {
            price: level.price,
            quantity: level.quantity,
        }
    }
}

impl From<&FlowRecord> for DashboardView {
    fn from(record: &FlowRecord) -> Self {
        Self {
            ltp: record.ltp,
            imbalance_ratio: record.metrics.imbalance_ratio,
            net_flow: record.metrics.net_flow_or_zero(),
            spread: record.metrics.weighted.spread,
            signal: record.signal,
            timestamp: clock(record.timestamp),
            sequence: record.sequence,
            order_book: OrderBookView {
                bids: record.ladder.bids.iter().map(LevelView::from).collect(),
                asks: record.ladder.asks.iter().map(LevelView::from).collect(),
            },
            large_orders: LargeOrdersView {
                large_bids: record.metrics.large_orders.large_bid_count,
                large_asks: record.metrics.large_orders.large_ask_count,
            },
        }
    }
}

/// One point of the delta chart
#[derive(Debug, Clone, Serialize)]
pub struct DeltaView {
    pub timestamp: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub bid_delta: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub ask_delta: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_flow: Decimal,
}

impl From<&DeltaPoint> for DeltaView {
    fn from(point: &DeltaPoint) -> Self {
        Self {
            timestamp: clock(point.timestamp),
            bid_delta: point.bid_delta,
            ask_delta: point.ask_delta,
            net_flow: point.net_flow,
        }
    }
}
