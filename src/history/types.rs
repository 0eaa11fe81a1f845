//! History record types

use crate::depth::{BookLadder, DepthSnapshot, Instrument};
use crate::flow::FlowMetrics;
use crate::signal::FlowSignal;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Levels per side kept on each record for display
pub const LADDER_LEVELS: usize = 10;

/// One analyzed poll cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    /// Poll cycle number for the instrument, starting at 1
    pub sequence: u64,
    pub instrument: Instrument,
    pub timestamp: DateTime<Utc>,
    pub ltp: Decimal,
    pub metrics: FlowMetrics,
    pub signal: FlowSignal,
    /// Top of both ladders at capture time
    pub ladder: BookLadder,
}

impl FlowRecord {
    /// Build a record from the snapshot it was computed on
    pub fn new(
        sequence: u64,
        snapshot: &DepthSnapshot,
        metrics: FlowMetrics,
        signal: FlowSignal,
    ) -> Self {
        Self {
            sequence,
            instrument: snapshot.instrument.clone(),
            timestamp: snapshot.captured_at,
            ltp: snapshot.ltp,
            metrics,
            signal,
            ladder: snapshot.ladder(LADDER_LEVELS),
        }
    }

    /// Delta point for this record, if it carries a delta
    pub fn delta_point(&self) -> Option<DeltaPoint> {
        self.metrics.delta.map(|d| DeltaPoint {
            timestamp: self.timestamp,
            bid_delta: d.bid_delta,
            ask_delta: d.ask_delta,
            net_flow: d.net_flow,
        })
    }
}

/// Flow delta at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaPoint {
    pub timestamp: DateTime<Utc>,
    pub bid_delta: Decimal,
    pub ask_delta: Decimal,
    pub net_flow: Decimal,
}
