//! Depth snapshot state

use super::{DepthLevel, Instrument};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One reading of the market depth for an instrument
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthSnapshot {
    /// Instrument this reading belongs to
    pub instrument: Instrument,
    /// Last traded price
    pub ltp: Decimal,
    /// Bid levels, sorted best (highest) to worst
    pub bids: Vec<DepthLevel>,
    /// Ask levels, sorted best (lowest) to worst
    pub asks: Vec<DepthLevel>,
    /// When the reading was taken
    pub captured_at: DateTime<Utc>,
}

impl DepthSnapshot {
    /// Create a new empty snapshot
    pub fn new(instrument: Instrument) -> Self {
        Self {
            instrument,
            ltp: Decimal::ZERO,
            bids: vec![],
            asks: vec![],
            captured_at: Utc::now(),
        }
    }

    /// Whether both ladders are empty
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Top `levels` of each side for display
    pub fn ladder(&self, levels: usize) -> BookLadder {
        BookLadder {
            bids: self.bids.iter().take(levels).copied().collect(),
            asks: self.asks.iter().take(levels).copied().collect(),
        }
    }
}

/// Truncated view of both sides of the book
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLadder {
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
}
