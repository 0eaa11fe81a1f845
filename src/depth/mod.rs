//! Market depth module
//!
//! Normalized depth snapshots and the broker quote client that produces them

mod client;
mod instrument;
mod snapshot;

pub use client::{DhanClient, DhanConfig, FetchError};
pub use instrument::{Instrument, Segment, UnknownSegment};
pub use snapshot::{BookLadder, DepthSnapshot};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price level in the market depth ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel {
    /// Price at this level
    pub price: Decimal,
    /// Total resting quantity
    pub quantity: Decimal,
    /// Number of resting orders (0 when the broker does not report it)
    #[serde(default)]
    pub orders: u32,
}

impl DepthLevel {
    /// Create a level without an order count
    pub fn new(price: Decimal, quantity: Decimal) -> Self {
        Self {
            price,
            quantity,
            orders: 0,
        }
    }
}

/// Trait for market depth sources
#[async_trait]
pub trait DepthSource: Send + Sync {
    /// Fetch one depth snapshot for an instrument
    async fn fetch_depth(&self, instrument: &Instrument) -> Result<DepthSnapshot, FetchError>;
}
