//! Signal types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Directional classification of order flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowSignal {
    /// Buying pressure dominates
    BullishFlow,
    /// Selling pressure dominates
    BearishFlow,
    /// No side leads by more than the hysteresis margin
    NeutralFlow,
}

impl FlowSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowSignal::BullishFlow => "BULLISH_FLOW",
            FlowSignal::BearishFlow => "BEARISH_FLOW",
            FlowSignal::NeutralFlow => "NEUTRAL_FLOW",
        }
    }

    /// Bullish or bearish
    pub fn is_directional(&self) -> bool {
        !matches!(self, FlowSignal::NeutralFlow)
    }
}

impl fmt::Display for FlowSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Votes cast by the classifier for each side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignalScore {
    pub bullish: u8,
    pub bearish: u8,
}
