//! Flow classification
//!
//! Scored voting over the flow metrics:
//! - Imbalance outside the dead zone: 2 votes
//! - Net flow sign: 1 vote
//! - Large order count majority: 1 vote
//!
//! A side wins only when it leads by more than one vote.

use super::{FlowSignal, SignalScore};
use crate::flow::FlowMetrics;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::cmp::Ordering;

const IMBALANCE_VOTES: u8 = 2;
const NET_FLOW_VOTES: u8 = 1;
const LARGE_ORDER_VOTES: u8 = 1;

/// Lead a side needs over the other to produce a directional signal
const HYSTERESIS_MARGIN: u8 = 1;

/// Imbalance thresholds for the classifier
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Imbalance above which bids win the imbalance vote
    pub bullish_imbalance: Decimal,
    /// Imbalance below which asks win the imbalance vote
    pub bearish_imbalance: Decimal,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            bullish_imbalance: dec!(1.5),
            bearish_imbalance: dec!(0.67),
        }
    }
}

/// Classifies flow metrics into a [`FlowSignal`]
#[derive(Debug, Clone, Default)]
pub struct FlowClassifier {
    config: ClassifierConfig,
}

impl FlowClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Tally votes for each side
    ///
    /// A missing delta votes as a net flow of zero.
    pub fn score(&self, metrics: &FlowMetrics) -> SignalScore {
        let mut score = SignalScore::default();

        if metrics.imbalance_ratio.exceeds(self.config.bullish_imbalance) {
            score.bullish += IMBALANCE_VOTES;
        } else if metrics.imbalance_ratio.below(self.config.bearish_imbalance) {
            score.bearish += IMBALANCE_VOTES;
        }

        match metrics.net_flow_or_zero().cmp(&Decimal::ZERO) {
            Ordering::Greater => score.bullish += NET_FLOW_VOTES,
            Ordering::Less => score.bearish += NET_FLOW_VOTES,
            Ordering::Equal => {}
        }

        let large = &metrics.large_orders;
        match large.large_bid_count.cmp(&large.large_ask_count) {
            Ordering::Greater => score.bullish += LARGE_ORDER_VOTES,
            Ordering::Less => score.bearish += LARGE_ORDER_VOTES,
            Ordering::Equal => {}
        }

        score
    }

    /// Classify metrics into a signal
    pub fn classify(&self, metrics: &FlowMetrics) -> FlowSignal {
        let score = self.score(metrics);

        if score.bullish > score.bearish + HYSTERESIS_MARGIN {
            FlowSignal::BullishFlow
        } else if score.bearish > score.bullish + HYSTERESIS_MARGIN {
            FlowSignal::BearishFlow
        } else {
            FlowSignal::NeutralFlow
        }
    }
}
