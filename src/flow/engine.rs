//! Metric engine

use super::metrics::{self, DEFAULT_LARGE_ORDER_MULTIPLIER, DEFAULT_TOP_LEVELS};
use super::types::{FlowError, FlowMetrics};
use crate::depth::DepthSnapshot;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Configuration for metric computation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Multiple of the mean level size above which a level counts as large
    pub large_order_multiplier: Decimal,
    /// Levels treated as top of book for concentration
    pub top_levels: usize,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            large_order_multiplier: DEFAULT_LARGE_ORDER_MULTIPLIER,
            top_levels: DEFAULT_TOP_LEVELS,
        }
    }
}

/// Computes [`FlowMetrics`] from a snapshot and its predecessor
///
/// Holds configuration only; the previous snapshot lives in a
/// per-instrument [`SnapshotCache`].
#[derive(Debug, Clone, Default)]
pub struct FlowEngine {
    config: FlowConfig,
}

impl FlowEngine {
    /// Create a new engine with the given configuration
    pub fn new(config: FlowConfig) -> Self {
        Self { config }
    }

    /// Compute all metrics for `current`
    ///
    /// `delta` is only populated when `previous` is present.
    pub fn analyze(
        &self,
        current: &DepthSnapshot,
        previous: Option<&DepthSnapshot>,
    ) -> Result<FlowMetrics, FlowError> {
        let delta = previous
            .map(|prev| metrics::delta(current, prev))
            .transpose()?;

        Ok(FlowMetrics {
            imbalance_ratio: metrics::imbalance_ratio(current)?,
            weighted: metrics::weighted_prices(current)?,
            large_orders: metrics::large_orders(current, self.config.large_order_multiplier)?,
            concentration: metrics::depth_concentration(current, self.config.top_levels)?,
            delta,
        })
    }
}

/// Single-slot cache of the last analyzed snapshot for one instrument
#[derive(Debug, Default)]
pub struct SnapshotCache {
    last: Option<DepthSnapshot>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshot from the previous cycle, if any
    pub fn last(&self) -> Option<&DepthSnapshot> {
        self.last.as_ref()
    }

    /// Store `snapshot`, returning the one it replaces
    pub fn replace(&mut self, snapshot: DepthSnapshot) -> Option<DepthSnapshot> {
        self.last.replace(snapshot)
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}
