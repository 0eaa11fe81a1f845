//! Order flow metric module
//!
//! Turns depth snapshots into imbalance, weighted price, large order,
//! concentration and delta metrics

mod engine;
pub mod metrics;
mod types;

pub use engine::{FlowConfig, FlowEngine, SnapshotCache};
pub use types::{
    ratio_as_float, DepthConcentration, FlowDelta, FlowError, FlowMetrics, LargeOrders, Ratio,
    WeightedPrices,
};
