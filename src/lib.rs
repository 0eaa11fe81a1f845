//! orderflow: Order flow monitor for broker market depth
//!
//! This library provides the core components for:
//! - Market depth snapshots from the Dhan quote API
//! - Order flow metrics (imbalance, weighted prices, large orders,
//!   depth concentration, flow delta)
//! - Bullish/bearish/neutral flow classification
//! - Bounded per-instrument history with windowed summaries
//! - Per-instrument polling tasks behind a JSON API
//! - Logging and Prometheus metrics

pub mod api;
pub mod cli;
pub mod config;
pub mod depth;
pub mod flow;
pub mod history;
pub mod monitor;
pub mod signal;
pub mod telemetry;
