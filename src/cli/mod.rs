//! CLI interface for orderflow
//!
//! Provides subcommands for:
//! - `serve`: Run the JSON API for the dashboard
//! - `watch`: Monitor one instrument in the foreground
//! - `config`: Show the effective configuration

mod serve;
mod watch;

pub use serve::ServeArgs;
pub use watch::WatchArgs;

use crate::config::Config;
use crate::depth::DhanClient;
use crate::flow::FlowEngine;
use crate::monitor::MonitoringRegistry;
use crate::signal::FlowClassifier;
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "orderflow")]
#[command(about = "Order flow monitor for broker market depth")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the API server
    Serve(ServeArgs),
    /// Monitor one instrument and print its flow summary
    Watch(WatchArgs),
    /// Show configuration
    Config,
}

/// Registry backed by the broker quote API
fn build_registry(config: &Config) -> anyhow::Result<Arc<MonitoringRegistry>> {
    let client = DhanClient::with_config(config.broker.dhan_config())?;

    Ok(Arc::new(MonitoringRegistry::new(
        Arc::new(client),
        FlowEngine::new(config.flow.clone()),
        FlowClassifier::new(config.signal.clone()),
        config.history,
    )))
}

/// Print the effective configuration, hiding credentials
pub fn print_config(config: &Config) {
    println!("Current configuration:");
    println!(
        "  Broker: {} (client {}, token {})",
        config.broker.base_url,
        config.broker.client_id,
        config.broker.masked_token()
    );
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!(
        "  Monitor: segment={}, interval={}s",
        config.monitor.default_segment, config.monitor.default_interval_secs
    );
    println!(
        "  Flow: large_order_multiplier={}, top_levels={}",
        config.flow.large_order_multiplier, config.flow.top_levels
    );
    println!(
        "  Signal: bullish>{}, bearish<{}",
        config.signal.bullish_imbalance, config.signal.bearish_imbalance
    );
    println!(
        "  History: records={}, delta_points={}",
        config.history.max_records, config.history.max_delta_points
    );
    println!(
        "  Telemetry: level={}, format={:?}, metrics_port={}",
        config.telemetry.log_level, config.telemetry.log_format, config.telemetry.metrics_port
    );
}
