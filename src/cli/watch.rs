//! Watch command implementation

use super::build_registry;
use crate::config::Config;
use crate::depth::{Instrument, Segment};
use crate::history::FlowSummary;
use clap::Args;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Broker security id
    pub security_id: String,

    /// Exchange segment (defaults to monitor.default_segment)
    #[arg(short, long)]
    pub segment: Option<String>,

    /// Poll interval in seconds (defaults to monitor.default_interval_secs)
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Stop after this many seconds; runs until Ctrl+C when omitted
    #[arg(short, long)]
    pub duration: Option<u64>,

    /// Summary window in minutes
    #[arg(short, long, default_value_t = 30)]
    pub lookback: u64,
}

impl WatchArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let segment = match &self.segment {
            Some(code) => code.parse::<Segment>()?,
            None => config.monitor.default_segment,
        };
        let interval = self
            .interval
            .map(Duration::from_secs)
            .unwrap_or_else(|| config.monitor.default_interval());
        let instrument = Instrument::new(self.security_id.trim(), segment);

        let registry = build_registry(config)?;
        registry.start(instrument.clone(), interval).await?;

        match self.duration {
            Some(secs) => {
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                    _ = tokio::signal::ctrl_c() => tracing::info!("Monitoring stopped by user"),
                }
            }
            None => {
                tokio::signal::ctrl_c().await?;
                tracing::info!("Monitoring stopped by user");
            }
        }

        registry.stop(&instrument.security_id).await;

        match registry.summary(&instrument.security_id, self.lookback).await? {
            Some(summary) => print_summary(&instrument, &summary),
            None => println!("No flow records captured for {}", instrument),
        }

        Ok(())
    }
}

fn print_summary(instrument: &Instrument, summary: &FlowSummary) {
    println!(
        "Flow summary for {} (last {} min)",
        instrument, summary.period_minutes
    );
    println!("  Data points:     {}", summary.data_points);
    println!("  Avg imbalance:   {}", summary.avg_imbalance_ratio);
    println!("  Total net flow:  {}", summary.total_net_flow);
    println!("  Dominant signal: {}", summary.dominant_signal);
    for entry in &summary.signal_distribution {
        println!("    {:<14} {}", entry.signal.as_str(), entry.count);
    }
}
