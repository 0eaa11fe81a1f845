//! Prometheus metrics

use crate::signal::FlowSignal;
use ::metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Poll cycles started
    Polls,
    /// Poll cycles skipped because the fetch failed
    FetchFailures,
    /// Records rejected by the history store
    RejectedRecords,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Instruments with a live poll task
    MonitoredInstruments,
}

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Full poll cycle: fetch, analyze, classify, record
    Poll,
}

fn counter_name(metric: CounterMetric) -> &'static str {
    match metric {
        CounterMetric::Polls => "orderflow_polls_total",
        CounterMetric::FetchFailures => "orderflow_fetch_failures_total",
        CounterMetric::RejectedRecords => "orderflow_rejected_records_total",
    }
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    counter!(counter_name(metric)).increment(1);
}

/// Count an appended record under its signal
pub fn record_signal(signal: FlowSignal) {
    counter!("orderflow_records_total", "signal" => signal.as_str()).increment(1);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    let metric_name = match metric {
        GaugeMetric::MonitoredInstruments => "orderflow_monitored_instruments",
    };
    gauge!(metric_name).set(value);
}

/// Latest net flow for an instrument
pub fn set_net_flow(instrument: &str, value: f64) {
    gauge!("orderflow_net_flow", "instrument" => instrument.to_string()).set(value);
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let metric_name = match metric {
        LatencyMetric::Poll => "orderflow_poll_latency_ms",
    };
    histogram!(metric_name).record(duration.as_secs_f64() * 1000.0);
}

/// Install the Prometheus recorder and serve `/metrics` on `port`
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics exporter: {}", e))?;

    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}
