//! Poll cycle and loop for one instrument

use super::registry::InstrumentSlot;
use crate::depth::DepthSource;
use crate::flow::FlowEngine;
use crate::history::FlowRecord;
use crate::signal::{FlowClassifier, FlowSignal};
use crate::telemetry::{self, CounterMetric, LatencyMetric};
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Result of a single poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A record was appended with this signal
    Recorded(FlowSignal),
    /// The broker fetch failed; history untouched
    FetchFailed,
    /// Metric computation failed
    AnalysisFailed,
    /// The history store refused the record
    Rejected,
    /// The task was stopped mid-cycle
    Cancelled,
}

/// Fetch, analyze, classify, record
pub struct Poller {
    source: Arc<dyn DepthSource>,
    engine: FlowEngine,
    classifier: FlowClassifier,
}

impl Poller {
    pub fn new(source: Arc<dyn DepthSource>, engine: FlowEngine, classifier: FlowClassifier) -> Self {
        Self {
            source,
            engine,
            classifier,
        }
    }

    /// Run one cycle for `slot`, stamping the record with `sequence`
    pub async fn poll_once(
        &self,
        slot: &InstrumentSlot,
        sequence: u64,
        cancel: &CancellationToken,
    ) -> CycleOutcome {
        let instrument = slot.instrument();
        let started = Instant::now();
        telemetry::increment(CounterMetric::Polls);

        let fetched = tokio::select! {
            _ = cancel.cancelled() => return CycleOutcome::Cancelled,
            result = self.source.fetch_depth(instrument) => result,
        };

        let snapshot = match fetched {
            Ok(snapshot) => snapshot,
            Err(e) => {
                telemetry::increment(CounterMetric::FetchFailures);
                tracing::warn!(instrument = %instrument, error = %e, "Depth fetch failed, skipping cycle");
                return CycleOutcome::FetchFailed;
            }
        };

        let metrics = {
            let mut cache = slot.cache().lock().await;
            if cancel.is_cancelled() {
                return CycleOutcome::Cancelled;
            }
            // A book that yields no metrics never becomes the delta baseline
            match self.engine.analyze(&snapshot, cache.last()) {
                Ok(metrics) => {
                    cache.replace(snapshot.clone());
                    metrics
                }
                Err(e) => {
                    tracing::warn!(instrument = %instrument, error = %e, "Flow analysis failed, skipping cycle");
                    return CycleOutcome::AnalysisFailed;
                }
            }
        };

        let signal = self.classifier.classify(&metrics);
        let record = FlowRecord::new(sequence, &snapshot, metrics, signal);

        {
            let mut history = slot.history().write().await;
            if cancel.is_cancelled() {
                return CycleOutcome::Cancelled;
            }
            if let Err(e) = history.record(record.clone()) {
                telemetry::increment(CounterMetric::RejectedRecords);
                tracing::warn!(instrument = %instrument, error = %e, "Record rejected");
                return CycleOutcome::Rejected;
            }
        }

        telemetry::record_signal(signal);
        telemetry::record_latency(LatencyMetric::Poll, started.elapsed());
        if let Some(delta) = record.metrics.delta {
            telemetry::set_net_flow(
                &instrument.to_string(),
                delta.net_flow.to_f64().unwrap_or_default(),
            );
        }

        tracing::info!(
            instrument = %instrument,
            sequence,
            ltp = %record.ltp,
            imbalance = %record.metrics.imbalance_ratio,
            net_flow = %record.metrics.net_flow_or_zero(),
            signal = %signal,
            "Flow record"
        );

        if signal.is_directional() {
            tracing::warn!(instrument = %instrument, signal = %signal, "ALERT: {} detected", signal);
        }

        CycleOutcome::Recorded(signal)
    }

    /// Poll on `interval` until `cancel` fires
    ///
    /// Sequences continue from the last stored record.
    pub async fn run(
        self: Arc<Self>,
        slot: Arc<InstrumentSlot>,
        interval: Duration,
        cancel: CancellationToken,
        session: Uuid,
    ) {
        let instrument = slot.instrument().clone();
        let mut next_sequence = slot.history().read().await.last_sequence() + 1;

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            instrument = %instrument,
            %session,
            interval_ms = interval.as_millis() as u64,
            first_sequence = next_sequence,
            "Poll loop started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            match self.poll_once(&slot, next_sequence, &cancel).await {
                CycleOutcome::Recorded(_) => next_sequence += 1,
                CycleOutcome::Cancelled => break,
                CycleOutcome::FetchFailed
                | CycleOutcome::AnalysisFailed
                | CycleOutcome::Rejected => {}
            }
        }

        tracing::info!(instrument = %instrument, %session, "Poll loop stopped");
    }
}
