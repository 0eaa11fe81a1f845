//! Monitoring registry
//!
//! Owns one slot per security id. Each slot carries its own snapshot cache,
//! history and poll task, so instruments never contend with each other.

use super::poller::Poller;
use crate::depth::{DepthSource, Instrument, Segment};
use crate::flow::{FlowEngine, FlowError, SnapshotCache};
use crate::history::{DeltaPoint, FlowRecord, FlowSummary, HistoryConfig, InstrumentHistory};
use crate::signal::FlowClassifier;
use crate::telemetry::{self, GaugeMetric};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Monitoring errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    #[error("poll interval must be greater than zero")]
    InvalidInterval,

    #[error("security id must not be empty")]
    EmptySecurityId,
}

/// Result of a start request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new poll task was spawned
    Started { session: Uuid },
    /// A live task already exists; nothing changed
    AlreadyRunning { instrument: Instrument },
}

/// Result of a stop request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    NotRunning,
}

/// Listing entry for a known instrument
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstrumentStatus {
    pub security_id: String,
    pub segment: Segment,
    pub monitoring: bool,
    pub records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<Uuid>,
}

struct PollTask {
    session: Uuid,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl PollTask {
    fn is_live(&self) -> bool {
        !self.handle.is_finished()
    }
}

/// Per-instrument state
pub struct InstrumentSlot {
    instrument: Instrument,
    cache: Mutex<SnapshotCache>,
    history: RwLock<InstrumentHistory>,
    task: Mutex<Option<PollTask>>,
}

impl InstrumentSlot {
    fn new(instrument: Instrument, history: HistoryConfig) -> Self {
        Self {
            instrument,
            cache: Mutex::new(SnapshotCache::new()),
            history: RwLock::new(InstrumentHistory::new(history)),
            task: Mutex::new(None),
        }
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    pub(crate) fn cache(&self) -> &Mutex<SnapshotCache> {
        &self.cache
    }

    pub(crate) fn history(&self) -> &RwLock<InstrumentHistory> {
        &self.history
    }

    /// Whether a live poll task exists
    pub async fn is_running(&self) -> bool {
        self.task.lock().await.as_ref().is_some_and(PollTask::is_live)
    }

    async fn stop(&self) -> StopOutcome {
        // Held until the token fires so a concurrent start cannot overlap the old session
        let mut slot_task = self.task.lock().await;
        let Some(task) = slot_task.take() else {
            return StopOutcome::NotRunning;
        };

        let was_live = task.is_live();
        {
            // The poller checks the token under this lock before appending
            let _history = self.history.write().await;
            task.cancel.cancel();
        }
        task.handle.abort();
        drop(slot_task);

        if was_live {
            tracing::info!(instrument = %self.instrument, session = %task.session, "Monitoring stopped");
            StopOutcome::Stopped
        } else {
            StopOutcome::NotRunning
        }
    }
}

/// Process-wide set of monitored instruments
pub struct MonitoringRegistry {
    poller: Arc<Poller>,
    history_config: HistoryConfig,
    slots: RwLock<HashMap<String, Arc<InstrumentSlot>>>,
}

impl MonitoringRegistry {
    /// Create a new registry
    pub fn new(
        source: Arc<dyn DepthSource>,
        engine: FlowEngine,
        classifier: FlowClassifier,
        history_config: HistoryConfig,
    ) -> Self {
        Self {
            poller: Arc::new(Poller::new(source, engine, classifier)),
            history_config,
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Create with default engine, classifier and history limits
    pub fn with_defaults(source: Arc<dyn DepthSource>) -> Self {
        Self::new(
            source,
            FlowEngine::default(),
            FlowClassifier::default(),
            HistoryConfig::default(),
        )
    }

    /// Start polling `instrument` every `interval`
    ///
    /// A no-op when a live task already exists for the security id.
    pub async fn start(
        &self,
        instrument: Instrument,
        interval: Duration,
    ) -> Result<StartOutcome, MonitorError> {
        if interval.is_zero() {
            return Err(MonitorError::InvalidInterval);
        }
        if instrument.security_id.trim().is_empty() {
            return Err(MonitorError::EmptySecurityId);
        }

        let slot = self.slot_for(&instrument).await;
        let mut task = slot.task.lock().await;

        if task.as_ref().is_some_and(PollTask::is_live) {
            return Ok(StartOutcome::AlreadyRunning {
                instrument: slot.instrument.clone(),
            });
        }

        // A fresh session never computes a delta against a stale book
        slot.cache.lock().await.clear();

        let session = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(Arc::clone(&self.poller).run(
            Arc::clone(&slot),
            interval,
            cancel.clone(),
            session,
        ));

        *task = Some(PollTask {
            session,
            cancel,
            handle,
        });
        drop(task);

        tracing::info!(
            instrument = %slot.instrument,
            %session,
            interval_ms = interval.as_millis() as u64,
            "Monitoring started"
        );
        self.publish_running_count().await;

        Ok(StartOutcome::Started { session })
    }

    /// Stop polling the security id
    ///
    /// No record is appended for it once this returns.
    pub async fn stop(&self, security_id: &str) -> StopOutcome {
        let Some(slot) = self.slot(security_id).await else {
            return StopOutcome::NotRunning;
        };

        let outcome = slot.stop().await;
        self.publish_running_count().await;
        outcome
    }

    /// Stop every poll task
    pub async fn shutdown(&self) {
        let slots: Vec<Arc<InstrumentSlot>> = self.slots.read().await.values().cloned().collect();
        for slot in slots {
            slot.stop().await;
        }
        telemetry::set_gauge(GaugeMetric::MonitoredInstruments, 0.0);
        tracing::info!("All monitoring stopped");
    }

    pub async fn is_running(&self, security_id: &str) -> bool {
        match self.slot(security_id).await {
            Some(slot) => slot.is_running().await,
            None => false,
        }
    }

    /// Number of instruments with a live task
    pub async fn running_count(&self) -> usize {
        let slots: Vec<Arc<InstrumentSlot>> = self.slots.read().await.values().cloned().collect();
        let mut running = 0;
        for slot in slots {
            if slot.is_running().await {
                running += 1;
            }
        }
        running
    }

    /// Most recent record for the security id
    pub async fn latest(&self, security_id: &str) -> Option<FlowRecord> {
        let slot = self.slot(security_id).await?;
        let history = slot.history.read().await;
        history.latest().cloned()
    }

    /// Delta series, oldest first; empty for unknown instruments
    pub async fn delta_series(&self, security_id: &str) -> Vec<DeltaPoint> {
        match self.slot(security_id).await {
            Some(slot) => slot.history.read().await.delta_series(),
            None => Vec::new(),
        }
    }

    /// Summary over the last `lookback_minutes`
    pub async fn summary(
        &self,
        security_id: &str,
        lookback_minutes: u64,
    ) -> Result<Option<FlowSummary>, FlowError> {
        match self.slot(security_id).await {
            Some(slot) => slot.history.read().await.summary(lookback_minutes),
            None => Ok(None),
        }
    }

    /// All known instruments, sorted by security id
    pub async fn instruments(&self) -> Vec<InstrumentStatus> {
        let slots: Vec<Arc<InstrumentSlot>> = self.slots.read().await.values().cloned().collect();

        let mut statuses = Vec::with_capacity(slots.len());
        for slot in slots {
            let session = slot
                .task
                .lock()
                .await
                .as_ref()
                .filter(|t| t.is_live())
                .map(|t| t.session);
            statuses.push(InstrumentStatus {
                security_id: slot.instrument.security_id.clone(),
                segment: slot.instrument.segment,
                monitoring: session.is_some(),
                records: slot.history.read().await.len(),
                session,
            });
        }

        statuses.sort_by(|a, b| a.security_id.cmp(&b.security_id));
        statuses
    }

    async fn slot(&self, security_id: &str) -> Option<Arc<InstrumentSlot>> {
        self.slots.read().await.get(security_id).cloned()
    }

    /// Existing slot for the instrument, or a fresh one
    ///
    /// An idle slot registered under another segment is replaced.
    async fn slot_for(&self, instrument: &Instrument) -> Arc<InstrumentSlot> {
        let mut slots = self.slots.write().await;

        if let Some(existing) = slots.get(&instrument.security_id) {
            if existing.instrument == *instrument || existing.is_running().await {
                return Arc::clone(existing);
            }
        }

        let slot = Arc::new(InstrumentSlot::new(instrument.clone(), self.history_config));
        slots.insert(instrument.security_id.clone(), Arc::clone(&slot));
        slot
    }

    async fn publish_running_count(&self) {
        let running = self.running_count().await;
        telemetry::set_gauge(GaugeMetric::MonitoredInstruments, running as f64);
    }
}
