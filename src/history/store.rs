//! Per-instrument bounded history

use super::{DeltaPoint, FlowRecord, FlowSummary};
use crate::flow::FlowError;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::VecDeque;
use thiserror::Error;

pub const DEFAULT_MAX_RECORDS: usize = 1000;
pub const DEFAULT_MAX_DELTA_POINTS: usize = 60;

/// History errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("record at {attempted} is not newer than latest record at {last}")]
    OutOfOrder {
        last: DateTime<Utc>,
        attempted: DateTime<Utc>,
    },
}

/// Retention limits for one instrument
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub max_records: usize,
    pub max_delta_points: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_records: DEFAULT_MAX_RECORDS,
            max_delta_points: DEFAULT_MAX_DELTA_POINTS,
        }
    }
}

/// Record FIFO and delta ring for one instrument
#[derive(Debug, Default)]
pub struct InstrumentHistory {
    config: HistoryConfig,
    records: VecDeque<FlowRecord>,
    deltas: VecDeque<DeltaPoint>,
}

impl InstrumentHistory {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            config,
            records: VecDeque::with_capacity(config.max_records.min(DEFAULT_MAX_RECORDS)),
            deltas: VecDeque::with_capacity(config.max_delta_points.min(DEFAULT_MAX_DELTA_POINTS)),
        }
    }

    /// Append a record, evicting the oldest entries past the caps
    ///
    /// Timestamps must be strictly increasing.
    pub fn record(&mut self, record: FlowRecord) -> Result<(), HistoryError> {
        if let Some(last) = self.records.back() {
            if record.timestamp <= last.timestamp {
                return Err(HistoryError::OutOfOrder {
                    last: last.timestamp,
                    attempted: record.timestamp,
                });
            }
        }

        if let Some(point) = record.delta_point() {
            self.deltas.push_back(point);
            while self.deltas.len() > self.config.max_delta_points {
                self.deltas.pop_front();
            }
        }

        self.records.push_back(record);
        while self.records.len() > self.config.max_records {
            self.records.pop_front();
        }

        Ok(())
    }

    /// Most recent record
    pub fn latest(&self) -> Option<&FlowRecord> {
        self.records.back()
    }

    /// Delta points, oldest first
    pub fn delta_series(&self) -> Vec<DeltaPoint> {
        self.deltas.iter().copied().collect()
    }

    /// Stored records, oldest first
    pub fn records(&self) -> impl Iterator<Item = &FlowRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Highest stored sequence, 0 when empty
    pub fn last_sequence(&self) -> u64 {
        self.records.back().map_or(0, |r| r.sequence)
    }

    /// Summary of the last `lookback_minutes` up to now
    pub fn summary(&self, lookback_minutes: u64) -> Result<Option<FlowSummary>, FlowError> {
        self.summary_at(Utc::now(), lookback_minutes)
    }

    /// Summary of records strictly newer than `now - lookback_minutes`
    pub fn summary_at(
        &self,
        now: DateTime<Utc>,
        lookback_minutes: u64,
    ) -> Result<Option<FlowSummary>, FlowError> {
        // An unrepresentable window covers everything
        let cutoff = i64::try_from(lookback_minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .and_then(|window| now.checked_sub_signed(window));

        let window = self
            .records
            .iter()
            .filter(|r| cutoff.map_or(true, |c| r.timestamp > c));

        FlowSummary::from_records(window, lookback_minutes)
    }
}
