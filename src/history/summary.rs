//! Windowed flow summary

use super::FlowRecord;
use crate::flow::{ratio_as_float, FlowError, Ratio};
use crate::signal::FlowSignal;
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Occurrences of a signal inside a summary window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalCount {
    pub signal: FlowSignal,
    pub count: usize,
}

/// Aggregate view over the records in a lookback window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowSummary {
    pub period_minutes: u64,
    pub data_points: usize,
    #[serde(serialize_with = "ratio_as_float")]
    pub avg_imbalance_ratio: Ratio,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_net_flow: Decimal,
    /// Counts in order of first appearance in the window
    #[serde(serialize_with = "serialize_distribution")]
    pub signal_distribution: Vec<SignalCount>,
    pub dominant_signal: FlowSignal,
}

impl FlowSummary {
    /// Summarize `records` (oldest first)
    ///
    /// Returns `Ok(None)` when there are no records.
    pub fn from_records<'a, I>(records: I, period_minutes: u64) -> Result<Option<Self>, FlowError>
    where
        I: IntoIterator<Item = &'a FlowRecord>,
    {
        let mut data_points = 0usize;
        let mut imbalance_sum = Decimal::ZERO;
        let mut unbounded = false;
        let mut total_net_flow = Decimal::ZERO;
        let mut distribution: Vec<SignalCount> = Vec::new();

        for record in records {
            data_points += 1;

            match record.metrics.imbalance_ratio {
                Ratio::Finite(v) => {
                    imbalance_sum = imbalance_sum
                        .checked_add(v)
                        .ok_or(FlowError::Overflow { metric: "avg_imbalance_ratio" })?;
                }
                Ratio::Unbounded => unbounded = true,
            }

            total_net_flow = total_net_flow
                .checked_add(record.metrics.net_flow_or_zero())
                .ok_or(FlowError::Overflow { metric: "total_net_flow" })?;

            match distribution.iter_mut().find(|c| c.signal == record.signal) {
                Some(entry) => entry.count += 1,
                None => distribution.push(SignalCount {
                    signal: record.signal,
                    count: 1,
                }),
            }
        }

        if data_points == 0 {
            return Ok(None);
        }

        let avg_imbalance_ratio = if unbounded {
            Ratio::Unbounded
        } else {
            Ratio::of(
                imbalance_sum,
                Decimal::from(data_points as u64),
                "avg_imbalance_ratio",
            )?
        };

        Ok(Some(Self {
            period_minutes,
            data_points,
            avg_imbalance_ratio,
            total_net_flow,
            dominant_signal: dominant(&distribution),
            signal_distribution: distribution,
        }))
    }

    /// Count for a signal, zero when it never occurred
    pub fn count_of(&self, signal: FlowSignal) -> usize {
        self.signal_distribution
            .iter()
            .find(|c| c.signal == signal)
            .map_or(0, |c| c.count)
    }
}

/// Highest count wins; ties go to the signal seen first
fn dominant(distribution: &[SignalCount]) -> FlowSignal {
    let mut best: Option<SignalCount> = None;
    for entry in distribution {
        match best {
            Some(b) if b.count >= entry.count => {}
            _ => best = Some(*entry),
        }
    }
    best.map_or(FlowSignal::NeutralFlow, |b| b.signal)
}

fn serialize_distribution<S: Serializer>(
    distribution: &[SignalCount],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(distribution.len()))?;
    for entry in distribution {
        map.serialize_entry(entry.signal.as_str(), &entry.count)?;
    }
    map.end()
}
