//! Flow history module
//!
//! Bounded per-instrument record history, delta series and window summaries

mod store;
mod summary;
mod types;

pub use store::{
    HistoryConfig, HistoryError, InstrumentHistory, DEFAULT_MAX_DELTA_POINTS, DEFAULT_MAX_RECORDS,
};
pub use summary::{FlowSummary, SignalCount};
pub use types::{DeltaPoint, FlowRecord, LADDER_LEVELS};
