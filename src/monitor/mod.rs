//! Monitoring module
//!
//! Per-instrument poll tasks feeding the flow history

mod poller;
mod registry;

pub use poller::{CycleOutcome, Poller};
pub use registry::{
    InstrumentSlot, InstrumentStatus, MonitorError, MonitoringRegistry, StartOutcome, StopOutcome,
};
