//! Signal generation module
//!
//! Classifies order flow metrics into a directional signal

mod classifier;
mod types;

pub use classifier::{ClassifierConfig, FlowClassifier};
pub use types::{FlowSignal, SignalScore};
