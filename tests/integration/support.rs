//! Shared test fixtures

use async_trait::async_trait;
use chrono::Utc;
use orderflow::depth::{DepthLevel, DepthSnapshot, DepthSource, FetchError, Instrument, Segment};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Build a snapshot from `(price, quantity)` pairs
pub fn book(bids: &[(Decimal, Decimal)], asks: &[(Decimal, Decimal)]) -> DepthSnapshot {
    let mut snap = DepthSnapshot::new(Instrument::new("53216", Segment::NseFno));
    snap.ltp = bids.first().map(|b| b.0).unwrap_or_default();
    snap.bids = bids.iter().map(|&(p, q)| DepthLevel::new(p, q)).collect();
    snap.asks = asks.iter().map(|&(p, q)| DepthLevel::new(p, q)).collect();
    snap
}

/// Replays a fixed list of books; the last one repeats
pub struct ScriptedSource {
    books: Vec<DepthSnapshot>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(books: Vec<DepthSnapshot>) -> Self {
        assert!(!books.is_empty());
        Self {
            books,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DepthSource for ScriptedSource {
    async fn fetch_depth(&self, instrument: &Instrument) -> Result<DepthSnapshot, FetchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let mut snap = self.books[call.min(self.books.len() - 1)].clone();
        snap.instrument = instrument.clone();
        snap.captured_at = Utc::now();
        Ok(snap)
    }
}

/// Always fails, as an unreachable broker would
pub struct FailingSource;

#[async_trait]
impl DepthSource for FailingSource {
    async fn fetch_depth(&self, instrument: &Instrument) -> Result<DepthSnapshot, FetchError> {
        Err(FetchError::NotFound(instrument.security_id.clone()))
    }
}
