//! Metric engine and classifier working together

use super::support::book;
use orderflow::flow::{FlowEngine, Ratio, SnapshotCache};
use orderflow::signal::{FlowClassifier, FlowSignal};
use rust_decimal_macros::dec;

#[test]
fn test_bid_heavy_book_is_bullish() {
    let engine = FlowEngine::default();
    let classifier = FlowClassifier::default();

    let previous = book(
        &[(dec!(100), dec!(40)), (dec!(99), dec!(30))],
        &[(dec!(101), dec!(25)), (dec!(102), dec!(10))],
    );
    let current = book(
        &[(dec!(100), dec!(50)), (dec!(99), dec!(30))],
        &[(dec!(101), dec!(20)), (dec!(102), dec!(10))],
    );

    let metrics = engine.analyze(&current, Some(&previous)).unwrap();

    assert_eq!(metrics.imbalance_ratio.finite().unwrap().round_dp(3), dec!(2.667));
    let delta = metrics.delta.unwrap();
    assert_eq!(delta.bid_delta, dec!(10));
    assert_eq!(delta.ask_delta, dec!(-5));
    assert_eq!(delta.net_flow, dec!(15));
    assert_eq!(classifier.classify(&metrics), FlowSignal::BullishFlow);
}

#[test]
fn test_large_bid_dominance_adds_vote() {
    let classifier = FlowClassifier::default();
    let current = book(
        &[
            (dec!(100), dec!(10)),
            (dec!(99), dec!(10)),
            (dec!(98), dec!(10)),
            (dec!(97), dec!(100)),
        ],
        &[(dec!(101), dec!(120))],
    );

    let metrics = FlowEngine::default().analyze(&current, None).unwrap();

    assert_eq!(metrics.large_orders.large_bid_count, 1);
    assert_eq!(metrics.large_orders.avg_bid_size, dec!(32.5));
    assert_eq!(metrics.large_orders.max_bid_size, dec!(100));
    // Imbalance 130/120 sits in the dead zone; one vote is not enough
    assert_eq!(classifier.score(&metrics).bullish, 1);
    assert_eq!(classifier.classify(&metrics), FlowSignal::NeutralFlow);
}

#[test]
fn test_ask_heavy_book_is_bearish() {
    let engine = FlowEngine::default();
    let previous = book(&[(dec!(100), dec!(20))], &[(dec!(101), dec!(40))]);
    let current = book(&[(dec!(100), dec!(10))], &[(dec!(101), dec!(60))]);

    let metrics = engine.analyze(&current, Some(&previous)).unwrap();
    assert_eq!(
        FlowClassifier::default().classify(&metrics),
        FlowSignal::BearishFlow
    );
}

#[test]
fn test_empty_asks_unbounded_and_bullish() {
    let current = book(&[(dec!(100), dec!(5))], &[]);
    let metrics = FlowEngine::default().analyze(&current, None).unwrap();

    assert_eq!(metrics.imbalance_ratio, Ratio::Unbounded);
    assert_eq!(
        FlowClassifier::default().classify(&metrics),
        FlowSignal::BullishFlow
    );
}

#[test]
fn test_cache_feeds_next_delta() {
    let engine = FlowEngine::default();
    let mut cache = SnapshotCache::new();

    for (i, qty) in [dec!(10), dec!(15), dec!(12)].into_iter().enumerate() {
        let snap = book(&[(dec!(100), qty)], &[(dec!(101), dec!(10))]);
        let metrics = engine.analyze(&snap, cache.last()).unwrap();
        cache.replace(snap);

        match i {
            0 => assert!(metrics.delta.is_none()),
            1 => assert_eq!(metrics.delta.unwrap().net_flow, dec!(5)),
            _ => assert_eq!(metrics.delta.unwrap().net_flow, dec!(-3)),
        }
    }
}
