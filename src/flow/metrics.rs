//! Order flow metric calculations
//!
//! Pure functions over one or two depth snapshots:
//! - Imbalance ratio (total bid quantity / total ask quantity)
//! - Volume-weighted bid/ask prices and their spread
//! - Large resting order detection
//! - Top-of-book concentration
//! - Quantity delta between consecutive snapshots
//!
//! All sums are checked; overflow surfaces as [`FlowError::Overflow`].

use super::types::{
    DepthConcentration, FlowDelta, FlowError, LargeOrders, Ratio, WeightedPrices,
};
use crate::depth::{DepthLevel, DepthSnapshot};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Default multiple of the mean level size above which a level is large
pub const DEFAULT_LARGE_ORDER_MULTIPLIER: Decimal = dec!(2.0);

/// Default number of top levels compared against the rest of the book
pub const DEFAULT_TOP_LEVELS: usize = 5;

/// Total bid quantity / total ask quantity
///
/// Returns [`Ratio::Unbounded`] when the ask side holds no quantity, even
/// if the bid side is empty too.
pub fn imbalance_ratio(snapshot: &DepthSnapshot) -> Result<Ratio, FlowError> {
    let bid_qty = total_quantity(&snapshot.bids, "imbalance_ratio")?;
    let ask_qty = total_quantity(&snapshot.asks, "imbalance_ratio")?;
    Ratio::of(bid_qty, ask_qty, "imbalance_ratio")
}

/// Volume-weighted average price per side
///
/// A side without quantity has a weighted price of zero. The spread is
/// reported as-is, negative on a crossed book.
pub fn weighted_prices(snapshot: &DepthSnapshot) -> Result<WeightedPrices, FlowError> {
    let weighted_bid = weighted_price(&snapshot.bids)?;
    let weighted_ask = weighted_price(&snapshot.asks)?;
    let spread = weighted_ask
        .checked_sub(weighted_bid)
        .ok_or(FlowError::Overflow {
            metric: "weighted_prices",
        })?;

    Ok(WeightedPrices {
        weighted_bid,
        weighted_ask,
        spread,
    })
}

fn weighted_price(levels: &[DepthLevel]) -> Result<Decimal, FlowError> {
    const METRIC: &str = "weighted_prices";

    let mut value = Decimal::ZERO;
    let mut quantity = Decimal::ZERO;
    for level in levels {
        let notional = level
            .price
            .checked_mul(level.quantity)
            .ok_or(FlowError::Overflow { metric: METRIC })?;
        value = checked_add(value, notional, METRIC)?;
        quantity = checked_add(quantity, level.quantity, METRIC)?;
    }

    if quantity.is_zero() {
        return Ok(Decimal::ZERO);
    }
    value
        .checked_div(quantity)
        .ok_or(FlowError::Overflow { metric: METRIC })
}

/// Detect levels whose quantity exceeds `mean * threshold_multiplier`
///
/// The mean is taken per side across all levels. An empty side reports
/// zero for every field.
pub fn large_orders(
    snapshot: &DepthSnapshot,
    threshold_multiplier: Decimal,
) -> Result<LargeOrders, FlowError> {
    let bids = side_sizes(&snapshot.bids, threshold_multiplier)?;
    let asks = side_sizes(&snapshot.asks, threshold_multiplier)?;

    Ok(LargeOrders {
        large_bid_count: bids.large_count,
        large_ask_count: asks.large_count,
        avg_bid_size: bids.mean,
        avg_ask_size: asks.mean,
        max_bid_size: bids.max,
        max_ask_size: asks.max,
    })
}

struct SideSizes {
    large_count: usize,
    mean: Decimal,
    max: Decimal,
}

fn side_sizes(levels: &[DepthLevel], threshold_multiplier: Decimal) -> Result<SideSizes, FlowError> {
    const METRIC: &str = "large_orders";

    if levels.is_empty() {
        return Ok(SideSizes {
            large_count: 0,
            mean: Decimal::ZERO,
            max: Decimal::ZERO,
        });
    }

    let total = total_quantity(levels, METRIC)?;
    let mean = total
        .checked_div(Decimal::from(levels.len()))
        .ok_or(FlowError::Overflow { metric: METRIC })?;
    let threshold = mean
        .checked_mul(threshold_multiplier)
        .ok_or(FlowError::Overflow { metric: METRIC })?;

    let large_count = levels.iter().filter(|l| l.quantity > threshold).count();
    let max = levels
        .iter()
        .map(|l| l.quantity)
        .max()
        .unwrap_or(Decimal::ZERO);

    Ok(SideSizes {
        large_count,
        mean,
        max,
    })
}

/// Quantity in the first `top_levels` levels relative to the remaining levels
///
/// The ratio is [`Ratio::Unbounded`] when the deeper levels hold nothing.
pub fn depth_concentration(
    snapshot: &DepthSnapshot,
    top_levels: usize,
) -> Result<DepthConcentration, FlowError> {
    const METRIC: &str = "depth_concentration";

    let (top_bids, deep_bids) = split_levels(&snapshot.bids, top_levels);
    let (top_asks, deep_asks) = split_levels(&snapshot.asks, top_levels);

    let top_bid_qty = total_quantity(top_bids, METRIC)?;
    let deep_bid_qty = total_quantity(deep_bids, METRIC)?;
    let top_ask_qty = total_quantity(top_asks, METRIC)?;
    let deep_ask_qty = total_quantity(deep_asks, METRIC)?;

    Ok(DepthConcentration {
        bid_ratio: Ratio::of(top_bid_qty, deep_bid_qty, METRIC)?,
        ask_ratio: Ratio::of(top_ask_qty, deep_ask_qty, METRIC)?,
        top_bid_qty,
        top_ask_qty,
        deep_bid_qty,
        deep_ask_qty,
    })
}

fn split_levels(levels: &[DepthLevel], top_levels: usize) -> (&[DepthLevel], &[DepthLevel]) {
    levels.split_at(top_levels.min(levels.len()))
}

/// Change in total resting quantity from `previous` to `current`
pub fn delta(current: &DepthSnapshot, previous: &DepthSnapshot) -> Result<FlowDelta, FlowError> {
    const METRIC: &str = "delta";

    let bid_delta = checked_sub(
        total_quantity(&current.bids, METRIC)?,
        total_quantity(&previous.bids, METRIC)?,
        METRIC,
    )?;
    let ask_delta = checked_sub(
        total_quantity(&current.asks, METRIC)?,
        total_quantity(&previous.asks, METRIC)?,
        METRIC,
    )?;
    let net_flow = checked_sub(bid_delta, ask_delta, METRIC)?;

    Ok(FlowDelta {
        bid_delta,
        ask_delta,
        net_flow,
    })
}

/// Sum of quantities on one side
pub fn total_quantity(levels: &[DepthLevel], metric: &'static str) -> Result<Decimal, FlowError> {
    levels
        .iter()
        .try_fold(Decimal::ZERO, |acc, l| checked_add(acc, l.quantity, metric))
}

fn checked_add(a: Decimal, b: Decimal, metric: &'static str) -> Result<Decimal, FlowError> {
    a.checked_add(b).ok_or(FlowError::Overflow { metric })
}

fn checked_sub(a: Decimal, b: Decimal, metric: &'static str) -> Result<Decimal, FlowError> {
    a.checked_sub(b).ok_or(FlowError::Overflow { metric })
}
