//! Lump-Sum Comparator
//!
//! The baseline every DCA run is judged against: the same cash spent in one
//! purchase on the start date.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::math::{percent_of, safe_div};
use crate::model::{LumpSumResult, PriceSample, SimulationResult};
use crate::price_index::PriceIndex;

/// Invest `total_cash` at once on `start_date`.
///
/// Entry is the first price on or after `start_date`, else the last price
/// available. A missing series or non-positive `current_price` is reported
/// as a total loss so comparisons stay defined.
pub fn lump_sum(
    total_cash: Decimal,
    start_date: NaiveDate,
    prices: &[PriceSample],
    current_price: Decimal,
) -> LumpSumResult {
    lump_sum_with_index(total_cash, start_date, &PriceIndex::new(prices), current_price)
}

pub fn lump_sum_with_index(
    total_cash: Decimal,
    start_date: NaiveDate,
    index: &PriceIndex,
    current_price: Decimal,
) -> LumpSumResult {
    if current_price <= Decimal::ZERO {
        return LumpSumResult::total_loss(total_cash);
    }

    let entry = index
        .first_at_or_after(start_date)
        .or_else(|| index.last_day().zip(index.last_price()));
    let Some((entry_date, entry_price)) = entry.filter(|(_, p)| *p > Decimal::ZERO) else {
        return LumpSumResult::total_loss(total_cash);
    };

    let units_accumulated = safe_div(total_cash, entry_price);
    let current_value = units_accumulated.saturating_mul(current_price);
    let profit = current_value.saturating_sub(total_cash);

    LumpSumResult {
        total_invested: total_cash,
        units_accumulated,
        entry_price: Some(entry_price),
        entry_date: Some(entry_date),
        current_value,
        profit,
        roi_percent: percent_of(profit, total_cash),
    }
}

/// Which approach ended up ahead
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Winner {
    Dca,
    LumpSum,
    Tie,
}

/// Side-by-side of a DCA run and its lump-sum baseline
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    /// DCA value minus lump-sum value
    pub value_difference: Decimal,
    /// DCA ROI minus lump-sum ROI, in percentage points
    pub roi_difference: Decimal,
    pub dca_multiplier: Decimal,
    pub lump_sum_multiplier: Decimal,
    pub winner: Winner,
}

pub fn compare_strategies(dca: &SimulationResult, lump: &LumpSumResult) -> StrategyComparison {
    let value_difference = dca.current_value.saturating_sub(lump.current_value);
    let winner = match value_difference.cmp(&Decimal::ZERO) {
        std::cmp::Ordering::Greater => Winner::Dca,
        std::cmp::Ordering::Less => Winner::LumpSum,
        std::cmp::Ordering::Equal => Winner::Tie,
    };

    StrategyComparison {
        value_difference,
        roi_difference: dca.roi_percent.saturating_sub(lump.roi_percent),
        dca_multiplier: dca.multiplier(),
        lump_sum_multiplier: lump.multiplier(),
        winner,
    }
}
