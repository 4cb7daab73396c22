//! Dollar-Cost Averaging Simulator
//!
//! Replays a purchase schedule against historical prices and records every
//! purchase in a ledger.
//!
//! Fees shrink the units bought but the ledger still records the gross
//! amount as invested, so "what did I put in" matches the cash that left
//! the bank account.

use rust_decimal::Decimal;

use crate::math::safe_div;
use crate::model::{PriceMode, PriceSample, PurchaseRecord, SimulationParameters, SimulationResult};
use crate::price_index::PriceIndex;
use crate::strategy::schedule::Schedule;

/// Running totals shared by every DCA-style walk
#[derive(Clone, Copy, Debug)]
pub(crate) struct Accumulator {
    fee_factor: Decimal,
    pub(crate) invested: Decimal,
    pub(crate) units: Decimal,
}

impl Accumulator {
    pub(crate) fn new(fee_factor: Decimal) -> Self {
        Self {
            fee_factor,
            invested: Decimal::ZERO,
            units: Decimal::ZERO,
        }
    }

    /// Spend `gross` at `price`, returning the units bought after fees.
    /// Totals saturate at `Decimal::MAX` instead of overflowing.
    pub(crate) fn buy(&mut self, gross: Decimal, price: Decimal) -> Decimal {
        let units = safe_div(gross.saturating_mul(self.fee_factor), price);
        self.invested = self.invested.saturating_add(gross);
        self.units = self.units.saturating_add(units);
        units
    }

    /// Units held valued at `price`
    pub(crate) fn value_at(&self, price: Decimal) -> Decimal {
        self.units.saturating_mul(price)
    }
}

/// Simulate `params` against a raw price series.
///
/// An inverted date range yields an all-zero result. Steps whose price is
/// not positive are skipped without stopping the walk.
pub fn simulate(
    params: &SimulationParameters,
    prices: &[PriceSample],
    current_price: Option<Decimal>,
) -> SimulationResult {
    simulate_with_index(params, &PriceIndex::new(prices), current_price)
}

/// Same as [`simulate`] against a prebuilt index, for sweeping many
/// schedules over one history.
pub fn simulate_with_index(
    params: &SimulationParameters,
    index: &PriceIndex,
    current_price: Option<Decimal>,
) -> SimulationResult {
    let seed = index.first_price().unwrap_or(params.manual_price);
    let mut cursor = index.cursor(seed);
    let mut totals = Accumulator::new(params.fee_factor());
    let mut breakdown = Vec::new();

    for date in Schedule::for_parameters(params) {
        let unit_price = match params.price_mode {
            PriceMode::Manual => params.manual_price,
            PriceMode::Api => cursor.price_on(date),
        };
        if unit_price <= Decimal::ZERO {
            continue;
        }

        let units_acquired = totals.buy(params.amount_per_purchase, unit_price);
        breakdown.push(PurchaseRecord {
            date,
            unit_price,
            cash_invested: params.amount_per_purchase,
            cumulative_cash_invested: totals.invested,
            units_acquired,
            cumulative_units_acquired: totals.units,
            portfolio_value: totals.value_at(unit_price),
        });
    }

    let final_price = resolve_final_price(params, index, current_price);
    tracing::debug!(
        purchases = breakdown.len(),
        invested = %totals.invested,
        units = %totals.units,
        final_price = %final_price,
        "dca simulation complete"
    );

    SimulationResult::from_totals(totals.invested, totals.units, final_price, breakdown)
}

/// Valuation price: positive override, else the latest sample in API mode,
/// else the manual price
pub fn resolve_final_price(
    params: &SimulationParameters,
    index: &PriceIndex,
    current_price: Option<Decimal>,
) -> Decimal {
    if let Some(price) = current_price.filter(|p| *p > Decimal::ZERO) {
        return price;
    }
    if params.price_mode == PriceMode::Api {
        if let Some(price) = index.last_price() {
            return price;
        }
    }
    params.manual_price
}
