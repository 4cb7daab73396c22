//! Generic Asset DCA
//!
//! Runs the same schedule against any priced instrument (equities, gold,
//! other coins) so value-over-time curves can be compared side by side.
//! Only the value curve is kept; the full ledger lives in [`super::dca`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::math::percent_of;
use crate::model::{PriceSample, SimulationParameters, ValuePoint};
use crate::price_index::PriceIndex;
use crate::strategy::dca::Accumulator;
use crate::strategy::schedule::Schedule;

/// A benchmark instrument and its price history
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSeries {
    /// Identifier such as "SPY" or "XAU"
    pub asset: String,
    /// Display label such as "S&P 500"
    pub label: String,
    pub prices: Vec<PriceSample>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDcaResult {
    pub asset: String,
    pub label: String,
    pub total_invested: Decimal,
    pub units_accumulated: Decimal,
    pub final_price: Decimal,
    pub current_value: Decimal,
    pub profit: Decimal,
    pub roi_percent: Decimal,
    pub breakdown: Vec<ValuePoint>,
}

/// DCA into one instrument.
///
/// Prices always come from `prices`; the manual price setting of `params`
/// does not apply to benchmarks. An empty series produces an empty result.
pub fn simulate_asset(
    asset: &str,
    label: &str,
    params: &SimulationParameters,
    prices: &[PriceSample],
) -> AssetDcaResult {
    let index = PriceIndex::new(prices);
    let mut cursor = index.cursor(index.first_price().unwrap_or(Decimal::ZERO));
    let mut totals = Accumulator::new(params.fee_factor());
    let mut breakdown = Vec::new();

    for date in Schedule::for_parameters(params) {
        let price = cursor.price_on(date);
        if price <= Decimal::ZERO {
            continue;
        }
        totals.buy(params.amount_per_purchase, price);
        breakdown.push(ValuePoint {
            date,
            portfolio_value: totals.value_at(price),
        });
    }

    let final_price = index.last_price().unwrap_or(Decimal::ZERO);
    let current_value = totals.value_at(final_price);
    let profit = current_value.saturating_sub(totals.invested);

    AssetDcaResult {
        asset: asset.to_string(),
        label: label.to_string(),
        total_invested: totals.invested,
        units_accumulated: totals.units,
        final_price,
        current_value,
        profit,
        roi_percent: percent_of(profit, totals.invested),
        breakdown,
    }
}

/// Run the same schedule against every benchmark series
pub fn simulate_assets(params: &SimulationParameters, series: &[AssetSeries]) -> Vec<AssetDcaResult> {
    series
        .iter()
        .map(|s| simulate_asset(&s.asset, &s.label, params, &s.prices))
        .collect()
}
