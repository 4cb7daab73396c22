//! Multi-Position Cost Basis
//!
//! Combines several saved schedules into one stack. Aggregate profit and ROI
//! come from the summed totals, never from averaging per-position ratios.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::math::{percent_of, safe_div};
use crate::model::{CostBasisPosition, SimulationParameters, SimulationResult};
use crate::price_index::PriceIndex;
use crate::strategy::simulate_with_index;

/// Combined totals across positions
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBasisTotals {
    pub total_invested: Decimal,
    pub units_accumulated: Decimal,
    pub current_value: Decimal,
    pub profit: Decimal,
    pub roi_percent: Decimal,
    /// Summed invested over summed units
    pub weighted_average_cost: Decimal,
}

/// One position's headline numbers, without its ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSummary {
    pub id: String,
    pub label: String,
    pub purchases: usize,
    pub total_invested: Decimal,
    pub units_accumulated: Decimal,
    pub average_cost: Decimal,
    pub current_value: Decimal,
    pub profit: Decimal,
    pub roi_percent: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBasisSummary {
    pub positions: Vec<PositionSummary>,
    pub totals: CostBasisTotals,
}

pub fn aggregate_results<'a>(results: impl IntoIterator<Item = &'a SimulationResult>) -> CostBasisTotals {
    let (total_invested, units_accumulated, current_value) = results.into_iter().fold(
        (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
        |(invested, units, value), r| {
            (
                invested.saturating_add(r.total_invested),
                units.saturating_add(r.units_accumulated),
                value.saturating_add(r.current_value),
            )
        },
    );
    let profit = current_value.saturating_sub(total_invested);

    CostBasisTotals {
        total_invested,
        units_accumulated,
        current_value,
        profit,
        roi_percent: percent_of(profit, total_invested),
        weighted_average_cost: safe_div(total_invested, units_accumulated),
    }
}

/// Simulate every position against one shared history and aggregate.
///
/// Price mode and manual price come from `template`; the index is built once
/// by the caller and reused for every position.
pub fn aggregate_positions(
    positions: &[CostBasisPosition],
    template: &SimulationParameters,
    index: &PriceIndex,
    current_price: Option<Decimal>,
) -> CostBasisSummary {
    let results: Vec<SimulationResult> = positions
        .iter()
        .map(|p| simulate_with_index(&p.to_parameters(template), index, current_price))
        .collect();

    let summaries = positions
        .iter()
        .zip(&results)
        .map(|(position, result)| PositionSummary {
            id: position.id.clone(),
            label: position.label.clone(),
            purchases: result.breakdown.len(),
            total_invested: result.total_invested,
            units_accumulated: result.units_accumulated,
            average_cost: result.average_cost,
            current_value: result.current_value,
            profit: result.profit,
            roi_percent: result.roi_percent,
        })
        .collect();

    CostBasisSummary {
        positions: summaries,
        totals: aggregate_results(&results),
    }
}
