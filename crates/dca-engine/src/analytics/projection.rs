//! Future Projection
//!
//! Extends an existing stack to a future date under either an annual growth
//! rate or an absolute target price.
//!
//! Remaining purchases are priced at the midpoint of today's price and the
//! projected price. This is a linear approximation, not a day-by-day walk
//! of a hypothetical future series, and the outputs depend on it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::math::{annual_growth_factor, percent_of, safe_div};
use crate::model::{SimulationParameters, SimulationResult};
use crate::strategy::Schedule;

/// How the future price is derived
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum GrowthModel {
    /// `future = current * (1 + rate)^(days / 365)`
    AnnualRate { percent: Decimal },
    /// A user-supplied absolute price
    TargetPrice { price: Decimal },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionInput {
    pub current_price: Decimal,
    /// Day the projection starts from (usually today)
    pub as_of: NaiveDate,
    pub target_date: NaiveDate,
    pub model: GrowthModel,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FutureProjection {
    pub projected_price: Decimal,
    pub days_remaining: i64,
    pub remaining_purchases: u32,
    /// Midpoint price used for every remaining purchase
    pub average_purchase_price: Decimal,
    pub additional_invested: Decimal,
    pub additional_units: Decimal,
    pub total_invested: Decimal,
    pub total_units: Decimal,
    pub projected_value: Decimal,
    pub projected_profit: Decimal,
    pub projected_roi_percent: Decimal,
}

/// Project `result` forward to `input.target_date`.
///
/// Remaining purchases continue the cadence from the last recorded purchase
/// (or `as_of` when there is none) and only count dates after `as_of`.
pub fn project(
    result: &SimulationResult,
    params: &SimulationParameters,
    input: &ProjectionInput,
) -> FutureProjection {
    let days_remaining = (input.target_date - input.as_of).num_days().max(0);

    let projected_price = match input.model {
        GrowthModel::AnnualRate { percent } => {
            input.current_price.saturating_mul(annual_growth_factor(percent, days_remaining))
        }
        GrowthModel::TargetPrice { price } => price,
    };

    let anchor = result.last_purchase().unwrap_or(input.as_of);
    let remaining = Schedule::following(anchor, input.target_date, params.frequency)
        .filter(|d| *d > input.as_of)
        .count();
    let remaining_purchases = u32::try_from(remaining).unwrap_or(u32::MAX);

    // Halve before adding so two large prices cannot overflow.
    let average_purchase_price = (input.current_price / dec!(2)).saturating_add(projected_price / dec!(2));
    let additional_invested = params.amount_per_purchase.saturating_mul(Decimal::from(remaining_purchases));
    let additional_units = if average_purchase_price > Decimal::ZERO {
        safe_div(additional_invested.saturating_mul(params.fee_factor()), average_purchase_price)
    } else {
        Decimal::ZERO
    };

    let total_invested = result.total_invested.saturating_add(additional_invested);
    let total_units = result.units_accumulated.saturating_add(additional_units);
    let projected_value = total_units.saturating_mul(projected_price);
    let projected_profit = projected_value.saturating_sub(total_invested);

    tracing::debug!(
        days_remaining,
        remaining_purchases,
        projected_price = %projected_price,
        "future projection"
    );

    FutureProjection {
        projected_price,
        days_remaining,
        remaining_purchases,
        average_purchase_price,
        additional_invested,
        additional_units,
        total_invested,
        total_units,
        projected_value,
        projected_profit,
        projected_roi_percent: percent_of(projected_profit, total_invested),
    }
}
