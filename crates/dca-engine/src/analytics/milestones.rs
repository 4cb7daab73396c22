//! Milestone Tracker
//!
//! Which unit-quantity goals a stack has passed, and roughly when the next
//! one falls if accumulation keeps its observed pace.

use chrono::{Days, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::math::{percent_of, safe_div};
use crate::model::SimulationResult;

pub const DEFAULT_MILESTONES: [Decimal; 8] = [
    dec!(0.01),
    dec!(0.05),
    dec!(0.1),
    dec!(0.25),
    dec!(0.5),
    dec!(1),
    dec!(2),
    dec!(5),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneEstimate {
    /// Units accumulated per day so far
    pub daily_rate: Decimal,
    pub days_to_reach: i64,
    pub estimated_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextMilestone {
    pub target: Decimal,
    pub remaining_units: Decimal,
    pub progress_percent: Decimal,
    /// Absent with fewer than two purchases or no accumulation
    pub estimate: Option<MilestoneEstimate>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneProgress {
    pub units_accumulated: Decimal,
    pub passed: Vec<Decimal>,
    pub next: Option<NextMilestone>,
}

pub fn track_milestones(result: &SimulationResult, milestones: &[Decimal]) -> MilestoneProgress {
    let units = result.units_accumulated;
    let mut ordered = milestones.to_vec();
    ordered.sort();

    let passed: Vec<Decimal> = ordered.iter().copied().filter(|m| *m <= units).collect();
    let next = ordered.iter().copied().find(|m| *m > units).map(|target| {
        let remaining_units = target - units;
        NextMilestone {
            target,
            remaining_units,
            progress_percent: percent_of(units, target),
            estimate: estimate_arrival(result, remaining_units),
        }
    });

    MilestoneProgress {
        units_accumulated: units,
        passed,
        next,
    }
}

/// Extrapolate the average daily accumulation since the first purchase.
///
/// Elapsed days run from the first to the last purchase, not over the whole
/// requested range. The estimated date counts forward from the last purchase.
fn estimate_arrival(result: &SimulationResult, remaining_units: Decimal) -> Option<MilestoneEstimate> {
    if result.breakdown.len() < 2 {
        return None;
    }
    let first = result.first_purchase()?;
    let last = result.last_purchase()?;
    let days_elapsed = (last - first).num_days();
    if days_elapsed <= 0 {
        return None;
    }

    let daily_rate = safe_div(result.units_accumulated, Decimal::from(days_elapsed));
    if daily_rate <= Decimal::ZERO {
        return None;
    }

    let days_to_reach = safe_div(remaining_units, daily_rate).ceil().to_i64()?;
    let estimated_date = u64::try_from(days_to_reach)
        .ok()
        .and_then(|d| last.checked_add_days(Days::new(d)));

    Some(MilestoneEstimate {
        daily_rate,
        days_to_reach,
        estimated_date,
    })
}
