//! FIRE / Retirement Projection
//!
//! Years until the stack can fund annual expenses under the 4% rule, for a
//! handful of growth scenarios.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::math::safe_div;
use crate::model::SimulationParameters;

/// Sustainable annual withdrawal as a share of the portfolio
pub const SAFE_WITHDRAWAL_RATE: Decimal = dec!(0.04);

/// Years simulated before giving up
pub const MAX_YEARS: u32 = 100;

/// A named annual growth assumption
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthScenario {
    pub name: String,
    pub annual_growth_percent: Decimal,
}

impl GrowthScenario {
    pub fn new(name: impl Into<String>, annual_growth_percent: Decimal) -> Self {
        Self {
            name: name.into(),
            annual_growth_percent,
        }
    }

    /// Conservative, moderate and optimistic growth
    pub fn standard() -> Vec<Self> {
        vec![
            Self::new("Conservative", dec!(10)),
            Self::new("Moderate", dec!(25)),
            Self::new("Optimistic", dec!(50)),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum FireOutcome {
    #[serde(rename_all = "camelCase")]
    Reached { years: u32, stack_value: Decimal },
    /// Target not hit within [`MAX_YEARS`]
    NotReached,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioProjection {
    pub name: String,
    pub annual_growth_percent: Decimal,
    pub outcome: FireOutcome,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FireProjection {
    pub annual_expenses: Decimal,
    /// `annual_expenses / 0.04`
    pub fire_target: Decimal,
    pub contribution_per_year: Decimal,
    pub scenarios: Vec<ScenarioProjection>,
}

/// Project each scenario year by year: grow the stack, add a year of
/// contributions, stop once 4% of it covers annual expenses.
///
/// Amounts saturate at `Decimal::MAX`; expenses too large to represent give
/// a saturated target that no scenario reaches.
pub fn project_fire(
    monthly_expenses: Decimal,
    current_stack_value: Decimal,
    params: &SimulationParameters,
    scenarios: &[GrowthScenario],
) -> FireProjection {
    let annual_expenses = monthly_expenses.saturating_mul(Decimal::from(12));
    let contribution_per_year = params
        .amount_per_purchase
        .saturating_mul(Decimal::from(params.frequency.purchases_per_year()));

    let scenarios = scenarios
        .iter()
        .map(|scenario| ScenarioProjection {
            name: scenario.name.clone(),
            annual_growth_percent: scenario.annual_growth_percent,
            outcome: years_to_fire(
                current_stack_value,
                contribution_per_year,
                scenario.annual_growth_percent,
                annual_expenses,
            ),
        })
        .collect();

    FireProjection {
        annual_expenses,
        fire_target: safe_div(annual_expenses, SAFE_WITHDRAWAL_RATE),
        contribution_per_year,
        scenarios,
    }
}

fn years_to_fire(
    stack_value: Decimal,
    contribution_per_year: Decimal,
    growth_percent: Decimal,
    annual_expenses: Decimal,
) -> FireOutcome {
    let growth = Decimal::ONE + growth_percent / Decimal::ONE_HUNDRED;
    let covers = |value: Decimal| value * SAFE_WITHDRAWAL_RATE >= annual_expenses;

    let mut value = stack_value;
    if covers(value) {
        return FireOutcome::Reached { years: 0, stack_value: value };
    }

    for year in 1..=MAX_YEARS {
        value = value.saturating_mul(growth).saturating_add(contribution_per_year);
        if covers(value) {
            return FireOutcome::Reached { years: year, stack_value: value };
        }
        // A saturated stack cannot grow any further.
        if value == Decimal::MAX {
            break;
        }
    }

    FireOutcome::NotReached
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Frequency;
    use chrono::NaiveDate;

    fn params(amount: Decimal, frequency: Frequency) -> SimulationParameters {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        SimulationParameters::new(amount, frequency, day, day)
    }

    #[test]
    fn test_target_from_expenses() {
        let projection = project_fire(dec!(2000), Decimal::ZERO, &params(dec!(100), Frequency::Weekly), &[]);
        assert_eq!(projection.annual_expenses, dec!(24000));
        assert_eq!(projection.fire_target, dec!(600000));
        assert_eq!(projection.contribution_per_year, dec!(5200));
    }

    #[test]
    fn test_flat_growth_counts_contributions() {
        // 12,000/yr contributions, target 300,000 -> 25 years
        let projection = project_fire(
            dec!(1000),
            Decimal::ZERO,
            &params(dec!(1000), Frequency::Monthly),
            &[GrowthScenario::new("Flat", Decimal::ZERO)],
        );
        assert_eq!(
            projection.scenarios[0].outcome,
            FireOutcome::Reached { years: 25, stack_value: dec!(300000) }
        );
    }

    #[test]
    fn test_already_retired() {
        let projection = project_fire(dec!(100), dec!(1000000), &params(dec!(10), Frequency::Daily), &GrowthScenario::standard());
        assert!(projection
            .scenarios
            .iter()
            .all(|s| matches!(s.outcome, FireOutcome::Reached { years: 0, .. })));
    }

    #[test]
    fn test_unreachable_reports_not_reached() {
        let projection = project_fire(
            dec!(1000000000),
            Decimal::ZERO,
            &params(dec!(100), Frequency::Weekly),
            &[GrowthScenario::new("Flat", Decimal::ZERO)],
        );
        assert_eq!(projection.scenarios[0].outcome, FireOutcome::NotReached);
    }

    #[test]
    fn test_unrepresentable_expenses_saturate() {
        let monthly = Decimal::from_i128_with_scale(10_i128.pow(28), 0);
        let projection = project_fire(
            monthly,
            Decimal::ZERO,
            &params(dec!(100), Frequency::Weekly),
            &[GrowthScenario::new("Flat", Decimal::ZERO), GrowthScenario::new("Wild", dec!(1000))],
        );

        assert_eq!(projection.annual_expenses, Decimal::MAX);
        assert_eq!(projection.fire_target, Decimal::MAX);
        assert!(projection.scenarios.iter().all(|s| s.outcome == FireOutcome::NotReached));
    }

    #[test]
    fn test_runaway_growth_reaches_target() {
        let projection = project_fire(
            dec!(1000000000000000000000),
            dec!(1000000),
            &params(dec!(100), Frequency::Weekly),
            &[GrowthScenario::new("Wild", dec!(100000))],
        );
        assert!(matches!(projection.scenarios[0].outcome, FireOutcome::Reached { .. }));
    }

    #[test]
    fn test_growth_shortens_the_path() {
        let projection = project_fire(dec!(3000), dec!(10000), &params(dec!(500), Frequency::Monthly), &GrowthScenario::standard());
        let years: Vec<u32> = projection
            .scenarios
            .iter()
            .map(|s| match s.outcome {
                FireOutcome::Reached { years, .. } => years,
                FireOutcome::NotReached => u32::MAX,
            })
            .collect();
        assert!(years[0] > years[1] && years[1] > years[2]);
    }
}
