//! Derived Analytics
//!
//! Pure functions over simulation output. Every ratio with a zero
//! denominator resolves to 0 or an absent value, never NaN or a panic.

mod cost_basis;
mod fire;
mod inflation;
mod milestones;
mod projection;
mod savings;

pub use cost_basis::{aggregate_positions, aggregate_results, CostBasisSummary, CostBasisTotals, PositionSummary};
pub use fire::{project_fire, FireOutcome, FireProjection, GrowthScenario, ScenarioProjection, MAX_YEARS, SAFE_WITHDRAWAL_RATE};
pub use inflation::{adjust_for_inflation, adjust_for_money_supply, InflationAdjustment, MoneySupplyAdjustment};
pub use milestones::{track_milestones, MilestoneEstimate, MilestoneProgress, NextMilestone, DEFAULT_MILESTONES};
pub use projection::{project, FutureProjection, GrowthModel, ProjectionInput};
pub use savings::{savings_comparison, SavingsComparison};
