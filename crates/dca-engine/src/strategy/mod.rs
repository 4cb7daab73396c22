//! Investment Strategies
//!
//! Date-stepping simulators: periodic DCA, the lump-sum baseline and DCA
//! into arbitrary benchmark assets.

mod asset;
mod dca;
mod lump_sum;
mod schedule;

pub use asset::{simulate_asset, simulate_assets, AssetDcaResult, AssetSeries};
pub use dca::{resolve_final_price, simulate, simulate_with_index};
pub use lump_sum::{compare_strategies, lump_sum, lump_sum_with_index, StrategyComparison, Winner};
pub use schedule::Schedule;
