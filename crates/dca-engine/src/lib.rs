//! # dca-engine
//!
//! Deterministic dollar-cost-averaging simulator with lump-sum comparison,
//! cross-asset DCA and a set of derived calculators.
//!
//! ## Philosophy
//!
//! Every number is reproducible from its inputs:
//!
//! - **Exact money** - `rust_decimal` throughout, never `f64`
//! - **Calendar days** - purchases fall on UTC dates, prices bucket by day
//! - **No surprises** - zero denominators give 0, missing data gives a sentinel
//! - **Pure core** - only the `exchange` adapters touch files and clocks
//!
//! ## Example: $100 Weekly for a Year
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  price series ──► PriceIndex ──► Schedule walk ──► ledger   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  2024-01-01  $42,000  $100  0.00238095  cum 0.00238095      │
//! │  2024-01-08  $47,000  $100  0.00212766  cum 0.00450861      │
//! │  2024-01-15  $43,000  $100  0.00232558  cum 0.00683419      │
//! │  ...                                                        │
//! └─────────────────────────────────────────────────────────────┘
//!
//!   ledger ──► lump sum, comparison, milestones, CSV, share link
//!          ──► savings, inflation, FIRE, projection, cost basis
//! ```

pub mod analytics;
pub mod error;
pub mod exchange;
mod math;
pub mod model;
pub mod price_index;
pub mod share;
pub mod strategy;

pub use error::{DcaError, Result};
pub use model::{
    CostBasisPosition, Frequency, LumpSumResult, PriceMode, PriceProvider, PriceSample, PurchaseRecord,
    SimulationParameters, SimulationResult, ValuePoint, DEFAULT_MANUAL_PRICE,
};
pub use price_index::{PriceCursor, PriceIndex};
pub use strategy::{compare_strategies, lump_sum, simulate, Schedule, StrategyComparison, Winner};
