//! Domain Models
//!
//! Core data types for DCA simulation: price samples, schedule parameters,
//! the per-purchase ledger and simulation outcomes.
//! Uses `rust_decimal` for all monetary values - never use f64 for money!

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Months, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::math::{percent_of, safe_div};

/// Manual price used when nothing better is known
pub const DEFAULT_MANUAL_PRICE: Decimal = dec!(50000);

/// A single `[timestampMillis, price]` observation.
///
/// Serialized as a two-element array, the shape every upstream feed is
/// normalized to. CPI and M2 series reuse the same shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(i64, Decimal)", into = "(i64, Decimal)")]
pub struct PriceSample {
    /// Epoch milliseconds
    pub timestamp_ms: i64,

    /// Price (or index value) at that instant
    pub price: Decimal,
}

impl PriceSample {
    pub fn new(timestamp_ms: i64, price: Decimal) -> Self {
        Self { timestamp_ms, price }
    }

    /// Sample stamped at UTC midnight of `date`
    pub fn at_date(date: NaiveDate, price: Decimal) -> Self {
        let timestamp_ms = date.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
        Self { timestamp_ms, price }
    }

    /// UTC calendar day this sample belongs to
    pub fn day(&self) -> Option<NaiveDate> {
        DateTime::from_timestamp_millis(self.timestamp_ms).map(|dt| dt.date_naive())
    }
}

impl From<(i64, Decimal)> for PriceSample {
    fn from((timestamp_ms, price): (i64, Decimal)) -> Self {
        Self { timestamp_ms, price }
    }
}

impl From<PriceSample> for (i64, Decimal) {
    fn from(sample: PriceSample) -> Self {
        (sample.timestamp_ms, sample.price)
    }
}

/// Purchase cadence
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
        }
    }

    /// Next scheduled date after `date`.
    ///
    /// Monthly steps use calendar-month addition, clamping to the last day
    /// of shorter months (Jan 31 -> Feb 29 in a leap year).
    pub fn advance(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Frequency::Daily => date.checked_add_days(chrono::Days::new(1)),
            Frequency::Weekly => date.checked_add_days(chrono::Days::new(7)),
            Frequency::Biweekly => date.checked_add_days(chrono::Days::new(14)),
            Frequency::Monthly => date.checked_add_months(Months::new(1)),
        }
    }

    /// Purchases made in one year at this cadence
    pub fn purchases_per_year(&self) -> u32 {
        match self {
            Frequency::Daily => 365,
            Frequency::Weekly => 52,
            Frequency::Biweekly => 26,
            Frequency::Monthly => 12,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "biweekly" => Ok(Frequency::Biweekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(format!("unknown frequency '{}'", other)),
        }
    }
}

/// Where purchase prices come from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceMode {
    /// Historical series from a price source
    Api,
    /// One fixed price for every purchase
    Manual,
}

impl PriceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceMode::Api => "api",
            PriceMode::Manual => "manual",
        }
    }
}

impl FromStr for PriceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "api" => Ok(PriceMode::Api),
            "manual" => Ok(PriceMode::Manual),
            other => Err(format!("unknown price mode '{}'", other)),
        }
    }
}

/// Upstream exchange whose history feeds API mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceProvider {
    #[default]
    Kraken,
    Coinbase,
}

impl PriceProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceProvider::Kraken => "kraken",
            PriceProvider::Coinbase => "coinbase",
        }
    }
}

impl FromStr for PriceProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kraken" => Ok(PriceProvider::Kraken),
            "coinbase" => Ok(PriceProvider::Coinbase),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

/// Investment schedule to simulate
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParameters {
    /// Gross cash spent on every purchase
    pub amount_per_purchase: Decimal,

    pub frequency: Frequency,

    /// First scheduled purchase (inclusive)
    pub start_date: NaiveDate,

    /// Last possible purchase date (inclusive)
    pub end_date: NaiveDate,

    /// Exchange fee in percent, clamped into [0, 100] before use
    pub fee_percent: Decimal,

    pub price_mode: PriceMode,

    /// Fixed price for manual mode, and the last-resort fallback in API mode
    pub manual_price: Decimal,

    #[serde(default)]
    pub provider: PriceProvider,
}

impl SimulationParameters {
    pub fn new(
        amount_per_purchase: Decimal,
        frequency: Frequency,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            amount_per_purchase,
            frequency,
            start_date,
            end_date,
            fee_percent: Decimal::ZERO,
            price_mode: PriceMode::Api,
            manual_price: DEFAULT_MANUAL_PRICE,
            provider: PriceProvider::default(),
        }
    }

    /// $100 weekly over the year ending at `today`
    pub fn defaults_as_of(today: NaiveDate) -> Self {
        let start = today.checked_sub_months(Months::new(12)).unwrap_or(today);
        Self::new(dec!(100), Frequency::Weekly, start, today)
    }

    pub fn with_fee(mut self, fee_percent: Decimal) -> Self {
        self.fee_percent = fee_percent;
        self
    }

    pub fn with_manual_price(mut self, price: Decimal) -> Self {
        self.price_mode = PriceMode::Manual;
        self.manual_price = price;
        self
    }

    pub fn clamped_fee_percent(&self) -> Decimal {
        self.fee_percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
    }

    /// Share of each purchase left after fees
    pub fn fee_factor(&self) -> Decimal {
        Decimal::ONE - self.clamped_fee_percent() / Decimal::ONE_HUNDRED
    }
}

/// One executed purchase in the ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub date: NaiveDate,

    pub unit_price: Decimal,

    /// Gross amount put in at this step (fees are not deducted here)
    pub cash_invested: Decimal,

    pub cumulative_cash_invested: Decimal,

    /// Units bought with the post-fee amount
    pub units_acquired: Decimal,

    pub cumulative_units_acquired: Decimal,

    /// `cumulative_units_acquired * unit_price`
    pub portfolio_value: Decimal,
}

/// Outcome of a DCA simulation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub total_invested: Decimal,
    pub units_accumulated: Decimal,
    pub average_cost: Decimal,
    /// Price used to value the stack
    pub final_price: Decimal,
    pub current_value: Decimal,
    pub profit: Decimal,
    pub roi_percent: Decimal,
    pub breakdown: Vec<PurchaseRecord>,
}

impl SimulationResult {
    /// Derive valuation fields from accumulated totals
    pub fn from_totals(
        total_invested: Decimal,
        units_accumulated: Decimal,
        final_price: Decimal,
        breakdown: Vec<PurchaseRecord>,
    ) -> Self {
        let current_value = units_accumulated.saturating_mul(final_price);
        let profit = current_value.saturating_sub(total_invested);
        Self {
            total_invested,
            units_accumulated,
            average_cost: safe_div(total_invested, units_accumulated),
            final_price,
            current_value,
            profit,
            roi_percent: percent_of(profit, total_invested),
            breakdown,
        }
    }

    /// `current_value / total_invested`, 0 when nothing was spent
    pub fn multiplier(&self) -> Decimal {
        safe_div(self.current_value, self.total_invested)
    }

    /// Date of the first purchase
    pub fn first_purchase(&self) -> Option<NaiveDate> {
        self.breakdown.first().map(|r| r.date)
    }

    /// Date of the last purchase
    pub fn last_purchase(&self) -> Option<NaiveDate> {
        self.breakdown.last().map(|r| r.date)
    }
}

/// Outcome of investing everything at once
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LumpSumResult {
    pub total_invested: Decimal,
    pub units_accumulated: Decimal,
    /// Entry price, absent when no usable price existed
    pub entry_price: Option<Decimal>,
    pub entry_date: Option<NaiveDate>,
    pub current_value: Decimal,
    pub profit: Decimal,
    pub roi_percent: Decimal,
}

impl LumpSumResult {
    /// Everything lost; keeps comparisons well-defined when prices are missing
    pub fn total_loss(total_cash: Decimal) -> Self {
        Self {
            total_invested: total_cash,
            units_accumulated: Decimal::ZERO,
            entry_price: None,
            entry_date: None,
            current_value: Decimal::ZERO,
            profit: -total_cash,
            roi_percent: dec!(-100),
        }
    }

    pub fn multiplier(&self) -> Decimal {
        safe_div(self.current_value, self.total_invested)
    }
}

/// Portfolio value on one scheduled date
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuePoint {
    pub date: NaiveDate,
    pub portfolio_value: Decimal,
}

/// A saved schedule aggregated into a combined cost basis
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBasisPosition {
    #[serde(default = "new_position_id")]
    pub id: String,
    pub label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub amount_per_purchase: Decimal,
    pub frequency: Frequency,
    #[serde(default)]
    pub fee_percent: Decimal,
}

fn new_position_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl CostBasisPosition {
    pub fn new(
        label: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        amount_per_purchase: Decimal,
        frequency: Frequency,
    ) -> Self {
        Self {
            id: new_position_id(),
            label: label.into(),
            start_date,
            end_date,
            amount_per_purchase,
            frequency,
            fee_percent: Decimal::ZERO,
        }
    }

    pub fn with_fee(mut self, fee_percent: Decimal) -> Self {
        self.fee_percent = fee_percent;
        self
    }

    /// Schedule for this position, taking price settings from `template`
    pub fn to_parameters(&self, template: &SimulationParameters) -> SimulationParameters {
        SimulationParameters {
            amount_per_purchase: self.amount_per_purchase,
            frequency: self.frequency,
            start_date: self.start_date,
            end_date: self.end_date,
            fee_percent: self.fee_percent,
            ..template.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_sample_day_bucketing() {
        let sample = PriceSample::at_date(date(2020, 1, 1), dec!(7200));
        assert_eq!(sample.timestamp_ms, 1_577_836_800_000);

        let late = PriceSample::new(sample.timestamp_ms + 23 * 3_600_000, dec!(7300));
        assert_eq!(late.day(), Some(date(2020, 1, 1)));
    }

    #[test]
    fn test_sample_serializes_as_pair() {
        let sample: PriceSample = serde_json::from_str("[1577836800000, 7200.5]").unwrap();
        assert_eq!(sample.price, dec!(7200.5));
        let json = serde_json::to_value(sample).unwrap();
        assert!(json.is_array());
    }

    #[test]
    fn test_monthly_advance_clamps() {
        assert_eq!(Frequency::Monthly.advance(date(2024, 1, 31)), Some(date(2024, 2, 29)));
        assert_eq!(Frequency::Biweekly.advance(date(2024, 2, 20)), Some(date(2024, 3, 5)));
    }

    #[test]
    fn test_fee_clamp() {
        let params = SimulationParameters::new(dec!(100), Frequency::Weekly, date(2020, 1, 1), date(2020, 2, 1))
            .with_fee(dec!(150));
        assert_eq!(params.clamped_fee_percent(), dec!(100));
        assert_eq!(params.fee_factor(), Decimal::ZERO);

        let negative = params.with_fee(dec!(-5));
        assert_eq!(negative.fee_factor(), Decimal::ONE);
    }

    #[test]
    fn test_result_from_totals_zero_guard() {
        let result = SimulationResult::from_totals(Decimal::ZERO, Decimal::ZERO, dec!(100), Vec::new());
        assert_eq!(result.average_cost, Decimal::ZERO);
        assert_eq!(result.roi_percent, Decimal::ZERO);
        assert_eq!(result.multiplier(), Decimal::ZERO);
    }

    #[test]
    fn test_position_inherits_price_settings() {
        let template = SimulationParameters::defaults_as_of(date(2024, 6, 1)).with_manual_price(dec!(30000));
        let position = CostBasisPosition::new("Stack", date(2021, 1, 1), date(2021, 12, 31), dec!(50), Frequency::Monthly);
        let params = position.to_parameters(&template);
        assert_eq!(params.manual_price, dec!(30000));
        assert_eq!(params.amount_per_purchase, dec!(50));
        assert_eq!(params.start_date, date(2021, 1, 1));
    }
}
