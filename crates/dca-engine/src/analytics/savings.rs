//! Savings Account Comparison
//!
//! What the same deposits would have earned in an interest-bearing account.
//! Interest compounds daily at the rate equivalent to the quoted APY.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::math::{compound, fractional_pow, percent_of};
use crate::model::{SimulationParameters, ValuePoint};
use crate::strategy::Schedule;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsComparison {
    pub apy_percent: Decimal,
    pub total_deposited: Decimal,
    pub final_balance: Decimal,
    pub interest_earned: Decimal,
    pub roi_percent: Decimal,
    /// Balance right after each deposit
    pub balance_history: Vec<ValuePoint>,
}

/// Deposit `amount_per_purchase` on every scheduled date and compound.
///
/// `daily_rate = (1 + apy)^(1/365) - 1`; after each deposit the balance grows
/// for the days until the next deposit, and the last interval stops at
/// `end_date`.
pub fn savings_comparison(params: &SimulationParameters, apy_percent: Decimal) -> SavingsComparison {
    let annual_factor = Decimal::ONE + apy_percent / Decimal::ONE_HUNDRED;
    let daily_factor = fractional_pow(annual_factor, Decimal::ONE / Decimal::from(365));

    let mut balance = Decimal::ZERO;
    let mut total_deposited = Decimal::ZERO;
    let mut balance_history = Vec::new();

    let mut dates = Schedule::for_parameters(params).peekable();
    while let Some(date) = dates.next() {
        balance = balance.saturating_add(params.amount_per_purchase);
        total_deposited = total_deposited.saturating_add(params.amount_per_purchase);
        balance_history.push(ValuePoint {
            date,
            portfolio_value: balance,
        });

        let until = dates.peek().copied().unwrap_or(params.end_date);
        let days = (until - date).num_days();
        balance = balance.saturating_mul(compound(daily_factor, days));
    }

    let interest_earned = balance.saturating_sub(total_deposited);
    SavingsComparison {
        apy_percent,
        total_deposited,
        final_balance: balance,
        interest_earned,
        roi_percent: percent_of(interest_earned, total_deposited),
        balance_history,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Frequency;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn close(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
        (a - b).abs() <= tolerance
    }

    #[test]
    fn test_zero_apy_keeps_deposits() {
        let params = SimulationParameters::new(dec!(100), Frequency::Weekly, date(2021, 1, 1), date(2021, 12, 31));
        let savings = savings_comparison(&params, Decimal::ZERO);

        assert_eq!(savings.total_deposited, dec!(5300));
        assert_eq!(savings.final_balance, dec!(5300));
        assert_eq!(savings.interest_earned, Decimal::ZERO);
        assert_eq!(savings.balance_history.len(), 53);
    }

    #[test]
    fn test_single_deposit_compounds_to_end_only() {
        let params = SimulationParameters::new(dec!(1000), Frequency::Monthly, date(2021, 1, 1), date(2021, 1, 31));
        let savings = savings_comparison(&params, dec!(5));

        // 1000 * 1.05^(30/365)
        assert!(close(savings.final_balance, dec!(1004.018), dec!(0.01)));
        assert!(savings.roi_percent > Decimal::ZERO);
    }

    #[test]
    fn test_deposit_on_end_date_earns_nothing() {
        let params = SimulationParameters::new(dec!(1000), Frequency::Daily, date(2021, 1, 1), date(2021, 1, 1));
        let savings = savings_comparison(&params, dec!(10));
        assert_eq!(savings.final_balance, dec!(1000));
    }

    #[test]
    fn test_huge_deposits_saturate() {
        let amount = Decimal::from_i128_with_scale(10_i128.pow(28), 0);
        let params = SimulationParameters::new(amount, Frequency::Daily, date(2021, 1, 1), date(2021, 1, 10));
        let savings = savings_comparison(&params, dec!(5));

        assert_eq!(savings.total_deposited, Decimal::MAX);
        assert_eq!(savings.final_balance, Decimal::MAX);
        assert_eq!(savings.balance_history.len(), 10);
    }

    #[test]
    fn test_inverted_range() {
        let params = SimulationParameters::new(dec!(1000), Frequency::Daily, date(2021, 2, 1), date(2021, 1, 1));
        let savings = savings_comparison(&params, dec!(10));
        assert_eq!(savings.total_deposited, Decimal::ZERO);
        assert_eq!(savings.roi_percent, Decimal::ZERO);
    }
}
