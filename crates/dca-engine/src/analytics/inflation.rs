//! Purchasing-power adjustments
//!
//! Deflates a nominal portfolio value by CPI, or expresses it against M2
//! money-supply growth, over the simulation window.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::math::{percent_of, safe_div};
use crate::model::{PriceSample, SimulationResult};
use crate::price_index::PriceIndex;

/// Portfolio value in start-of-window dollars
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InflationAdjustment {
    pub cpi_at_start: Decimal,
    pub cpi_at_end: Decimal,
    pub cumulative_inflation_percent: Decimal,
    pub real_value: Decimal,
    pub real_profit: Decimal,
    pub real_roi_percent: Decimal,
}

/// Portfolio value measured against money-supply expansion
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneySupplyAdjustment {
    pub m2_at_start: Decimal,
    pub m2_at_end: Decimal,
    pub expansion_percent: Decimal,
    pub value_in_start_terms: Decimal,
}

/// First and last index values inside `[start, end]`.
///
/// Absent with fewer than two points in the window or a non-positive
/// endpoint.
fn window_endpoints(series: &[PriceSample], start: NaiveDate, end: NaiveDate) -> Option<(Decimal, Decimal)> {
    let index = PriceIndex::new(series);
    let window = index.range(start, end);
    if window.len() < 2 {
        return None;
    }
    let (_, first) = window[0];
    let (_, last) = window[window.len() - 1];
    (first > Decimal::ZERO && last > Decimal::ZERO).then_some((first, last))
}

/// `real = nominal * cpi_start / cpi_end`
pub fn adjust_for_inflation(
    result: &SimulationResult,
    cpi: &[PriceSample],
    start: NaiveDate,
    end: NaiveDate,
) -> Option<InflationAdjustment> {
    let (cpi_at_start, cpi_at_end) = window_endpoints(cpi, start, end)?;

    let real_value = result.current_value.saturating_mul(safe_div(cpi_at_start, cpi_at_end));
    let real_profit = real_value.saturating_sub(result.total_invested);

    Some(InflationAdjustment {
        cpi_at_start,
        cpi_at_end,
        cumulative_inflation_percent: percent_of(cpi_at_end - cpi_at_start, cpi_at_start),
        real_value,
        real_profit,
        real_roi_percent: percent_of(real_profit, result.total_invested),
    })
}

pub fn adjust_for_money_supply(
    current_value: Decimal,
    m2: &[PriceSample],
    start: NaiveDate,
    end: NaiveDate,
) -> Option<MoneySupplyAdjustment> {
    let (m2_at_start, m2_at_end) = window_endpoints(m2, start, end)?;

    Some(MoneySupplyAdjustment {
        m2_at_start,
        m2_at_end,
        expansion_percent: percent_of(m2_at_end - m2_at_start, m2_at_start),
        value_in_start_terms: current_value.saturating_mul(safe_div(m2_at_start, m2_at_end)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn result_worth(invested: Decimal, value: Decimal) -> SimulationResult {
        SimulationResult::from_totals(invested, Decimal::ONE, value, Vec::new())
    }

    fn cpi_series() -> Vec<PriceSample> {
        vec![
            PriceSample::at_date(date(2019, 12, 1), dec!(99)),
            PriceSample::at_date(date(2020, 1, 1), dec!(100)),
            PriceSample::at_date(date(2020, 7, 1), dec!(102)),
            PriceSample::at_date(date(2021, 1, 1), dec!(125)),
        ]
    }

    #[test]
    fn test_real_value() {
        let adjusted = adjust_for_inflation(&result_worth(dec!(800), dec!(1000)), &cpi_series(), date(2020, 1, 1), date(2021, 1, 1))
            .unwrap();

        assert_eq!(adjusted.cpi_at_start, dec!(100));
        assert_eq!(adjusted.cpi_at_end, dec!(125));
        assert_eq!(adjusted.cumulative_inflation_percent, dec!(25));
        assert_eq!(adjusted.real_value, dec!(800));
        assert_eq!(adjusted.real_profit, Decimal::ZERO);
    }

    #[test]
    fn test_needs_two_points() {
        let result = result_worth(dec!(100), dec!(100));
        assert!(adjust_for_inflation(&result, &cpi_series(), date(2020, 8, 1), date(2020, 12, 31)).is_none());
        assert!(adjust_for_inflation(&result, &[], date(2020, 1, 1), date(2021, 1, 1)).is_none());
    }

    #[test]
    fn test_non_positive_endpoint() {
        let series = vec![
            PriceSample::at_date(date(2020, 1, 1), Decimal::ZERO),
            PriceSample::at_date(date(2020, 2, 1), dec!(5)),
        ];
        assert!(adjust_for_money_supply(dec!(100), &series, date(2020, 1, 1), date(2020, 3, 1)).is_none());
    }

    #[test]
    fn test_money_supply_expansion() {
        let m2 = vec![
            PriceSample::at_date(date(2020, 1, 1), dec!(15000)),
            PriceSample::at_date(date(2021, 1, 1), dec!(19500)),
        ];
        let adjusted = adjust_for_money_supply(dec!(1300), &m2, date(2020, 1, 1), date(2021, 1, 1)).unwrap();
        assert_eq!(adjusted.expansion_percent, dec!(30));
        assert_eq!(adjusted.value_in_start_terms.round_dp(8), dec!(1000));
    }
}
