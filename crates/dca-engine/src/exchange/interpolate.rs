//! Daily Interpolation
//!
//! Expands sparse (weekly) candles into one sample per calendar day by
//! linear interpolation between neighbours. Optionally anchors the series
//! to a synthetic genesis point so histories reach back before the first
//! listed candle.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::model::PriceSample;
use crate::price_index::PriceIndex;

/// How sparse feeds are densified
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InterpolationPolicy {
    /// Prepended only when it falls before the first real candle
    pub genesis: Option<PriceSample>,
}

impl InterpolationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_genesis(mut self, genesis: PriceSample) -> Self {
        self.genesis = Some(genesis);
        self
    }

    /// First recorded BTC exchange trade, July 2010 at $0.09
    pub fn bitcoin() -> Self {
        Self {
            genesis: NaiveDate::from_ymd_opt(2010, 7, 18).map(|d| PriceSample::at_date(d, dec!(0.09))),
        }
    }
}

/// One sample per day from the first point to the last, at UTC midnight.
///
/// Non-positive prices are ignored. Several samples on one day collapse to
/// the earliest, as with simulation lookups.
pub fn interpolate_daily(samples: &[PriceSample], policy: &InterpolationPolicy) -> Vec<PriceSample> {
    let positive: Vec<PriceSample> = samples.iter().copied().filter(|s| s.price > Decimal::ZERO).collect();
    let index = PriceIndex::new(&positive);

    let mut anchors: Vec<(NaiveDate, Decimal)> = Vec::with_capacity(index.len() + 1);
    if let Some(genesis) = policy.genesis.filter(|g| g.price > Decimal::ZERO) {
        if let Some(day) = genesis.day() {
            if index.first_day().is_none_or(|first| day < first) {
                anchors.push((day, genesis.price));
            }
        }
    }
    anchors.extend_from_slice(index.days());

    let mut daily = Vec::new();
    for pair in anchors.windows(2) {
        let (from_day, from_price) = pair[0];
        let (to_day, to_price) = pair[1];
        let span = (to_day - from_day).num_days();
        let step = (to_price - from_price) / Decimal::from(span);

        for offset in 0..span {
            let Some(day) = u64::try_from(offset).ok().and_then(|o| from_day.checked_add_days(Days::new(o))) else {
                break;
            };
            daily.push(PriceSample::at_date(day, from_price + step * Decimal::from(offset)));
        }
    }
    if let Some(&(day, price)) = anchors.last() {
        daily.push(PriceSample::at_date(day, price));
    }

    tracing::debug!(anchors = anchors.len(), days = daily.len(), "interpolated daily series");
    daily
}
