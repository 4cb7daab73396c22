//! Mock Price Source
//!
//! In-memory histories for tests and demos.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{asset_key, PriceHistorySource};
use crate::error::{DcaError, Result};
use crate::model::PriceSample;

/// Mock source with fixed series per asset
#[derive(Clone, Debug, Default)]
pub struct MockPriceSource {
    series: HashMap<String, Vec<PriceSample>>,
    /// Fail every request as if the upstream were down
    unavailable: bool,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, asset: &str, samples: Vec<PriceSample>) -> Self {
        self.series.insert(asset_key(asset), samples);
        self
    }

    /// A source whose every fetch fails with a retryable error
    pub fn unavailable() -> Self {
        Self {
            series: HashMap::new(),
            unavailable: true,
        }
    }
}

#[async_trait]
impl PriceHistorySource for MockPriceSource {
    async fn price_history(&self, asset: &str) -> Result<Vec<PriceSample>> {
        if self.unavailable {
            return Err(DcaError::PriceSource(format!("mock source offline for {}", asset)));
        }
        self.series
            .get(&asset_key(asset))
            .cloned()
            .ok_or_else(|| DcaError::UnsupportedAsset(asset.to_string()))
    }

    fn name(&self) -> &str {
        "MockPriceSource"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let source = MockPriceSource::new().with_series("btc", vec![PriceSample::at_date(day(1), dec!(60000))]);

        let history = source.price_history("BTC").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].price, dec!(60000));
    }

    #[tokio::test]
    async fn test_unknown_asset() {
        let err = MockPriceSource::new().price_history("DOGE").await.unwrap_err();
        assert!(matches!(err, DcaError::UnsupportedAsset(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_latest_price_skips_non_positive() {
        let source = MockPriceSource::new().with_series(
            "ETH",
            vec![
                PriceSample::at_date(day(3), Decimal::ZERO),
                PriceSample::at_date(day(1), dec!(3000)),
                PriceSample::at_date(day(2), dec!(3100)),
            ],
        );
        assert_eq!(source.latest_price("eth").await.unwrap(), Some(dec!(3100)));
    }

    #[tokio::test]
    async fn test_unavailable_is_retryable() {
        let err = MockPriceSource::unavailable().price_history("BTC").await.unwrap_err();
        assert!(err.is_retryable());
    }
}
