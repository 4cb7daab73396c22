//! Price History Sources
//!
//! Abstractions for obtaining daily price series. The simulation core only
//! ever sees `Vec<PriceSample>`; everything that touches files, feeds or
//! caches lives behind [`PriceHistorySource`].

mod cache;
mod feed;
mod file;
mod interpolate;
mod mock;

pub use cache::{CachedPriceSource, Clock, SystemClock};
pub use feed::FeedFormat;
pub use file::FilePriceSource;
pub use interpolate::{interpolate_daily, InterpolationPolicy};
pub use mock::MockPriceSource;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::Result;
use crate::model::PriceSample;

/// Price history source trait (Strategy pattern)
///
/// Implement this for each feed: local snapshots, exchange proxies, etc.
#[async_trait]
pub trait PriceHistorySource: Send + Sync {
    /// Full daily history for an asset symbol, e.g. `BTC`
    async fn price_history(&self, asset: &str) -> Result<Vec<PriceSample>>;

    /// Most recent positive price in the history
    async fn latest_price(&self, asset: &str) -> Result<Option<Decimal>> {
        let history = self.price_history(asset).await?;
        Ok(history
            .iter()
            .filter(|s| s.price > Decimal::ZERO)
            .max_by_key(|s| s.timestamp_ms)
            .map(|s| s.price))
    }

    /// Source name
    fn name(&self) -> &str;
}

/// Cache and lookup key for an asset symbol
pub(crate) fn asset_key(asset: &str) -> String {
    asset.trim().to_uppercase()
}
