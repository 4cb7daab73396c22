//! Application State

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use dca_engine::exchange::{CachedPriceSource, Clock, FilePriceSource, InterpolationPolicy, PriceHistorySource, SystemClock};

use crate::config::ServerConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Price histories, cached per asset
    pub prices: Arc<dyn PriceHistorySource>,

    /// Clock used for "today" in default parameters
    pub clock: Arc<dyn Clock>,

    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(prices: Arc<dyn PriceHistorySource>, config: ServerConfig) -> Self {
        Self {
            prices,
            clock: Arc::new(SystemClock),
            config: Arc::new(config),
        }
    }

    /// File-backed, cached source as configured
    pub fn from_config(config: ServerConfig) -> Self {
        let mut files = FilePriceSource::new(&config.price_dir, config.price_format);
        if config.weekly_interpolation {
            files = files
                .with_interpolation(InterpolationPolicy::new())
                .with_asset_interpolation("BTC", InterpolationPolicy::bitcoin());
        }
        let cached = CachedPriceSource::new(files, Duration::seconds(config.cache_ttl_secs));
        Self::new(Arc::new(cached), config)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }
}
