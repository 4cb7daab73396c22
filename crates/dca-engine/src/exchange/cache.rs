//! Cached Price Source
//!
//! Keeps each asset's history for a fixed time-to-live so repeated
//! simulations do not refetch the feed. Failed fetches are never cached.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use super::{asset_key, PriceHistorySource};
use crate::error::Result;
use crate::model::PriceSample;

/// Current time, abstracted for testing
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

struct CacheEntry {
    fetched_at: DateTime<Utc>,
    samples: Arc<Vec<PriceSample>>,
}

pub struct CachedPriceSource<S> {
    inner: S,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl<S: PriceHistorySource> CachedPriceSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            clock: Arc::new(SystemClock),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Drop one asset so the next request refetches it
    pub async fn invalidate(&self, asset: &str) {
        self.entries.write().await.remove(&asset_key(asset));
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    async fn fresh(&self, key: &str) -> Option<Arc<Vec<PriceSample>>> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        (self.clock.now() - entry.fetched_at < self.ttl).then(|| Arc::clone(&entry.samples))
    }
}

#[async_trait]
impl<S: PriceHistorySource> PriceHistorySource for CachedPriceSource<S> {
    async fn price_history(&self, asset: &str) -> Result<Vec<PriceSample>> {
        let key = asset_key(asset);
        if let Some(samples) = self.fresh(&key).await {
            tracing::debug!(asset = %key, "price history cache hit");
            return Ok(samples.as_ref().clone());
        }

        tracing::debug!(asset = %key, source = self.inner.name(), "price history cache miss");
        let samples = Arc::new(self.inner.price_history(asset).await?);
        self.entries.write().await.insert(
            key,
            CacheEntry {
                fetched_at: self.clock.now(),
                samples: Arc::clone(&samples),
            },
        );
        Ok(samples.as_ref().clone())
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
