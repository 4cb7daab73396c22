//! File Price Source
//!
//! Reads `<dir>/<asset>.json` snapshots in one configured feed format,
//! optionally densifying weekly candles into daily samples.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use super::{asset_key, interpolate_daily, FeedFormat, InterpolationPolicy, PriceHistorySource};
use crate::error::{DcaError, Result};
use crate::model::PriceSample;

pub struct FilePriceSource {
    dir: PathBuf,
    format: FeedFormat,
    interpolation: Option<InterpolationPolicy>,
    asset_interpolation: HashMap<String, InterpolationPolicy>,
}

impl FilePriceSource {
    pub fn new(dir: impl Into<PathBuf>, format: FeedFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
            interpolation: None,
            asset_interpolation: HashMap::new(),
        }
    }

    /// Interpolate every loaded feed to daily resolution
    pub fn with_interpolation(mut self, policy: InterpolationPolicy) -> Self {
        self.interpolation = Some(policy);
        self
    }

    /// Policy for one asset only, taking precedence over the shared one
    pub fn with_asset_interpolation(mut self, asset: &str, policy: InterpolationPolicy) -> Self {
        self.asset_interpolation.insert(asset_key(asset), policy);
        self
    }

    fn policy_for(&self, asset: &str) -> Option<&InterpolationPolicy> {
        self.asset_interpolation.get(&asset_key(asset)).or(self.interpolation.as_ref())
    }

    fn path_for(&self, asset: &str) -> Result<PathBuf> {
        let symbol = asset.trim();
        if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DcaError::UnsupportedAsset(asset.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", symbol.to_lowercase())))
    }
}

#[async_trait]
impl PriceHistorySource for FilePriceSource {
    async fn price_history(&self, asset: &str) -> Result<Vec<PriceSample>> {
        let path = self.path_for(asset)?;
        let body = match tokio::fs::read_to_string(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DcaError::UnsupportedAsset(asset.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let samples = self.format.parse(&body)?;
        tracing::debug!(path = %path.display(), format = %self.format, samples = samples.len(), "loaded price feed");

        Ok(match self.policy_for(asset) {
            Some(policy) => interpolate_daily(&samples, policy),
            None => samples,
        })
    }

    fn name(&self) -> &str {
        "FilePriceSource"
    }
}
