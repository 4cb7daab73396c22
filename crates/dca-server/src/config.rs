//! Server Configuration
//!
//! Read from the environment (after `.env` is loaded). Unset variables fall
//! back to defaults; set but unparseable ones are an error.

use std::path::PathBuf;

use dca_engine::exchange::FeedFormat;
use dca_engine::{DcaError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,

    /// Directory holding `<asset>.json` price feeds
    pub price_dir: PathBuf,

    pub price_format: FeedFormat,

    /// How long a loaded history is reused
    pub cache_ttl_secs: i64,

    /// Asset simulated when a request names none
    pub default_asset: String,

    /// Densify weekly candles to daily samples on load
    pub weekly_interpolation: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".into(),
            price_dir: PathBuf::from("data"),
            price_format: FeedFormat::Pairs,
            cache_ttl_secs: 300,
            default_asset: "BTC".into(),
            weekly_interpolation: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let price_format = match lookup("DCA_PRICE_FORMAT") {
            Some(raw) => raw.parse().map_err(DcaError::Config)?,
            None => defaults.price_format,
        };
        let cache_ttl_secs = match lookup("DCA_PRICE_CACHE_TTL_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|ttl| *ttl >= 0)
                .ok_or_else(|| DcaError::Config(format!("DCA_PRICE_CACHE_TTL_SECS must be a non-negative integer, got '{}'", raw)))?,
            None => defaults.cache_ttl_secs,
        };
        let weekly_interpolation = match lookup("DCA_WEEKLY_INTERPOLATION") {
            Some(raw) => parse_flag(&raw)
                .ok_or_else(|| DcaError::Config(format!("DCA_WEEKLY_INTERPOLATION must be true or false, got '{}'", raw)))?,
            None => defaults.weekly_interpolation,
        };

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            price_dir: lookup("DCA_PRICE_DIR").map_or(defaults.price_dir, PathBuf::from),
            price_format,
            cache_ttl_secs,
            default_asset: lookup("DCA_DEFAULT_ASSET")
                .map(|a| a.trim().to_uppercase())
                .filter(|a| !a.is_empty())
                .unwrap_or(defaults.default_asset),
            weekly_interpolation,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
