//! Feed Formats
//!
//! Strict parsers for the raw shapes price histories arrive in. Rows that
//! do not match the expected shape fail the whole feed; rows with a
//! non-positive close are dropped with a warning.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DcaError, Result};
use crate::model::PriceSample;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedFormat {
    /// `[[timestamp_ms, price], ...]`
    #[default]
    Pairs,
    /// Kraken public OHLC response, close price per candle
    Kraken,
    /// Coinbase candles `[[sec, low, high, open, close, volume], ...]`
    Coinbase,
}

impl FeedFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedFormat::Pairs => "pairs",
            FeedFormat::Kraken => "kraken",
            FeedFormat::Coinbase => "coinbase",
        }
    }

    /// Parse a feed body into samples sorted by timestamp
    pub fn parse(&self, body: &str) -> Result<Vec<PriceSample>> {
        let raw = match self {
            FeedFormat::Pairs => parse_pairs(body)?,
            FeedFormat::Kraken => parse_kraken(body)?,
            FeedFormat::Coinbase => parse_coinbase(body)?,
        };

        let mut samples: Vec<PriceSample> = raw
            .into_iter()
            .filter(|s| {
                let keep = s.price > Decimal::ZERO;
                if !keep {
                    tracing::warn!(
                        format = self.as_str(),
                        timestamp_ms = s.timestamp_ms,
                        price = %s.price,
                        "dropping feed row with non-positive price"
                    );
                }
                keep
            })
            .collect();
        samples.sort_by_key(|s| s.timestamp_ms);
        Ok(samples)
    }
}

impl fmt::Display for FeedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pairs" => Ok(FeedFormat::Pairs),
            "kraken" => Ok(FeedFormat::Kraken),
            "coinbase" => Ok(FeedFormat::Coinbase),
            other => Err(format!("unknown feed format: {}", other)),
        }
    }
}

fn malformed(format: FeedFormat) -> impl Fn(serde_json::Error) -> DcaError {
    move |e| DcaError::MalformedFeed(format!("{} feed: {}", format, e))
}

fn seconds_to_ms(seconds: i64) -> Result<i64> {
    seconds
        .checked_mul(1000)
        .ok_or_else(|| DcaError::MalformedFeed(format!("timestamp out of range: {}", seconds)))
}

fn parse_pairs(body: &str) -> Result<Vec<PriceSample>> {
    serde_json::from_str(body).map_err(malformed(FeedFormat::Pairs))
}

/// `[time, open, high, low, close, vwap, volume, count]`
#[derive(Deserialize)]
struct KrakenCandle(i64, String, String, String, String, String, String, u64);

#[derive(Deserialize)]
struct KrakenResponse {
    error: Vec<String>,
    #[serde(default)]
    result: HashMap<String, serde_json::Value>,
}

fn parse_kraken(body: &str) -> Result<Vec<PriceSample>> {
    let response: KrakenResponse = serde_json::from_str(body).map_err(malformed(FeedFormat::Kraken))?;
    if !response.error.is_empty() {
        return Err(DcaError::PriceSource(response.error.join("; ")));
    }

    // The pair key varies (XXBTZUSD, XETHZUSD, ...); `last` is the pagination cursor.
    let candles = response
        .result
        .into_iter()
        .find(|(key, _)| key != "last")
        .map(|(_, value)| value)
        .ok_or_else(|| DcaError::MalformedFeed("kraken feed: no pair in result".into()))?;
    let candles: Vec<KrakenCandle> = serde_json::from_value(candles).map_err(malformed(FeedFormat::Kraken))?;

    candles
        .into_iter()
        .map(|KrakenCandle(time, _, _, _, close, ..)| {
            let price = Decimal::from_str(&close)
                .map_err(|e| DcaError::MalformedFeed(format!("kraken close '{}': {}", close, e)))?;
            Ok(PriceSample::new(seconds_to_ms(time)?, price))
        })
        .collect()
}

/// `[time, low, high, open, close, volume]`
#[derive(Deserialize)]
struct CoinbaseCandle(i64, Decimal, Decimal, Decimal, Decimal, Decimal);

fn parse_coinbase(body: &str) -> Result<Vec<PriceSample>> {
    let candles: Vec<CoinbaseCandle> = serde_json::from_str(body).map_err(malformed(FeedFormat::Coinbase))?;
    candles
        .into_iter()
        .map(|CoinbaseCandle(time, _, _, _, close, _)| Ok(PriceSample::new(seconds_to_ms(time)?, close)))
        .collect()
}
