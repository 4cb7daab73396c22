//! Shareable Link Parameters
//!
//! Flat key/value encoding of a schedule for URLs. Decoding validates every
//! key on its own and silently drops the ones that fail, so a half-broken
//! link still restores whatever it can.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::model::{Frequency, PriceMode, PriceProvider, SimulationParameters};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Largest fee accepted from a link
pub const MAX_SHARED_FEE_PERCENT: Decimal = dec!(50);

/// Fields recovered from a link; `None` means "keep the default"
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamOverrides {
    pub amount: Option<Decimal>,
    pub frequency: Option<Frequency>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub fee: Option<Decimal>,
    pub mode: Option<PriceMode>,
    pub provider: Option<PriceProvider>,
    pub manual_price: Option<Decimal>,
}

impl ParamOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, base: &SimulationParameters) -> SimulationParameters {
        SimulationParameters {
            amount_per_purchase: self.amount.unwrap_or(base.amount_per_purchase),
            frequency: self.frequency.unwrap_or(base.frequency),
            start_date: self.start_date.unwrap_or(base.start_date),
            end_date: self.end_date.unwrap_or(base.end_date),
            fee_percent: self.fee.unwrap_or(base.fee_percent),
            price_mode: self.mode.unwrap_or(base.price_mode),
            manual_price: self.manual_price.unwrap_or(base.manual_price),
            provider: self.provider.unwrap_or(base.provider),
        }
    }

    /// Record one key if its value validates; unknown keys are ignored
    fn accept(&mut self, key: &str, value: &str) {
        match key {
            "amount" => set_if(&mut self.amount, positive_decimal(value)),
            "frequency" => set_if(&mut self.frequency, value.parse().ok()),
            "startDate" => set_if(&mut self.start_date, calendar_date(value)),
            "endDate" => set_if(&mut self.end_date, calendar_date(value)),
            "fee" => set_if(
                &mut self.fee,
                Decimal::from_str(value)
                    .ok()
                    .filter(|f| *f >= Decimal::ZERO && *f <= MAX_SHARED_FEE_PERCENT),
            ),
            "mode" => set_if(&mut self.mode, value.parse().ok()),
            "provider" => set_if(&mut self.provider, value.parse().ok()),
            "manualPrice" => set_if(&mut self.manual_price, positive_decimal(value)),
            _ => {}
        }
    }
}

fn set_if<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn positive_decimal(value: &str) -> Option<Decimal> {
    Decimal::from_str(value).ok().filter(|d| *d > Decimal::ZERO)
}

/// `YYYY-MM-DD` that survives a parse/format round trip, which rejects
/// impossible dates like Feb 30 and unpadded forms
fn calendar_date(value: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(value, DATE_FORMAT).ok()?;
    (date.format(DATE_FORMAT).to_string() == value).then_some(date)
}

/// Key/value pairs in a fixed order. `manualPrice` only appears in manual mode.
pub fn encode_params(params: &SimulationParameters) -> Vec<(&'static str, String)> {
    let mut pairs = vec![
        ("amount", params.amount_per_purchase.normalize().to_string()),
        ("frequency", params.frequency.as_str().to_string()),
        ("startDate", params.start_date.format(DATE_FORMAT).to_string()),
        ("endDate", params.end_date.format(DATE_FORMAT).to_string()),
        ("fee", params.fee_percent.normalize().to_string()),
        ("mode", params.price_mode.as_str().to_string()),
        ("provider", params.provider.as_str().to_string()),
    ];
    if params.price_mode == PriceMode::Manual {
        pairs.push(("manualPrice", params.manual_price.normalize().to_string()));
    }
    pairs
}

/// Decode key/value pairs; `None` when no field survived validation
pub fn decode_params<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Option<ParamOverrides>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut overrides = ParamOverrides::default();
    for (key, value) in pairs {
        overrides.accept(key.as_ref(), value.as_ref());
    }
    (!overrides.is_empty()).then_some(overrides)
}

pub fn to_query_string(params: &SimulationParameters) -> String {
    encode_params(params)
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(&v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn from_query_string(query: &str) -> Option<ParamOverrides> {
    let pairs = query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .filter_map(|(k, v)| {
            let key = urlencoding::decode(k).ok()?;
            let value = urlencoding::decode(v).ok()?;
            Some((key.into_owned(), value.into_owned()))
        });
    decode_params(pairs)
}
