//! CSV Export
//!
//! Breakdown ledgers rendered for spreadsheets: UTF-8 BOM first, currency
//! columns at two decimals, unit columns at eight. Any field that a
//! spreadsheet would read as a formula is neutralized before quoting.

use std::borrow::Cow;

use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{DcaError, Result};
use crate::model::PurchaseRecord;

pub const UTF8_BOM: &str = "\u{feff}";

const CURRENCY_DP: u32 = 2;
const UNIT_DP: u32 = 8;

/// Leading characters that make spreadsheets evaluate a cell
const FORMULA_TRIGGERS: [char; 6] = ['=', '+', '-', '@', '\t', '\r'];

/// Prefix formula-looking text with a single quote
pub fn sanitize_field(field: &str) -> Cow<'_, str> {
    if field.starts_with(FORMULA_TRIGGERS) {
        Cow::Owned(format!("'{}", field))
    } else {
        Cow::Borrowed(field)
    }
}

/// Fixed-point text, half away from zero
pub fn format_fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", dp as usize, rounded)
}

/// Render a header and rows; every field is sanitized then quoted as needed
pub fn render_rows<R>(header: &[String], rows: impl IntoIterator<Item = R>) -> Result<String>
where
    R: IntoIterator<Item = String>,
{
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(header.iter().map(|h| sanitize_field(h).into_owned()))?;
    for row in rows {
        let fields: Vec<String> = row.into_iter().map(|f| sanitize_field(&f).into_owned()).collect();
        writer.write_record(&fields)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DcaError::Io(std::io::Error::other(e.to_string())))?;
    let body = String::from_utf8(bytes).map_err(|e| DcaError::Io(std::io::Error::other(e)))?;

    Ok(format!("{}{}", UTF8_BOM, body))
}

/// Column headers for a breakdown ledger of `instrument`
pub fn breakdown_header(instrument: &str) -> Vec<String> {
    vec![
        "Date".to_string(),
        format!("{} Price", instrument),
        "Amount Invested".to_string(),
        format!("{} Bought", instrument),
        "Cumulative Invested".to_string(),
        format!("Cumulative {}", instrument),
        "Portfolio Value".to_string(),
    ]
}

pub fn render_breakdown(records: &[PurchaseRecord], instrument: &str) -> Result<String> {
    let rows = records.iter().map(|r| {
        vec![
            r.date.format("%Y-%m-%d").to_string(),
            format_fixed(r.unit_price, CURRENCY_DP),
            format_fixed(r.cash_invested, CURRENCY_DP),
            format_fixed(r.units_acquired, UNIT_DP),
            format_fixed(r.cumulative_cash_invested, CURRENCY_DP),
            format_fixed(r.cumulative_units_acquired, UNIT_DP),
            format_fixed(r.portfolio_value, CURRENCY_DP),
        ]
    });
    render_rows(&breakdown_header(instrument), rows)
}

/// `<subject>-<start>-to-<end>.csv`, subject lowercased and slugged
pub fn csv_filename(subject: &str, start: NaiveDate, end: NaiveDate) -> String {
    let slug: String = subject
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = if slug.is_empty() { "portfolio".to_string() } else { slug };
    format!(
        "{}-{}-to-{}.csv",
        slug,
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    )
}
