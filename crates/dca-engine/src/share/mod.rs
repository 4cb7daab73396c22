//! Sharing and Export
//!
//! Link parameters for restoring a simulation and CSV ledgers for
//! spreadsheets.

mod export;
mod params;

pub use export::{
    breakdown_header, csv_filename, format_fixed, render_breakdown, render_rows, sanitize_field, UTF8_BOM,
};
pub use params::{
    decode_params, encode_params, from_query_string, to_query_string, ParamOverrides, MAX_SHARED_FEE_PERCENT,
};
