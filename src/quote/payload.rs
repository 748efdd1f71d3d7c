//! GLOBAL_QUOTE payload classification
//!
//! The upstream answers every request with HTTP 200 and signals problems in
//! the body: a throttled key gets a `Note` or `Information` notice, an unknown
//! symbol gets an empty `Global Quote` object or an `Error Message`.

use super::Quote;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

/// Key of the quote section
pub const GLOBAL_QUOTE_KEY: &str = "Global Quote";
/// Fields carrying a throttling notice
pub const RATE_LIMIT_KEYS: &[&str] = &["Note", "Information"];

const PRICE_FIELD: &str = "05. price";
const CHANGE_PERCENT_FIELD: &str = "10. change percent";
const TRADING_DAY_FIELD: &str = "07. latest trading day";

/// What a payload means for the batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A usable quote
    Quote(Quote),
    /// The key is throttled; carries the upstream notice text
    RateLimited(String),
    /// No quote section for the symbol
    NoData,
    /// Quote section present but price or change unparseable
    InvalidFormat,
}

/// Classify a decoded GLOBAL_QUOTE response body
pub fn classify_payload(payload: &Value) -> Classification {
    let section = payload
        .get(GLOBAL_QUOTE_KEY)
        .and_then(Value::as_object)
        .filter(|section| !section.is_empty());

    if let Some(section) = section {
        return match parse_quote(section) {
            Some(quote) => Classification::Quote(quote),
            None => Classification::InvalidFormat,
        };
    }

    if let Some(notice) = rate_limit_notice(payload) {
        return Classification::RateLimited(notice);
    }

    Classification::NoData
}

/// Extract the throttling notice, if any
pub fn rate_limit_notice(payload: &Value) -> Option<String> {
    RATE_LIMIT_KEYS.iter().find_map(|key| {
        payload.get(*key).map(|notice| match notice {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    })
}

fn parse_quote(section: &Map<String, Value>) -> Option<Quote> {
    let price = parse_decimal(section.get(PRICE_FIELD)?)?;
    let change_percent = parse_percent(section.get(CHANGE_PERCENT_FIELD)?)?;
    let latest_trading_day = section
        .get(TRADING_DAY_FIELD)
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok());

    Some(Quote {
        price,
        change_percent,
        latest_trading_day,
    })
}

fn parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}

/// Parse "1.2345%" or "1.2345"
fn parse_percent(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            let s = s.strip_suffix('%').unwrap_or(s);
            Decimal::from_str(s.trim()).ok()
        }
        other => parse_decimal(other),
    }
}
