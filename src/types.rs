use crate::constants::{COL_ID, COL_MUNICIPALITY, COL_PROPERTY_TYPE, REQUIRED_COLUMNS};
use crate::error::{EtlError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Scraping timestamp as it appears in the source: either a date/datetime
/// string or an integer of epoch nanoseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDate {
    EpochNanos(i64),
    Text(String),
}

const NANOS_PER_SEC: i64 = 1_000_000_000;

impl RawDate {
    /// Interpret the value as a calendar date. Time-of-day and offsets are
    /// discarded; the date is taken as written.
    pub fn to_date(&self) -> Option<NaiveDate> {
        match self {
            RawDate::EpochNanos(ns) => DateTime::from_timestamp(
                ns.div_euclid(NANOS_PER_SEC),
                ns.rem_euclid(NANOS_PER_SEC) as u32,
            )
            .map(|dt| dt.date_naive()),
            RawDate::Text(s) => parse_date_text(s.trim()),
        }
    }
}

impl std::fmt::Display for RawDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawDate::EpochNanos(ns) => write!(f, "{ns}"),
            RawDate::Text(s) => write!(f, "{s:?}"),
        }
    }
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local().date());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| NaiveDate::parse_from_str(s, "%Y/%m/%d").ok())
}

/// One scraped listing exactly as captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,
    pub raw_price: Option<String>,
    pub living_area: Option<f64>,
    pub property_type: Option<String>,
    pub municipality: Option<String>,
    pub scraping_date: Option<RawDate>,
}

impl RawRecord {
    /// Build a record from one decoded JSON line. A required key that is
    /// absent is a batch-level error; a key present with `null` is not.
    pub fn from_json(value: serde_json::Value, line: usize) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| EtlError::Json {
            line,
            source: serde::de::Error::custom("expected a JSON object"),
        })?;
        if let Some(column) = REQUIRED_COLUMNS.iter().find(|c| !object.contains_key(**c)) {
            return Err(EtlError::MissingColumn { column: *column, line });
        }
        // Scrapers sometimes emit ids, types or municipalities as numbers.
        let mut value = value;
        for column in [COL_ID, COL_PROPERTY_TYPE, COL_MUNICIPALITY] {
            if let Some(field) = value.get_mut(column) {
                if field.is_number() || field.is_boolean() {
                    *field = serde_json::Value::String(field.to_string());
                }
            }
        }
        serde_json::from_value(value).map_err(|source| EtlError::Json { line, source })
    }
}

/// Validated, normalized, deduplicated listing in output column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanRecord {
    pub id: String,
    /// ISO 8601 calendar date, `YYYY-MM-DD`.
    pub scraping_date: String,
    pub property_type: String,
    pub municipality: Option<String>,
    pub price: f64,
    pub living_area: f64,
    #[serde(rename = "price_per_square_meter")]
    pub price_per_area: f64,
}
