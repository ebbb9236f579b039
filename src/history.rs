//! Time-range queries over the fetch record log.

use crate::error::RecordError;
use crate::records::{FetchRecord, RecordStore};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::sync::Arc;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Raw `from`/`to` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct LogRangeParams {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("Error: Date parameters 'from' and 'to' are required.")]
    Missing,

    #[error("Error: Malformed parameters in the request ({0})")]
    Malformed(String),
}

/// Validated, UTC-normalised query window. Both ends are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl LogRange {
    pub fn from_params(params: &LogRangeParams) -> Result<Self, RangeError> {
        let (Some(from), Some(to)) = (params.from.as_deref(), params.to.as_deref()) else {
            return Err(RangeError::Missing);
        };
        Ok(Self {
            from: parse_instant(from).map_err(RangeError::Malformed)?,
            to: parse_instant(to).map_err(RangeError::Malformed)?,
        })
    }
}

/// Parses an RFC 3339 date-time, or a naive one taken as server local time.
pub fn parse_instant(input: &str) -> Result<DateTime<Utc>, String> {
    let input = input.trim();
    let rfc3339_err = match DateTime::parse_from_rfc3339(input) {
        Ok(dt) => return Ok(dt.with_timezone(&Utc)),
        Err(e) => e,
    };

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| format!("'{}' is not a valid date-time: {}", input, rfc3339_err))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| format!("'{}' does not exist in the local time zone", input))
}

#[derive(Clone)]
pub struct HistoryService {
    records: Arc<dyn RecordStore>,
}

impl HistoryService {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }

    pub async fn query(&self, range: &LogRange) -> Result<Vec<FetchRecord>, RecordError> {
        self.records.query_between(range.from, range.to).await
    }

    /// Indented JSON array, in the order the store returned the records.
    pub fn render(records: &[FetchRecord]) -> serde_json::Result<String> {
        serde_json::to_string_pretty(records)
    }
}
