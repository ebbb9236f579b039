//! Identifiers shared by the fetch task, the record store and the payload blobs.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category marker stored with every fetch record.
pub const FETCH_PARTITION: &str = "api-fetch";

/// Second-granularity identifier of one fetch attempt, e.g. `20240131235959`.
///
/// Two attempts inside the same wall-clock second share an id; the record
/// store upserts on it, so the later attempt wins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FetchId(String);

impl FetchId {
    pub fn from_datetime(timestamp: &DateTime<Local>) -> Self {
        Self(timestamp.format("%Y%m%d%H%M%S").to_string())
    }

    pub fn now() -> Self {
        Self::from_datetime(&Local::now())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FetchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for FetchId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Blob key holding the payload of fetch `id`.
pub fn blob_key(prefix: &str, id: &str) -> String {
    format!("{}/{}.json", prefix.trim_end_matches('/'), id)
}
