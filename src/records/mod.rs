mod sqlite_store;

pub use sqlite_store::SqliteRecordStore;

use crate::error::RecordError;
use crate::fetch_id::FetchId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one fetch attempt, as kept by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRecord {
    pub partition_key: String,
    pub id: FetchId,
    pub success: bool,
    /// Assigned by the store on every write.
    pub timestamp: DateTime<Utc>,
    /// Opaque version tag, changes on every write.
    pub etag: String,
}

/// Queryable log of fetch attempts.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts or overwrites the record for `id`, stamping it with the current time.
    async fn upsert(&self, id: &FetchId, success: bool) -> Result<FetchRecord, RecordError>;

    /// Records whose timestamp lies strictly between `from` and `to`.
    async fn query_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<FetchRecord>, RecordError>;
}
