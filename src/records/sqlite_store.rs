use super::{FetchRecord, RecordStore};
use crate::config::is_valid_table_name;
use crate::error::RecordError;
use crate::fetch_id::{FetchId, FETCH_PARTITION};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Record store kept in a single SQLite table.
///
/// Statements run on the blocking pool so disk I/O never stalls a runtime worker.
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
    table: String,
}

impl SqliteRecordStore {
    pub fn open(db_path: impl AsRef<Path>, table: &str) -> Result<Self, RecordError> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::with_connection(Connection::open(db_path)?, table)
    }

    pub fn open_in_memory(table: &str) -> Result<Self, RecordError> {
        Self::with_connection(Connection::open_in_memory()?, table)
    }

    fn with_connection(conn: Connection, table: &str) -> Result<Self, RecordError> {
        if !is_valid_table_name(table) {
            return Err(RecordError::InvalidTableName(table.to_string()));
        }
        conn.execute_batch(&format!(
            r#"
            PRAGMA journal_mode=WAL;

            CREATE TABLE IF NOT EXISTS {table} (
              partition_key TEXT NOT NULL,
              id TEXT NOT NULL,
              success INTEGER NOT NULL,
              timestamp_us INTEGER NOT NULL,
              etag TEXT NOT NULL,
              PRIMARY KEY (partition_key, id)
            );

            CREATE INDEX IF NOT EXISTS idx_{table}_timestamp ON {table}(timestamp_us);
            "#
        ))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            table: table.to_string(),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, RecordError>
    where
        F: FnOnce(&Connection, &str) -> Result<T, RecordError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        let table = self.table.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| RecordError::LockPoisoned)?;
            f(&*conn, &table)
        })
        .await?
    }
}

fn etag_for(timestamp: &DateTime<Utc>) -> String {
    format!("W/\"{}\"", timestamp.timestamp_micros())
}

#[async_trait::async_trait]
impl RecordStore for SqliteRecordStore {
    async fn upsert(&self, id: &FetchId, success: bool) -> Result<FetchRecord, RecordError> {
        let now = Utc::now();
        let timestamp_us = now.timestamp_micros();
        let timestamp = DateTime::from_timestamp_micros(timestamp_us)
            .ok_or(RecordError::TimestampOutOfRange(timestamp_us))?;
        let record = FetchRecord {
            partition_key: FETCH_PARTITION.to_string(),
            id: id.clone(),
            success,
            etag: etag_for(&timestamp),
            timestamp,
        };

        let row = record.clone();
        self.with_conn(move |conn, table| {
            conn.execute(
                &format!(
                    r#"
                    INSERT INTO {} (partition_key, id, success, timestamp_us, etag)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    ON CONFLICT(partition_key, id) DO UPDATE SET
                      success=excluded.success,
                      timestamp_us=excluded.timestamp_us,
                      etag=excluded.etag
                    "#,
                    table
                ),
                params![row.partition_key, row.id.as_str(), row.success, timestamp_us, row.etag],
            )?;
            Ok(())
        })
        .await?;

        debug!(id = %record.id, success, "Upserted fetch record");
        Ok(record)
    }

    async fn query_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<FetchRecord>, RecordError> {
        self.with_conn(move |conn, table| {
            let mut stmt = conn.prepare(&format!(
                r#"
                SELECT partition_key, id, success, timestamp_us, etag
                FROM {}
                WHERE timestamp_us > ?1 AND timestamp_us < ?2
                ORDER BY partition_key ASC, id ASC
                "#,
                table
            ))?;
            let rows =
                stmt.query_map(params![from.timestamp_micros(), to.timestamp_micros()], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, bool>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                })?;

            let mut records = Vec::new();
            for row in rows {
                let (partition_key, id, success, timestamp_us, etag) = row?;
                let timestamp = DateTime::from_timestamp_micros(timestamp_us)
                    .ok_or(RecordError::TimestampOutOfRange(timestamp_us))?;
                records.push(FetchRecord {
                    partition_key,
                    id: FetchId::from(id),
                    success,
                    timestamp,
                    etag,
                });
            }
            Ok(records)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn far_past() -> DateTime<Utc> {
        Utc::now() - Duration::days(1)
    }

    fn far_future() -> DateTime<Utc> {
        Utc::now() + Duration::days(1)
    }

    #[tokio::test]
    async fn test_upsert_assigns_timestamp_and_etag() {
        let store = SqliteRecordStore::open_in_memory("FetchLog").unwrap();
        let before = Utc::now() - Duration::seconds(1);

        let record = store
            .upsert(&FetchId::from("20240101000000".to_string()), true)
            .await
            .unwrap();

        assert_eq!(record.partition_key, FETCH_PARTITION);
        assert!(record.success);
        assert!(record.timestamp > before);
        assert!(!record.etag.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_same_id_overwrites() {
        let store = SqliteRecordStore::open_in_memory("FetchLog").unwrap();
        let id = FetchId::from("20240101000000".to_string());

        store.upsert(&id, false).await.unwrap();
        store.upsert(&id, true).await.unwrap();

        let records = store.query_between(far_past(), far_future()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].success);
    }

    #[tokio::test]
    async fn test_query_bounds_are_exclusive() {
        let store = SqliteRecordStore::open_in_memory("FetchLog").unwrap();
        let record = store
            .upsert(&FetchId::from("20240101000000".to_string()), true)
            .await
            .unwrap();

        let at = record.timestamp;
        assert!(store.query_between(at, far_future()).await.unwrap().is_empty());
        assert!(store.query_between(far_past(), at).await.unwrap().is_empty());
        assert_eq!(
            store
                .query_between(at - Duration::microseconds(1), at + Duration::microseconds(1))
                .await
                .unwrap(),
            vec![record]
        );
    }

    #[tokio::test]
    async fn test_inverted_range_is_empty() {
        let store = SqliteRecordStore::open_in_memory("FetchLog").unwrap();
        store
            .upsert(&FetchId::from("20240101000000".to_string()), true)
            .await
            .unwrap();

        let records = store.query_between(far_future(), far_past()).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("nested/fetch_log.db");
        {
            let store = SqliteRecordStore::open(&db_path, "FetchLog").unwrap();
            store
                .upsert(&FetchId::from("20240101000000".to_string()), false)
                .await
                .unwrap();
        }

        let store = SqliteRecordStore::open(&db_path, "FetchLog").unwrap();
        let records = store.query_between(far_past(), far_future()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.as_str(), "20240101000000");
        assert!(!records[0].success);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_upserts_from_many_tasks() {
        let store = Arc::new(SqliteRecordStore::open_in_memory("FetchLog").unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let id = FetchId::from(format!("2024010100000{}", i));
                    store.upsert(&id, i % 2 == 0).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let records = store.query_between(far_past(), far_future()).await.unwrap();
        assert_eq!(records.len(), 8);
        assert_eq!(records.iter().filter(|r| r.success).count(), 4);
    }

    #[test]
    fn test_rejects_invalid_table_name() {
        let result = SqliteRecordStore::open_in_memory("bad name");
        assert!(matches!(result, Err(RecordError::InvalidTableName(_))));
    }
}
