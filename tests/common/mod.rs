//! Common test utilities.
#![allow(dead_code)]

use api_fetch_log::app_state::{AppState, Stores};
use api_fetch_log::error::{BlobError, RecordError};
use api_fetch_log::fetch_id::{FetchId, FETCH_PARTITION};
use api_fetch_log::records::{FetchRecord, RecordStore, SqliteRecordStore};
use api_fetch_log::server;
use api_fetch_log::storage::{BlobStore, LocalBlobStore};
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const ACCESS_KEY: &str = "test-access-key";
pub const BLOB_PREFIX: &str = "payloads";

/// Router plus direct handles on the stores behind it.
pub struct TestApp {
    pub router: Router,
    pub blobs: Arc<LocalBlobStore>,
    pub records: Arc<SqliteRecordStore>,
    _tmp: TempDir,
}

pub fn test_app() -> TestApp {
    let tmp = TempDir::new().unwrap();
    let blobs = Arc::new(LocalBlobStore::new(tmp.path().join("blobs")).unwrap());
    let records = Arc::new(SqliteRecordStore::open_in_memory("FetchLog").unwrap());

    let stores = Stores {
        blobs: blobs.clone(),
        records: records.clone(),
    };
    let state = AppState::new(&stores, BLOB_PREFIX.to_string(), ACCESS_KEY.to_string());

    TestApp {
        router: server::create_router(state),
        blobs,
        records,
        _tmp: tmp,
    }
}

pub fn router_with(stores: Stores) -> Router {
    server::create_router(AppState::new(
        &stores,
        BLOB_PREFIX.to_string(),
        ACCESS_KEY.to_string(),
    ))
}

/// Blob store whose every operation fails.
pub struct BrokenBlobStore;

#[async_trait::async_trait]
impl BlobStore for BrokenBlobStore {
    async fn put(&self, key: &str, _data: &[u8]) -> Result<(), BlobError> {
        Err(BlobError::Write(format!("{}: disk full", key)))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        Err(BlobError::Read(format!("{}: connection reset", key)))
    }
}

/// Record store whose every operation fails.
pub struct BrokenRecordStore;

#[async_trait::async_trait]
impl RecordStore for BrokenRecordStore {
    async fn upsert(&self, _id: &FetchId, _success: bool) -> Result<FetchRecord, RecordError> {
        Err(RecordError::LockPoisoned)
    }

    async fn query_between(
        &self,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
    ) -> Result<Vec<FetchRecord>, RecordError> {
        Err(RecordError::LockPoisoned)
    }
}

/// In-memory record store that keeps every upsert, including same-id repeats.
#[derive(Default)]
pub struct CountingRecordStore {
    upserts: Mutex<Vec<(FetchId, bool)>>,
}

impl CountingRecordStore {
    pub fn upserts(&self) -> Vec<(FetchId, bool)> {
        self.upserts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RecordStore for CountingRecordStore {
    async fn upsert(&self, id: &FetchId, success: bool) -> Result<FetchRecord, RecordError> {
        self.upserts.lock().unwrap().push((id.clone(), success));
        Ok(FetchRecord {
            partition_key: FETCH_PARTITION.to_string(),
            id: id.clone(),
            success,
            timestamp: Utc::now(),
            etag: String::new(),
        })
    }

    async fn query_between(
        &self,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
    ) -> Result<Vec<FetchRecord>, RecordError> {
        Ok(Vec::new())
    }
}
