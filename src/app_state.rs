use crate::config::Settings;
use crate::error::Result;
use crate::history::HistoryService;
use crate::payload::PayloadService;
use crate::records::{RecordStore, SqliteRecordStore};
use crate::storage::{build_blob_store, BlobStore};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::info;

pub struct AppState {
    pub history: HistoryService,
    pub payloads: PayloadService,
    pub access_key: String,
    pub start_time: SystemTime,
}

/// Store handles shared between the fetch task and the HTTP handlers.
#[derive(Clone)]
pub struct Stores {
    pub blobs: Arc<dyn BlobStore>,
    pub records: Arc<dyn RecordStore>,
}

impl Stores {
    pub async fn open(settings: &Settings) -> Result<Self> {
        let blobs = build_blob_store(&settings.blob).await?;
        let records = SqliteRecordStore::open(
            &settings.records.database_path,
            &settings.records.table_name,
        )?;
        info!(
            backend = ?settings.blob.backend,
            database = ?settings.records.database_path,
            table = %settings.records.table_name,
            "Opened stores"
        );
        Ok(Self {
            blobs,
            records: Arc::new(records),
        })
    }
}

impl AppState {
    pub fn new(stores: &Stores, blob_prefix: String, access_key: String) -> Arc<Self> {
        Arc::new(AppState {
            history: HistoryService::new(stores.records.clone()),
            payloads: PayloadService::new(stores.blobs.clone(), blob_prefix),
            access_key,
            start_time: SystemTime::now(),
        })
    }
}
