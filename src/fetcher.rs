use crate::error::{BlobError, FetchError, RecordError};
use crate::fetch_id::{blob_key, FetchId};
use crate::records::{FetchRecord, RecordStore};
use crate::storage::BlobStore;
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, info_span, Instrument};

/// What one tick did. Informational only; a tick never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub id: FetchId,
    pub success: bool,
    /// `None` when no payload was in hand to store.
    pub payload_stored: Option<bool>,
    pub recorded: bool,
}

pub struct Fetcher {
    client: reqwest::Client,
    api_url: String,
    blob_prefix: String,
    blobs: Arc<dyn BlobStore>,
    records: Arc<dyn RecordStore>,
}

impl Fetcher {
    pub fn new(
        client: reqwest::Client,
        api_url: String,
        blob_prefix: String,
        blobs: Arc<dyn BlobStore>,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            client,
            api_url,
            blob_prefix,
            blobs,
            records,
        }
    }

    pub async fn run_tick(&self) -> TickReport {
        self.run_tick_at(Local::now()).await
    }

    pub async fn run_tick_at(&self, now: DateTime<Local>) -> TickReport {
        let id = FetchId::from_datetime(&now);
        let span = info_span!("fetch_tick", id = %id);

        async {
            let (success, payload_stored) = match self.send_request().await {
                Ok(response) => match Self::read_body(response).await {
                    Ok(payload) => {
                        info!(bytes = payload.len(), "Fetched payload");
                        let stored = match self.store_payload(&id, &payload).await {
                            Ok(()) => true,
                            Err(e) => {
                                error!(error = %e, "Failed to store payload");
                                false
                            }
                        };
                        (true, Some(stored))
                    }
                    // The status already counted as success; only the blob is skipped.
                    Err(e) => {
                        error!(error = %e, "Failed to read payload");
                        (true, None)
                    }
                },
                Err(e) => {
                    error!(error = %e, "Data fetch failed");
                    (false, None)
                }
            };

            let recorded = match self.record_outcome(&id, success).await {
                Ok(_) => true,
                Err(e) => {
                    error!(error = %e, "Failed to save fetch record");
                    false
                }
            };

            TickReport {
                id: id.clone(),
                success,
                payload_stored,
                recorded,
            }
        }
        .instrument(span)
        .await
    }

    /// One GET against the upstream API; any non-2xx status is a failure.
    pub async fn send_request(&self) -> Result<reqwest::Response, FetchError> {
        let response = self.client.get(&self.api_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(response)
    }

    pub async fn read_body(response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
        let body = response.bytes().await.map_err(FetchError::Body)?;
        Ok(body.to_vec())
    }

    pub async fn store_payload(&self, id: &FetchId, payload: &[u8]) -> Result<(), BlobError> {
        let key = blob_key(&self.blob_prefix, id.as_str());
        self.blobs.put(&key, payload).await
    }

    pub async fn record_outcome(
        &self,
        id: &FetchId,
        success: bool,
    ) -> Result<FetchRecord, RecordError> {
        self.records.upsert(id, success).await
    }

    pub async fn start_fetch_task(self: Arc<Self>, period: Duration) {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(url = %self.api_url, ?period, "Fetch task started");
        loop {
            interval.tick().await;
            let report = self.run_tick().await;
            debug!(?report, "Tick finished");
        }
    }
}
