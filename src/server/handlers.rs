use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{debug, info, warn};
use crate::app_state::AppState;
use crate::error::{BlobError, ServerError};
use crate::history::{HistoryService, LogRange, LogRangeParams};

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let uptime = state.start_time.elapsed().unwrap_or_default();
    let response = serde_json::json!({
        "status": "ok",
        "uptime": format!("{}s", uptime.as_secs()),
        "message": "API Fetch Log Server is running"
    });
    tracing::debug!("Health check response: {:?}", response);
    Json(response)
}

pub async fn get_logs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LogRangeParams>,
) -> Result<impl IntoResponse, ServerError> {
    let range =
        LogRange::from_params(&params).map_err(|e| ServerError::BadRequest(e.to_string()))?;

    let records = state.history.query(&range).await?;
    let body = HistoryService::render(&records)
        .map_err(|e| ServerError::Internal(format!("Failed to serialize records: {}", e)))?;

    info!(from = %range.from, to = %range.to, count = records.len(), "Served fetch history");
    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}

pub async fn get_log_payload(
    State(state): State<Arc<AppState>>,
    Path(log_id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    match state.payloads.fetch(&log_id).await {
        Ok(payload) => Ok(([(header::CONTENT_TYPE, "application/json")], payload)),
        Err(e) => {
            match &e {
                BlobError::NotFound(_) => debug!(%log_id, "Payload does not exist"),
                other => warn!(%log_id, error = %other, "Payload could not be read"),
            }
            Err(ServerError::NotFound(format!("Log not found ({})", e)))
        }
    }
}
