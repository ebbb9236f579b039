use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::io;
use tracing::error;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Persistence error: {0}")]
    Storage(#[from] StorageError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Configuration parsing error: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("Blob error: {0}")]
    Blob(#[from] BlobError),

    #[error("Record error: {0}")]
    Record(#[from] RecordError),
}

#[derive(thiserror::Error, Debug)]
pub enum BlobError {
    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Invalid blob key: {0}")]
    InvalidKey(String),

    #[error("Failed to create blob directory: {0}")]
    DirectoryCreation(io::Error),

    #[error("Failed to read blob: {0}")]
    Read(String),

    #[error("Failed to write blob: {0}")]
    Write(String),

    #[error("Blob is not valid UTF-8 text: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    #[error("S3 config error: {0}")]
    S3Config(String),
}

#[derive(thiserror::Error, Debug)]
pub enum RecordError {
    #[error("Database error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Failed to create database directory: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Record store lock poisoned")]
    LockPoisoned,

    #[error("Record store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Stored timestamp out of range: {0}")]
    TimestampOutOfRange(i64),
}

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upstream returned {0}")]
    Status(reqwest::StatusCode),

    #[error("Failed to read response body: {0}")]
    Body(reqwest::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("Server initialization error: {0}")]
    Init(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Missing or invalid access key")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            ServerError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ServerError::Unauthorized.to_string(),
            )
                .into_response(),
            ServerError::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
            ServerError::Init(detail) | ServerError::Internal(detail) => {
                error!(error = %detail, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

impl From<RecordError> for ServerError {
    fn from(err: RecordError) -> Self {
        ServerError::Internal(err.to_string())
    }
}

impl From<BlobError> for Error {
    fn from(err: BlobError) -> Self {
        Error::Storage(StorageError::Blob(err))
    }
}

impl From<RecordError> for Error {
    fn from(err: RecordError) -> Self {
        Error::Storage(StorageError::Record(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
