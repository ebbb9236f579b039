use crate::error::ConfigError;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api_url: String,
    pub fetch_interval_secs: u64,
    pub server: ServerSettings,
    pub blob: BlobSettings,
    pub records: RecordSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Key required by the payload endpoint.
    pub access_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobBackend {
    Local,
    S3,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlobSettings {
    pub path_prefix: String,
    pub backend: BlobBackend,
    pub local_root: PathBuf,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordSettings {
    pub database_path: PathBuf,
    pub table_name: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .set_default("fetch_interval_secs", 60)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 7071)?
            .set_default("blob.backend", "local")?
            .set_default("blob.local_root", "data/blobs")?
            .set_default("records.database_path", "data/fetch_log.db")?
            .set_default("records.table_name", "FetchLog")?
            .add_source(File::new("config/default", FileFormat::Toml).required(false))
            .add_source(File::new(&format!("config/{}", env), FileFormat::Toml).required(false))
            // FETCHER_API_URL, FETCHER_SERVER__ACCESS_KEY, ...
            .add_source(
                Environment::with_prefix("FETCHER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let settings: Settings = s.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects settings that would only fail later, at the point of use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        reqwest::Url::parse(&self.api_url)
            .map_err(|e| ConfigError::InvalidValue(format!("api_url '{}': {}", self.api_url, e)))?;

        if self.fetch_interval_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "fetch_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.server.access_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue("server.access_key is empty".to_string()));
        }
        if self.blob.path_prefix.trim_matches('/').is_empty() {
            return Err(ConfigError::InvalidValue("blob.path_prefix is empty".to_string()));
        }
        if self.blob.backend == BlobBackend::S3 {
            if self.blob.s3_bucket.as_deref().map_or(true, str::is_empty) {
                return Err(ConfigError::InvalidValue(
                    "blob.s3_bucket is required for the s3 backend".to_string(),
                ));
            }
            if self.blob.s3_region.as_deref().map_or(true, str::is_empty) {
                return Err(ConfigError::InvalidValue(
                    "blob.s3_region is required for the s3 backend".to_string(),
                ));
            }
        }
        if !is_valid_table_name(&self.records.table_name) {
            return Err(ConfigError::InvalidValue(format!(
                "records.table_name '{}' must be 3-63 alphanumeric characters starting with a letter",
                self.records.table_name
            )));
        }
        Ok(())
    }

    pub fn fetch_interval(&self) -> Duration {
        Duration::from_secs(self.fetch_interval_secs)
    }
}

pub fn is_valid_table_name(name: &str) -> bool {
    (3..=63).contains(&name.len())
        && name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_alphanumeric())
}
