use api_fetch_log::app_state::{AppState, Stores};
use api_fetch_log::config::Settings;
use api_fetch_log::fetcher::Fetcher;
use api_fetch_log::prelude::*;
use api_fetch_log::server::run_server;
use dotenv::dotenv;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();
    info!("Starting API fetch log service");

    let settings = Settings::new()?;
    let stores = Stores::open(&settings).await?;

    let fetcher = Arc::new(Fetcher::new(
        reqwest::Client::new(),
        settings.api_url.clone(),
        settings.blob.path_prefix.clone(),
        stores.blobs.clone(),
        stores.records.clone(),
    ));
    tokio::spawn(fetcher.start_fetch_task(settings.fetch_interval()));

    let app_state = AppState::new(
        &stores,
        settings.blob.path_prefix.clone(),
        settings.server.access_key.clone(),
    );
    run_server(app_state, &settings.server).await?;

    info!("Server stopped");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
