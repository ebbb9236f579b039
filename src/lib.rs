pub mod app_state;
pub mod config;
pub mod error;
pub mod fetch_id;
pub mod fetcher;
pub mod history;
pub mod payload;
pub mod prelude;
pub mod records;
pub mod server;
pub mod storage;
