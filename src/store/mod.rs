//! Persistent storage for employees and their facts
//!
//! A single SQLite file holds two tables, `employee` and `fact`. The handle
//! is opened once at startup and held for the whole run.

pub mod sqlite;

pub use sqlite::FactStore;

use crate::config::Config;
use crate::error::Result;

/// Open the store at the configured database path
pub async fn open_configured(config: &Config) -> Result<FactStore> {
    tracing::info!("Using database {}", config.storage.database_path.display());
    FactStore::open(&config.storage.database_path).await
}
