//! Database module - AppState and database operations
//!
//! Queries are grouped per domain, each file adding an `impl AppState` block:
//! - `dictionary` - departments, positions, cities, vehicle types/categories, airports
//! - `reference` - posts, contracts, INNs and agreement persons (soft delete)
//! - `personnel` / `fleet` - employees and vehicles
//! - `requests` - pass requests and shift requests
//! - `ttn`, `work_permit`, `daily_request`, `electricity`, `uniform`
//! - `checklist`, `acceptance_act`, `safety`, `reports`
//! - `seed` - reference data inserted by `init-db`

mod acceptance_act;
mod checklist;
mod daily_request;
mod dictionary;
mod electricity;
mod fleet;
mod personnel;
mod reference;
mod reports;
mod requests;
mod safety;
mod seed;
mod ttn;
mod uniform;
mod work_permit;

use log::info;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::storage::{FileStorage, LocalStorage, StorageError};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub storage: Arc<dyn FileStorage>,
    pub config: AppConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("storage setup failed: {0}")]
    Storage(#[from] StorageError),
}

/// Result of deleting a reference record that other records may point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    /// Number of records still referring to it.
    InUse(i64),
}

impl AppState {
    /// Connects, applies migrations and lays out the storage root.
    pub async fn new(config: AppConfig) -> Result<Self, StartupError> {
        let pool = connect(&config.database_url).await?;
        let storage = LocalStorage::new(&config.storage_root);
        storage.ensure_layout()?;
        Self::new_with_pool_and_storage(pool, Arc::new(storage), config).await
    }

    pub async fn new_with_pool_and_storage(
        pool: SqlitePool,
        storage: Arc<dyn FileStorage>,
        config: AppConfig,
    ) -> Result<Self, StartupError> {
        MIGRATOR.run(&pool).await?;
        info!("Database schema is up to date");
        Ok(AppState {
            pool,
            storage,
            config,
        })
    }
}

/// Opens a SQLite pool. An in-memory database lives in one connection, so
/// such pools are capped at one connection that is never recycled.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let in_memory = database_url.contains(":memory:");
    let pool = SqlitePoolOptions::new()
        .max_connections(if in_memory { 1 } else { 5 })
        .acquire_timeout(Duration::from_secs(30));
    let pool = if in_memory {
        pool.idle_timeout(None).max_lifetime(None)
    } else {
        pool.idle_timeout(Duration::from_secs(900))
            .max_lifetime(Duration::from_secs(1800))
    };

    pool.connect_with(options).await
}

pub(crate) fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => db.is_foreign_key_violation(),
        _ => false,
    }
}

pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}
