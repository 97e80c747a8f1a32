//! Persistence layer: snippet records in `SQLite`.
//!
//! Layout:
//! - `snippets.rs`: the `Snippet` entity and `SnippetModel`, the only code
//!   that touches the `snippets` table
//! - `schema.rs`: DDL applied at startup

mod schema;
mod snippets;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::DatabaseConfig;

pub use schema::migrate;
pub use snippets::{Snippet, SnippetModel, LATEST_LIMIT};

/// Error returned by the snippet store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No live snippet matches; either absent or expired
    #[error("models: no matching record found")]
    NotFound,

    #[error("models: database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("models: invalid timestamp in column {0}")]
    InvalidTimestamp(&'static str),

    #[error("models: expiry of {0} days is out of range")]
    ExpiryOutOfRange(u32),
}

/// Open the connection pool, verify it with a ping and apply the schema.
///
/// Every store operation borrows a pooled connection for its own duration;
/// `acquire_timeout` bounds how long a request waits for one.
pub async fn open_db(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.dsn)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(config.busy_timeout));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout))
        .connect_with(options)
        .await?;

    if let Err(e) = sqlx::query("SELECT 1").execute(&pool).await {
        pool.close().await;
        return Err(e);
    }

    migrate(&pool).await?;
    Ok(pool)
}

/// Single-connection in-memory database with the schema applied
#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory database");
    migrate(&pool).await.expect("apply schema");
    pool
}
