// Snippet table DDL
// Timestamps are UTC Unix milliseconds so comparisons are plain integer ones

use sqlx::SqlitePool;

const CREATE_SNIPPETS: &str = "CREATE TABLE IF NOT EXISTS snippets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    created INTEGER NOT NULL,
    expires INTEGER NOT NULL
)";

const CREATE_EXPIRES_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_snippets_expires ON snippets (expires)";

/// Apply the schema; safe to run on every startup
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_SNIPPETS).execute(pool).await?;
    sqlx::query(CREATE_EXPIRES_INDEX).execute(pool).await?;
    Ok(())
}
