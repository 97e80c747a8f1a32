use chrono::{DateTime, Days, Utc};
use futures::TryStreamExt;
use sqlx::{FromRow, SqlitePool};

use super::StoreError;

/// Maximum number of snippets returned by [`SnippetModel::latest`]
pub const LATEST_LIMIT: i64 = 10;

const INSERT_SNIPPET: &str =
    "INSERT INTO snippets (title, content, created, expires) VALUES (?, ?, ?, ?)";

const SELECT_SNIPPET: &str = "SELECT id, title, content, created, expires FROM snippets
    WHERE expires > ? AND id = ?";

const SELECT_LATEST: &str = "SELECT id, title, content, created, expires FROM snippets
    WHERE expires > ?
    ORDER BY id DESC LIMIT ?";

/// A stored text snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

/// Row as laid out in the `snippets` table.
#[derive(FromRow)]
struct SnippetRow {
    id: i64,
    title: String,
    content: String,
    created: i64,
    expires: i64,
}

impl TryFrom<SnippetRow> for Snippet {
    type Error = StoreError;

    fn try_from(row: SnippetRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            title: row.title,
            content: row.content,
            created: DateTime::from_timestamp_millis(row.created)
                .ok_or(StoreError::InvalidTimestamp("created"))?,
            expires: DateTime::from_timestamp_millis(row.expires)
                .ok_or(StoreError::InvalidTimestamp("expires"))?,
        })
    }
}

/// Gateway to the `snippets` table.
///
/// Cloning is cheap; clones share the pool. Each call checks a connection
/// out of the pool and returns it when the call finishes, so a model can be
/// used from any number of requests at once.
///
/// A snippet is live while the current time is before its expiry. Expired
/// rows stay in the table but are never returned.
#[derive(Clone)]
pub struct SnippetModel {
    pool: SqlitePool,
}

impl SnippetModel {
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[cfg(test)]
    pub(crate) const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert a snippet that expires `expires_days` days from now.
    /// Returns the id assigned by the database.
    pub async fn insert(
        &self,
        title: &str,
        content: &str,
        expires_days: u32,
    ) -> Result<i64, StoreError> {
        self.insert_at(title, content, expires_days, Utc::now())
            .await
    }

    pub async fn insert_at(
        &self,
        title: &str,
        content: &str,
        expires_days: u32,
        now: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let expires = now
            .checked_add_days(Days::new(u64::from(expires_days)))
            .ok_or(StoreError::ExpiryOutOfRange(expires_days))?;

        let result = sqlx::query(INSERT_SNIPPET)
            .bind(title)
            .bind(content)
            .bind(now.timestamp_millis())
            .bind(expires.timestamp_millis())
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// Fetch a live snippet by id.
    pub async fn get(&self, id: i64) -> Result<Snippet, StoreError> {
        self.get_at(id, Utc::now()).await
    }

    pub async fn get_at(&self, id: i64, now: DateTime<Utc>) -> Result<Snippet, StoreError> {
        let row: Option<SnippetRow> = sqlx::query_as(SELECT_SNIPPET)
            .bind(now.timestamp_millis())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or(StoreError::NotFound)?.try_into()
    }

    /// Up to ten live snippets, newest first.
    pub async fn latest(&self) -> Result<Vec<Snippet>, StoreError> {
        self.latest_at(Utc::now()).await
    }

    pub async fn latest_at(&self, now: DateTime<Utc>) -> Result<Vec<Snippet>, StoreError> {
        let mut rows = sqlx::query_as::<_, SnippetRow>(SELECT_LATEST)
            .bind(now.timestamp_millis())
            .bind(LATEST_LIMIT)
            .fetch(&self.pool);

        // An error on any row fails the whole call, not just the first fetch
        let mut snippets = Vec::new();
        while let Some(row) = rows.try_next().await? {
            snippets.push(Snippet::try_from(row)?);
        }

        Ok(snippets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::memory_pool;
    use chrono::{TimeDelta, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_insert_then_get() {
        let model = SnippetModel::new(memory_pool().await);
        let id = model
            .insert_at("O snail", "haiku text", 7, t0())
            .await
            .unwrap();

        let snippet = model.get_at(id, t0()).await.unwrap();
        assert_eq!(snippet.id, id);
        assert_eq!(snippet.title, "O snail");
        assert_eq!(snippet.content, "haiku text");
        assert_eq!(snippet.created, t0());
        assert_eq!(snippet.expires - snippet.created, TimeDelta::days(7));
    }

    #[tokio::test]
    async fn test_snippet_expires_after_ttl() {
        let model = SnippetModel::new(memory_pool().await);
        let id = model
            .insert_at("O snail", "haiku text", 7, t0())
            .await
            .unwrap();
        assert_eq!(id, 1);

        let day_one = model.get_at(1, t0() + TimeDelta::days(1)).await.unwrap();
        assert_eq!(day_one.expires, t0() + TimeDelta::days(7));

        let day_eight = model.get_at(1, t0() + TimeDelta::days(8)).await;
        assert!(matches!(day_eight, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_expiry_boundary_is_exclusive() {
        let model = SnippetModel::new(memory_pool().await);
        let id = model.insert_at("t", "c", 1, t0()).await.unwrap();

        let just_before = t0() + TimeDelta::days(1) - TimeDelta::milliseconds(1);
        assert!(model.get_at(id, just_before).await.is_ok());
        assert!(matches!(
            model.get_at(id, t0() + TimeDelta::days(1)).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let model = SnippetModel::new(memory_pool().await);
        assert!(matches!(model.get(42).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_expired_row_is_kept() {
        let pool = memory_pool().await;
        let model = SnippetModel::new(pool.clone());
        model.insert_at("old", "gone", 1, t0()).await.unwrap();

        assert!(model.latest_at(t0() + TimeDelta::days(2)).await.unwrap().is_empty());

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM snippets")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_latest_empty() {
        let model = SnippetModel::new(memory_pool().await);
        assert!(model.latest().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_latest_limit_order_and_expiry() {
        let model = SnippetModel::new(memory_pool().await);
        // Every third snippet lives for one day, the rest for a week
        for i in 1..=18 {
            let days = if i % 3 == 0 { 1 } else { 7 };
            model
                .insert_at(&format!("snippet {i}"), "body", days, t0())
                .await
                .unwrap();
        }

        let latest = model.latest_at(t0() + TimeDelta::days(2)).await.unwrap();
        assert_eq!(latest.len(), 10);

        let ids: Vec<i64> = latest.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![17, 16, 14, 13, 11, 10, 8, 7, 5, 4]);
        assert!(latest.iter().all(|s| s.expires > t0() + TimeDelta::days(2)));
    }

    #[tokio::test]
    async fn test_latest_fully_expired() {
        let model = SnippetModel::new(memory_pool().await);
        for _ in 0..3 {
            model.insert_at("t", "c", 1, t0()).await.unwrap();
        }
        let latest = model.latest_at(t0() + TimeDelta::days(30)).await.unwrap();
        assert!(latest.is_empty());
    }

    #[tokio::test]
    async fn test_latest_reports_bad_row() {
        let pool = memory_pool().await;
        let model = SnippetModel::new(pool.clone());
        // The older row cannot be decoded; it is read after the good one
        sqlx::query(
            "INSERT INTO snippets (title, content, created, expires) VALUES ('bad', 'c', 'oops', ?)",
        )
        .bind(t0().timestamp_millis() + 1_000_000_000)
        .execute(&pool)
        .await
        .unwrap();
        model.insert_at("good", "c", 7, t0()).await.unwrap();

        let result = model.latest_at(t0()).await;
        assert!(matches!(result, Err(StoreError::Database(_))));
    }

    #[tokio::test]
    async fn test_missing_table_is_store_error() {
        let pool = memory_pool().await;
        let model = SnippetModel::new(pool.clone());
        sqlx::query("DROP TABLE snippets").execute(&pool).await.unwrap();

        assert!(matches!(model.latest().await, Err(StoreError::Database(_))));
        assert!(matches!(model.get(1).await, Err(StoreError::Database(_))));
        assert!(matches!(
            model.insert("t", "c", 7).await,
            Err(StoreError::Database(_))
        ));
    }

    #[tokio::test]
    async fn test_expiry_out_of_range() {
        let model = SnippetModel::new(memory_pool().await);
        let result = model.insert_at("t", "c", u32::MAX, t0()).await;
        assert!(matches!(result, Err(StoreError::ExpiryOutOfRange(_))));
    }
}
