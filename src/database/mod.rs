pub mod migrations;
pub mod models;
pub mod queries;

use crate::error::StoreError;
use anyhow::{Context, Result};
use models::{RankEntry, ReputationRecord};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

pub async fn create_connection(database_url: &str, timeout: Duration) -> Result<SqlitePool> {
    let connect_options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("invalid database url '{}'", database_url))?
        .create_if_missing(true)
        .busy_timeout(timeout);

    let pool = SqlitePoolOptions::new()
        .acquire_timeout(timeout)
        .connect_with(connect_options)
        .await
        .with_context(|| format!("failed to open database '{}'", database_url))?;

    migrations::ensure_schema(&pool)
        .await
        .context("failed to verify the reputation schema")?;

    Ok(pool)
}

/// Shared handle to the reputation table. Every call is bounded by `timeout`.
#[derive(Clone)]
pub struct ReputationStore {
    pool: SqlitePool,
    timeout: Duration,
}

impl ReputationStore {
    pub fn new(pool: SqlitePool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn get_score(&self, user_id: &str) -> Result<Option<i64>, StoreError> {
        self.bounded(queries::get_score(&self.pool, user_id)).await
    }

    pub async fn upsert_if_absent(
        &self,
        user_id: &str,
        display_name: &str,
        initial_score: i64,
    ) -> Result<bool, StoreError> {
        self.bounded(queries::upsert_if_absent(&self.pool, user_id, display_name, initial_score))
            .await
    }

    pub async fn increment_and_rename(&self, user_id: &str, display_name: &str) -> Result<i64, StoreError> {
        self.bounded(queries::increment_and_rename(&self.pool, user_id, display_name))
            .await
    }

    pub async fn list_ranked(&self, limit: i64) -> Result<Vec<RankEntry>, StoreError> {
        self.bounded(queries::list_ranked(&self.pool, limit)).await
    }

    pub async fn list_all(&self) -> Result<Vec<ReputationRecord>, StoreError> {
        self.bounded(queries::list_all(&self.pool)).await
    }

    pub async fn rename(&self, user_id: &str, display_name: &str) -> Result<(), StoreError> {
        self.bounded(queries::rename(&self.pool, user_id, display_name)).await
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    /// File-backed pool so every pooled connection sees the same database.
    pub async fn temp_pool() -> (TempDir, SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        let options = SqliteConnectOptions::new()
            .filename(dir.path().join("rep.db"))
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await.unwrap();
        (dir, pool)
    }

    pub async fn schema_pool() -> (TempDir, SqlitePool) {
        let (dir, pool) = temp_pool().await;
        migrations::ensure_schema(&pool).await.unwrap();
        (dir, pool)
    }

    pub async fn temp_store() -> (TempDir, ReputationStore) {
        let (dir, pool) = schema_pool().await;
        (dir, ReputationStore::new(pool, Duration::from_secs(5)))
    }

    #[tokio::test]
    async fn create_connection_creates_file_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("fresh.db").display());

        let pool = create_connection(&url, Duration::from_secs(5)).await.unwrap();

        assert!(dir.path().join("fresh.db").exists());
        assert_eq!(queries::list_all(&pool).await.unwrap(), vec![]);
    }

    #[tokio::test]
    async fn bounded_call_that_never_finishes_times_out() {
        let (_dir, store) = temp_store().await;
        let store = ReputationStore::new(store.pool().clone(), Duration::from_millis(50));

        let err = store
            .bounded(std::future::pending::<Result<(), StoreError>>())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Timeout(t) if t == Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn locked_database_fails_fast() {
        let (_dir, store) = temp_store().await;
        store.upsert_if_absent("1", "alice", 1).await.unwrap();

        let mut holder = store.pool().acquire().await.unwrap();
        sqlx::query("BEGIN EXCLUSIVE").execute(&mut *holder).await.unwrap();

        let store = ReputationStore::new(store.pool().clone(), Duration::from_millis(300));
        let started = std::time::Instant::now();
        let err = store.increment_and_rename("1", "alice").await.unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(matches!(err, StoreError::Timeout(_) | StoreError::Database(_)));

        sqlx::query("ROLLBACK").execute(&mut *holder).await.unwrap();
    }

    #[tokio::test]
    async fn closed_pool_surfaces_store_error() {
        let (_dir, store) = temp_store().await;
        store.pool().close().await;

        let err = store.get_score("1").await.unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
    }
}
