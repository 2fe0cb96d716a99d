use crate::database::models::{RankEntry, ReputationRecord};
use crate::error::StoreError;
use sqlx::{Row, SqlitePool};

// Reputation queries
pub async fn get_score(pool: &SqlitePool, user_id: &str) -> Result<Option<i64>, StoreError> {
    let row = sqlx::query("SELECT rep FROM reputation WHERE username = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(row.try_get::<Option<i64>, _>("rep")?.unwrap_or(0))),
        None => Ok(None),
    }
}

/// Inserts a record unless one already exists for `user_id`.
/// Returns `true` when a row was created.
pub async fn upsert_if_absent(
    pool: &SqlitePool,
    user_id: &str,
    display_name: &str,
    initial_score: i64,
) -> Result<bool, StoreError> {
    let result = sqlx::query("INSERT OR IGNORE INTO reputation (username, user, rep) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(display_name)
        .bind(initial_score)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Adds one to the score and records the current display name, returning the
/// new score. Both happen in one statement.
pub async fn increment_and_rename(
    pool: &SqlitePool,
    user_id: &str,
    display_name: &str,
) -> Result<i64, StoreError> {
    let score: Option<i64> = sqlx::query_scalar(
        "UPDATE reputation SET rep = COALESCE(rep, 0) + 1, user = ? WHERE username = ? RETURNING rep",
    )
    .bind(display_name)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    score.ok_or_else(|| StoreError::NotFound(user_id.to_string()))
}

pub async fn list_ranked(pool: &SqlitePool, limit: i64) -> Result<Vec<RankEntry>, StoreError> {
    let entries = sqlx::query_as::<_, RankEntry>(
        "SELECT COALESCE(user, '') AS user, COALESCE(rep, 0) AS rep
         FROM reputation
         ORDER BY rep DESC, user ASC
         LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

pub async fn list_all(pool: &SqlitePool) -> Result<Vec<ReputationRecord>, StoreError> {
    let records = sqlx::query_as::<_, ReputationRecord>(
        "SELECT username, COALESCE(user, '') AS user, COALESCE(rep, 0) AS rep
         FROM reputation
         ORDER BY username ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(records)
}

pub async fn rename(pool: &SqlitePool, user_id: &str, display_name: &str) -> Result<(), StoreError> {
    let result = sqlx::query("UPDATE reputation SET user = ? WHERE username = ?")
        .bind(display_name)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound(user_id.to_string()));
    }

    Ok(())
}
