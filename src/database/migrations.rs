use crate::database::models::REPUTATION_TABLE;
use crate::error::SchemaError;
use sqlx::SqlitePool;
use tracing::info;

/// Creates the reputation table if it is absent and verifies it afterwards.
/// Creation is attempted at most once.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), SchemaError> {
    if table_exists(pool, REPUTATION_TABLE).await? {
        return Ok(());
    }

    info!("No table '{}' found, creating...", REPUTATION_TABLE);
    create_reputation_table(pool).await?;

    if !table_exists(pool, REPUTATION_TABLE).await? {
        return Err(SchemaError::TableMissing(REPUTATION_TABLE));
    }

    info!("Database schema ready");
    Ok(())
}

async fn table_exists(pool: &SqlitePool, name: &str) -> Result<bool, SchemaError> {
    let found: Option<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(name)
            .fetch_optional(pool)
            .await?;

    Ok(found.is_some())
}

async fn create_reputation_table(pool: &SqlitePool) -> Result<(), SchemaError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reputation (
            username TEXT PRIMARY KEY,
            rep INTEGER DEFAULT 0,
            user VARCHAR
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
