use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("a bot token is required (set `token` in botconfig.toml or DISCORD_TOKEN)")]
    MissingToken,
    #[error("a database path is required (set `db` in botconfig.toml or DATABASE_URL)")]
    MissingDatabase,
}

/// Failure of a single store operation. Recoverable: the command that hit it
/// reports the failure to the channel and the bot keeps running.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
    #[error("no reputation record for user {0}")]
    NotFound(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("database setup failed: table '{0}' could not be created")]
    TableMissing(&'static str),
}
