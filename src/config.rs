use crate::error::ConfigError;
use anyhow::Result;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE_NAME: &str = "botconfig.toml";
const CONFIG_PATH_ENV: &str = "REPBOT_CONFIG";

pub const DEFAULT_PREFIX: &str = "!rep";
pub const DEFAULT_RANK_LIMIT: i64 = 10;
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub database_url: String,
    pub command_prefix: String,
    pub rank_limit: i64,
    pub store_timeout: Duration,
    pub reconcile_names: bool,
}

/// On-disk shape of `botconfig.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub token: Option<String>,
    pub db: Option<String>,
    pub prefix: Option<String>,
    pub rank_limit: Option<i64>,
    pub store_timeout_secs: Option<u64>,
    pub reconcile_names: Option<bool>,
}

/// Values taken from the process environment that win over the file.
#[derive(Debug, Default)]
pub struct EnvOverrides {
    pub discord_token: Option<String>,
    pub database_url: Option<String>,
}

impl Config {
    /// Loads configuration from `.env`, the first config file found and the
    /// environment, in that order of increasing precedence.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let explicit = env::args_os()
            .nth(1)
            .map(PathBuf::from)
            .or_else(|| env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let file = match locate_config_file(explicit, &default_search_paths())? {
            Some(path) => {
                tracing::info!("Reading config from {}", path.display());
                read_config_file(&path)?
            }
            None => {
                tracing::info!("No {} found, using environment only", CONFIG_FILE_NAME);
                ConfigFile::default()
            }
        };

        let overrides = EnvOverrides {
            discord_token: env::var("DISCORD_TOKEN").ok(),
            database_url: env::var("DATABASE_URL").ok(),
        };

        Ok(Config::from_parts(file, overrides)?)
    }

    pub fn from_parts(file: ConfigFile, overrides: EnvOverrides) -> Result<Self, ConfigError> {
        let discord_token = overrides
            .discord_token
            .or(file.token)
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let database = overrides
            .database_url
            .or(file.db)
            .map(|db| db.trim().to_string())
            .filter(|db| !db.is_empty())
            .ok_or(ConfigError::MissingDatabase)?;

        let command_prefix = file
            .prefix
            .map(|prefix| prefix.trim().to_string())
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        Ok(Config {
            discord_token,
            database_url: normalize_database_url(&database),
            command_prefix,
            rank_limit: file.rank_limit.filter(|n| *n > 0).unwrap_or(DEFAULT_RANK_LIMIT),
            store_timeout: Duration::from_secs(
                file.store_timeout_secs
                    .filter(|secs| *secs > 0)
                    .unwrap_or(DEFAULT_STORE_TIMEOUT_SECS),
            ),
            reconcile_names: file.reconcile_names.unwrap_or(true),
        })
    }
}

/// `./botconfig.toml`, `<config dir>/repbot/botconfig.toml`, `./config/botconfig.toml`.
pub fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("repbot").join(CONFIG_FILE_NAME));
    }
    paths.push(Path::new("config").join(CONFIG_FILE_NAME));
    paths
}

/// An explicit path must exist; otherwise the first existing search path is used.
pub fn locate_config_file(
    explicit: Option<PathBuf>,
    search_paths: &[PathBuf],
) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(Some(path));
        }
        return Err(ConfigError::NotFound(path));
    }

    Ok(search_paths.iter().find(|path| path.is_file()).cloned())
}

pub fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn normalize_database_url(db: &str) -> String {
    if db.starts_with("sqlite:") {
        db.to_string()
    } else {
        format!("sqlite:{}", db)
    }
}
