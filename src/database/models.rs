use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const REPUTATION_TABLE: &str = "reputation";

/// One row of the `reputation` table. `username` holds the platform user id
/// and `user` the last observed display name.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ReputationRecord {
    #[sqlx(rename = "username")]
    pub user_id: String,
    #[sqlx(rename = "user")]
    pub display_name: String,
    #[sqlx(rename = "rep")]
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct RankEntry {
    #[sqlx(rename = "user")]
    pub display_name: String,
    #[sqlx(rename = "rep")]
    pub score: i64,
}
