pub mod format;
pub mod reconcile;
pub mod reputation;
pub mod user_locks;
