use crate::bot::commands::MentionedUser;
use crate::database::ReputationStore;
use crate::utils::format::{
    format_error_message, format_increment_message, format_rank_table, format_welcome_message,
};
use crate::utils::user_locks::UserLocks;
use std::sync::Arc;

/// Score given to a user the first time someone gives them rep.
pub const INITIAL_SCORE: i64 = 1;

/// Reputation commands over a shared store. Cheap to clone.
#[derive(Clone)]
pub struct ReputationService {
    store: ReputationStore,
    locks: Arc<UserLocks>,
    rank_limit: i64,
}

impl ReputationService {
    pub fn new(store: ReputationStore, rank_limit: i64) -> Self {
        Self {
            store,
            locks: Arc::new(UserLocks::new()),
            rank_limit,
        }
    }

    pub fn store(&self) -> &ReputationStore {
        &self.store
    }

    pub fn ping(&self) -> String {
        "pong".to_string()
    }

    pub async fn rank(&self) -> String {
        match self.store.list_ranked(self.rank_limit).await {
            Ok(entries) => format_rank_table(&entries),
            Err(e) => {
                tracing::error!("Failed to load rankings: {}", e);
                format_error_message("Could not load the rankings")
            }
        }
    }

    /// Gives `target` one point on behalf of `actor_id`.
    pub async fn increment(&self, actor_id: &str, target: &MentionedUser) -> String {
        if actor_id == target.id {
            tracing::info!("Ignoring greedy rep request from {}", actor_id);
            return "You can't update your own rep".to_string();
        }

        let _guard = match tokio::time::timeout(self.store.timeout(), self.locks.lock(&target.id)).await {
            Ok(guard) => guard,
            Err(_) => {
                tracing::error!("Timed out waiting to update rep for {}", target.id);
                return format_error_message(&format!("Could not update rep for {}", target.name));
            }
        };

        let existing = match self.store.get_score(&target.id).await {
            Ok(score) => score,
            Err(e) => {
                tracing::error!("Failed to look up rep for {}: {}", target.id, e);
                return format_error_message(&format!("Could not update rep for {}", target.name));
            }
        };

        if existing.is_none() {
            return match self
                .store
                .upsert_if_absent(&target.id, &target.name, INITIAL_SCORE)
                .await
            {
                Ok(_) => {
                    tracing::info!("created new user: {} ({})", target.name, target.id);
                    format_welcome_message(&target.name, INITIAL_SCORE)
                }
                Err(e) => {
                    tracing::error!("Failed to initialize user {}: {}", target.id, e);
                    format_error_message(&format!("Could not initialize new user {}", target.name))
                }
            };
        }

        match self.store.increment_and_rename(&target.id, &target.name).await {
            Ok(score) => format_increment_message(&target.name, score),
            Err(e) => {
                tracing::error!("Failed to increase rep for {}: {}", target.id, e);
                format_error_message(&format!("Could not update rep for {}", target.name))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::tests::temp_store;
    use std::time::Duration;

    fn user(id: &str, name: &str) -> MentionedUser {
        MentionedUser {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn ping_is_pong() {
        let (_dir, store) = temp_store().await;
        let service = ReputationService::new(store.clone(), 10);

        assert_eq!(service.ping(), "pong");
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn first_increment_welcomes_with_initial_score() {
        let (_dir, store) = temp_store().await;
        let service = ReputationService::new(store.clone(), 10);

        let reply = service.increment("1", &user("2", "bob")).await;

        assert_eq!(reply, "Welcome new user bob! Rep set to 1");
        assert_eq!(store.get_score("2").await.unwrap(), Some(INITIAL_SCORE));
    }

    #[tokio::test]
    async fn existing_user_gains_one_and_is_renamed() {
        let (_dir, store) = temp_store().await;
        store.upsert_if_absent("2", "bob", 4).await.unwrap();
        let service = ReputationService::new(store.clone(), 10);

        let reply = service.increment("1", &user("2", "robert")).await;

        assert_eq!(reply, "Rep increased to 5 for robert");
        let records = store.list_all().await.unwrap();
        assert_eq!(records[0].display_name, "robert");
        assert_eq!(records[0].score, 5);
    }

    #[tokio::test]
    async fn self_increment_never_touches_the_store() {
        let (_dir, store) = temp_store().await;
        store.upsert_if_absent("2", "bob", 4).await.unwrap();
        let service = ReputationService::new(store.clone(), 10);

        let reply = service.increment("2", &user("2", "bob")).await;

        assert_eq!(reply, "You can't update your own rep");
        assert_eq!(store.get_score("2").await.unwrap(), Some(4));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_are_not_lost() {
        let (_dir, store) = temp_store().await;
        store.upsert_if_absent("2", "bob", 3).await.unwrap();
        let service = ReputationService::new(store.clone(), 10);

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service.increment(&format!("actor{}", i), &user("2", "bob")).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.get_score("2").await.unwrap(), Some(23));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_increments_create_once() {
        let (_dir, store) = temp_store().await;
        let service = ReputationService::new(store.clone(), 10);

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service.increment(&format!("actor{}", i), &user("2", "bob")).await
                })
            })
            .collect();
        let mut welcomes = 0;
        for handle in handles {
            if handle.await.unwrap().starts_with("Welcome") {
                welcomes += 1;
            }
        }

        assert_eq!(welcomes, 1);
        assert_eq!(store.get_score("2").await.unwrap(), Some(INITIAL_SCORE + 9));
    }

    #[tokio::test]
    async fn waiting_for_a_busy_user_gives_up() {
        let (_dir, store) = temp_store().await;
        store.upsert_if_absent("2", "bob", 4).await.unwrap();
        let store = ReputationStore::new(store.pool().clone(), Duration::from_millis(100));
        let service = ReputationService::new(store.clone(), 10);

        let _held = service.locks.lock("2").await;
        let reply = service.increment("1", &user("2", "bob")).await;

        assert_eq!(reply, "❌ **Error**: Could not update rep for bob");
        assert_eq!(store.get_score("2").await.unwrap(), Some(4));
    }

    #[tokio::test]
    async fn rank_is_sorted_and_limited() {
        let (_dir, store) = temp_store().await;
        store.upsert_if_absent("1", "carol", 2).await.unwrap();
        store.upsert_if_absent("2", "bob", 9).await.unwrap();
        store.upsert_if_absent("3", "alice", 2).await.unwrap();
        let service = ReputationService::new(store, 2);

        let table = service.rank().await;

        assert!(table.contains("│   9 │ bob   │"));
        assert!(table.contains("│   2 │ alice │"));
        assert!(!table.contains("carol"));
        assert!(table.find("bob").unwrap() < table.find("alice").unwrap());
    }

    #[tokio::test]
    async fn rank_of_empty_store_is_an_empty_table() {
        let (_dir, store) = temp_store().await;
        let service = ReputationService::new(store, 10);

        assert_eq!(service.rank().await, format_rank_table(&[]));
    }

    #[tokio::test]
    async fn store_failures_become_replies() {
        let (_dir, store) = temp_store().await;
        let service = ReputationService::new(store.clone(), 10);
        store.pool().close().await;

        assert_eq!(
            service.increment("1", &user("2", "bob")).await,
            "❌ **Error**: Could not update rep for bob"
        );
        assert_eq!(service.rank().await, "❌ **Error**: Could not load the rankings");
    }
}
