use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Keyed async locks: holders of the same user id run one at a time,
/// different ids never wait on each other.
#[derive(Default)]
pub struct UserLocks {
    entries: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

pub struct UserGuard<'a> {
    locks: &'a UserLocks,
    user_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, user_id: &str) -> UserGuard<'_> {
        let entry = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.entry(user_id.to_string()).or_default().clone()
        };

        UserGuard {
            locks: self,
            user_id: user_id.to_string(),
            guard: Some(entry.lock_owned().await),
        }
    }

    fn release(&self, user_id: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        // Only the map still points at it: nobody holds or waits for the lock.
        if entries.get(user_id).is_some_and(|entry| Arc::strong_count(entry) == 1) {
            entries.remove(user_id);
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Drop for UserGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks.release(&self.user_id);
    }
}
