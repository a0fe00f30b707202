use std::{
    collections::HashMap,
    sync::{Arc, Mutex as SyncMutex, MutexGuard as SyncMutexGuard},
};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::UserId;

type LockMap = HashMap<UserId, Arc<Mutex<()>>>;

/// Per-user async mutexes.
///
/// Held across "lookup topic → create topic → bind" so two concurrent first messages from
/// the same user cannot open two topics. Different users never contend. An entry lives only
/// while someone holds or waits for it.
#[derive(Default)]
pub struct UserLocks {
    // Plain mutex: it is never held across an await, and `UserGuard::drop` needs it.
    inner: SyncMutex<LockMap>,
}

impl UserLocks {
    pub async fn lock_user(&self, user_id: UserId) -> UserGuard<'_> {
        let lock = self
            .map()
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        UserGuard {
            locks: self,
            user_id,
            guard: Some(lock.lock_owned().await),
        }
    }

    fn map(&self) -> SyncMutexGuard<'_, LockMap> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Holds one user's lock; forgets the user once nobody else is waiting.
pub struct UserGuard<'a> {
    locks: &'a UserLocks,
    user_id: UserId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for UserGuard<'_> {
    fn drop(&mut self) {
        // Release first so the map holds the only reference when no one is queued.
        drop(self.guard.take());
        let mut map = self.locks.map();
        if map
            .get(&self.user_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            map.remove(&self.user_id);
        }
    }
}
