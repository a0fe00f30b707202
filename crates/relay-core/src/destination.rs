use std::sync::atomic::{AtomicI64, Ordering};

use crate::{domain::ChatId, store::MappingStore, Result};

// Telegram never issues chat id 0, so it doubles as "unset".
const UNSET: i64 = 0;

/// In-memory cache of the bound destination group.
///
/// Read-through: the first successful store read is kept for the life of the process.
/// Only `set` (admin bootstrap) writes it afterwards; external edits to the store are not
/// observed until restart.
#[derive(Debug, Default)]
pub struct DestinationCache {
    cached: AtomicI64,
}

impl DestinationCache {
    pub fn new(initial: Option<ChatId>) -> Self {
        Self {
            cached: AtomicI64::new(initial.map_or(UNSET, |c| c.0)),
        }
    }

    pub fn get(&self) -> Option<ChatId> {
        match self.cached.load(Ordering::Acquire) {
            UNSET => None,
            id => Some(ChatId(id)),
        }
    }

    pub fn set(&self, chat_id: ChatId) {
        self.cached.store(chat_id.0, Ordering::Release);
    }

    /// Cached value, or load it from the store and cache it if present.
    pub async fn resolve(&self, store: &dyn MappingStore) -> Result<Option<ChatId>> {
        if let Some(id) = self.get() {
            return Ok(Some(id));
        }
        let loaded = store.destination().await?;
        if let Some(id) = loaded {
            // Lose a race with `set` rather than clobber a fresher binding.
            let _ = self
                .cached
                .compare_exchange(UNSET, id.0, Ordering::AcqRel, Ordering::Acquire);
        }
        Ok(self.get())
    }
}
