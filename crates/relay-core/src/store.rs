//! Persistent user ↔ topic mapping plus the bound destination group.
//!
//! Logical layout is a flat key-value table:
//! - `user_<user_id>`  -> topic id
//! - `topic_<topic_id>` -> user id
//! - `admin_group_id`  -> destination chat id
//!
//! The store performs no liveness checks. A topic closed directly in the group keeps its
//! mapping until the user cancels.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{ChatId, TopicId, UserId},
    errors::Error,
    Result,
};

pub const DESTINATION_KEY: &str = "admin_group_id";

pub fn user_key(user_id: UserId) -> String {
    format!("user_{}", user_id.0)
}

pub fn topic_key(topic: TopicId) -> String {
    format!("topic_{}", topic.0)
}

#[async_trait]
pub trait MappingStore: Send + Sync {
    async fn topic_for_user(&self, user_id: UserId) -> Result<Option<TopicId>>;

    async fn user_for_topic(&self, topic: TopicId) -> Result<Option<UserId>>;

    /// Write both directions together. A previous topic of the same user keeps its
    /// reverse entry.
    async fn bind(&self, user_id: UserId, topic: TopicId) -> Result<()>;

    /// Remove both directions for the user's current topic. Returns the removed topic.
    async fn unbind(&self, user_id: UserId) -> Result<Option<TopicId>>;

    async fn destination(&self) -> Result<Option<ChatId>>;

    async fn set_destination(&self, chat_id: ChatId) -> Result<()>;
}

/// JSON-file backed store.
///
/// All records live in memory behind one async mutex; every mutation rewrites the file
/// through a temp file + rename, so a reader of the file never sees half a `bind`.
pub struct JsonFileStore {
    path: PathBuf,
    records: Mutex<BTreeMap<String, i64>>,
}

impl JsonFileStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = load_records(&path).await?;
        tracing::debug!(path = %path.display(), records = records.len(), "mapping store opened");
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    async fn read(&self, key: &str) -> Option<i64> {
        self.records.lock().await.get(key).copied()
    }

    /// Apply `edit` to a copy of the records, persist it, then publish it in memory.
    async fn update<T>(&self, edit: impl FnOnce(&mut BTreeMap<String, i64>) -> T) -> Result<T> {
        let mut guard = self.records.lock().await;
        let mut next = guard.clone();
        let out = edit(&mut next);
        if next != *guard {
            save_records(&self.path, &next).await?;
            *guard = next;
        }
        Ok(out)
    }
}

#[async_trait]
impl MappingStore for JsonFileStore {
    async fn topic_for_user(&self, user_id: UserId) -> Result<Option<TopicId>> {
        self.read(&user_key(user_id))
            .await
            .map(|raw| topic_from_raw(&user_key(user_id), raw))
            .transpose()
    }

    async fn user_for_topic(&self, topic: TopicId) -> Result<Option<UserId>> {
        Ok(self.read(&topic_key(topic)).await.map(UserId))
    }

    async fn bind(&self, user_id: UserId, topic: TopicId) -> Result<()> {
        self.update(|records| {
            records.insert(user_key(user_id), i64::from(topic.0));
            records.insert(topic_key(topic), user_id.0);
        })
        .await
    }

    async fn unbind(&self, user_id: UserId) -> Result<Option<TopicId>> {
        let ukey = user_key(user_id);
        let raw = self
            .update(|records| {
                let raw = records.remove(&ukey)?;
                let tkey = format!("topic_{raw}");
                // Only drop the reverse entry if it still points back at this user.
                if records.get(&tkey) == Some(&user_id.0) {
                    records.remove(&tkey);
                }
                Some(raw)
            })
            .await?;
        raw.map(|r| topic_from_raw(&ukey, r)).transpose()
    }

    async fn destination(&self) -> Result<Option<ChatId>> {
        Ok(self.read(DESTINATION_KEY).await.map(ChatId))
    }

    async fn set_destination(&self, chat_id: ChatId) -> Result<()> {
        self.update(|records| {
            records.insert(DESTINATION_KEY.to_string(), chat_id.0);
        })
        .await
    }
}

fn topic_from_raw(key: &str, raw: i64) -> Result<TopicId> {
    i32::try_from(raw)
        .map(TopicId)
        .map_err(|_| Error::Storage(format!("record {key} holds invalid topic id {raw}")))
}

async fn load_records(path: &Path) -> Result<BTreeMap<String, i64>> {
    let txt = match tokio::fs::read_to_string(path).await {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => {
            return Err(Error::Storage(format!(
                "failed to read {}: {e}",
                path.display()
            )))
        }
    };
    if txt.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(&txt)
        .map_err(|e| Error::Storage(format!("failed to parse {}: {e}", path.display())))
}

async fn save_records(path: &Path, records: &BTreeMap<String, i64>) -> Result<()> {
    let txt = serde_json::to_string_pretty(records)?;
    let tmp = path.with_extension("json.tmp");
    let io = |e: std::io::Error| Error::Storage(format!("failed to write {}: {e}", path.display()));

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io)?;
    }
    tokio::fs::write(&tmp, txt).await.map_err(io)?;
    tokio::fs::rename(&tmp, path).await.map_err(io)?;
    Ok(())
}
