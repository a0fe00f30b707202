//! In-crate fakes shared by unit tests.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageId, MessageRef, TopicId, UserId},
    errors::Error,
    messaging::{
        port::MessagingGateway,
        types::{InlineKeyboard, MediaKind},
    },
    store::MappingStore,
    Result,
};

pub const BOT_ID: UserId = UserId(999_000);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sent {
    Text {
        chat_id: ChatId,
        thread: Option<TopicId>,
        text: String,
    },
    Reply {
        to: MessageRef,
        thread: Option<TopicId>,
        text: String,
    },
    Media {
        chat_id: ChatId,
        thread: Option<TopicId>,
        kind: MediaKind,
        file_id: String,
        caption: Option<String>,
        keyboard: Option<InlineKeyboard>,
    },
    Keyboard {
        chat_id: ChatId,
        text: String,
        keyboard: InlineKeyboard,
    },
    Edit {
        msg: MessageRef,
        text: String,
    },
    CallbackAnswer {
        callback_id: String,
    },
}

impl Sent {
    pub fn chat_id(&self) -> Option<ChatId> {
        match self {
            Sent::Text { chat_id, .. }
            | Sent::Media { chat_id, .. }
            | Sent::Keyboard { chat_id, .. } => Some(*chat_id),
            Sent::Reply { to, .. } => Some(to.chat_id),
            Sent::Edit { msg, .. } => Some(msg.chat_id),
            Sent::CallbackAnswer { .. } => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Sent::Text { text, .. }
            | Sent::Reply { text, .. }
            | Sent::Keyboard { text, .. }
            | Sent::Edit { text, .. } => Some(text),
            Sent::Media { caption, .. } => caption.as_deref(),
            Sent::CallbackAnswer { .. } => None,
        }
    }
}

/// Recording gateway with switchable failures.
pub struct FakeGateway {
    next_message_id: Mutex<i32>,
    next_topic_id: Mutex<i32>,
    sent: Mutex<Vec<Sent>>,
    created: Mutex<Vec<(ChatId, String)>>,
    closed: Mutex<Vec<(ChatId, TopicId)>>,
    admins: Mutex<HashMap<ChatId, Vec<UserId>>>,
    failing_chats: Mutex<HashSet<ChatId>>,
    pub fail_create: AtomicBool,
    pub fail_close: AtomicBool,
    pub fail_admins: AtomicBool,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self {
            next_message_id: Mutex::new(1),
            next_topic_id: Mutex::new(100),
            sent: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
            closed: Mutex::new(Vec::new()),
            admins: Mutex::new(HashMap::new()),
            failing_chats: Mutex::new(HashSet::new()),
            fail_create: AtomicBool::new(false),
            fail_close: AtomicBool::new(false),
            fail_admins: AtomicBool::new(false),
        }
    }
}

impl FakeGateway {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, chat_id: ChatId) -> Vec<Sent> {
        self.sent()
            .into_iter()
            .filter(|s| s.chat_id() == Some(chat_id))
            .collect()
    }

    pub fn created(&self) -> Vec<(ChatId, String)> {
        self.created.lock().unwrap().clone()
    }

    pub fn closed(&self) -> Vec<(ChatId, TopicId)> {
        self.closed.lock().unwrap().clone()
    }

    pub fn set_admins(&self, chat_id: ChatId, admins: Vec<UserId>) {
        self.admins.lock().unwrap().insert(chat_id, admins);
    }

    /// Every send into `chat_id` fails from now on.
    pub fn fail_sends_to(&self, chat_id: ChatId) {
        self.failing_chats.lock().unwrap().insert(chat_id);
    }

    pub fn set_fail_create(&self, on: bool) {
        self.fail_create.store(on, Ordering::SeqCst);
    }

    fn alloc(&self, chat_id: ChatId) -> MessageRef {
        let mut guard = self.next_message_id.lock().unwrap();
        let id = *guard;
        *guard += 1;
        MessageRef {
            chat_id,
            message_id: MessageId(id),
        }
    }

    fn record(&self, chat_id: ChatId, sent: Sent) -> Result<MessageRef> {
        if self.failing_chats.lock().unwrap().contains(&chat_id) {
            return Err(Error::Transport(
                "Forbidden: bot was blocked by the user".to_string(),
            ));
        }
        self.sent.lock().unwrap().push(sent);
        Ok(self.alloc(chat_id))
    }
}

#[async_trait]
impl MessagingGateway for FakeGateway {
    async fn send_text(
        &self,
        chat_id: ChatId,
        thread: Option<TopicId>,
        text: &str,
    ) -> Result<MessageRef> {
        self.record(
            chat_id,
            Sent::Text {
                chat_id,
                thread,
                text: text.to_string(),
            },
        )
    }

    async fn reply_text(
        &self,
        to: MessageRef,
        thread: Option<TopicId>,
        text: &str,
    ) -> Result<MessageRef> {
        self.record(
            to.chat_id,
            Sent::Reply {
                to,
                thread,
                text: text.to_string(),
            },
        )
    }

    async fn send_media(
        &self,
        chat_id: ChatId,
        thread: Option<TopicId>,
        kind: MediaKind,
        file_id: &str,
        caption: Option<&str>,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageRef> {
        self.record(
            chat_id,
            Sent::Media {
                chat_id,
                thread,
                kind,
                file_id: file_id.to_string(),
                caption: caption.map(str::to_string),
                keyboard,
            },
        )
    }

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef> {
        self.record(
            chat_id,
            Sent::Keyboard {
                chat_id,
                text: text.to_string(),
                keyboard,
            },
        )
    }

    async fn edit_text(&self, msg: MessageRef, text: &str) -> Result<()> {
        self.record(
            msg.chat_id,
            Sent::Edit {
                msg,
                text: text.to_string(),
            },
        )
        .map(|_| ())
    }

    async fn answer_callback_query(&self, callback_id: &str) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::CallbackAnswer {
            callback_id: callback_id.to_string(),
        });
        Ok(())
    }

    async fn create_topic(&self, chat_id: ChatId, name: &str) -> Result<TopicId> {
        // Give concurrent callers a chance to interleave, like a real network call.
        tokio::task::yield_now().await;
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(Error::Transport(
                "Bad Request: not enough rights to create a topic".to_string(),
            ));
        }
        self.created
            .lock()
            .unwrap()
            .push((chat_id, name.to_string()));
        let mut guard = self.next_topic_id.lock().unwrap();
        let id = *guard;
        *guard += 1;
        Ok(TopicId(id))
    }

    async fn close_topic(&self, chat_id: ChatId, topic: TopicId) -> Result<()> {
        if self.fail_close.load(Ordering::SeqCst) {
            return Err(Error::Transport("Bad Request: TOPIC_ID_INVALID".to_string()));
        }
        self.closed.lock().unwrap().push((chat_id, topic));
        Ok(())
    }

    async fn administrators(&self, chat_id: ChatId) -> Result<Vec<UserId>> {
        if self.fail_admins.load(Ordering::SeqCst) {
            return Err(Error::Transport("Bad Request: chat not found".to_string()));
        }
        Ok(self
            .admins
            .lock()
            .unwrap()
            .get(&chat_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn self_identity(&self) -> Result<UserId> {
        Ok(BOT_ID)
    }
}

/// In-memory store with switchable failures.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, i64>>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    fn check_read(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Storage("disk unavailable".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Storage("disk full".to_string()));
        }
        *self.writes.lock().unwrap() += 1;
        Ok(())
    }
}

#[async_trait]
impl MappingStore for MemoryStore {
    async fn topic_for_user(&self, user_id: UserId) -> Result<Option<TopicId>> {
        self.check_read()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&crate::store::user_key(user_id))
            .map(|v| TopicId(*v as i32)))
    }

    async fn user_for_topic(&self, topic: TopicId) -> Result<Option<UserId>> {
        self.check_read()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&crate::store::topic_key(topic))
            .map(|v| UserId(*v)))
    }

    async fn bind(&self, user_id: UserId, topic: TopicId) -> Result<()> {
        self.check_write()?;
        let mut records = self.records.lock().unwrap();
        records.insert(crate::store::user_key(user_id), i64::from(topic.0));
        records.insert(crate::store::topic_key(topic), user_id.0);
        Ok(())
    }

    async fn unbind(&self, user_id: UserId) -> Result<Option<TopicId>> {
        self.check_write()?;
        let mut records = self.records.lock().unwrap();
        let Some(raw) = records.remove(&crate::store::user_key(user_id)) else {
            return Ok(None);
        };
        let topic = TopicId(raw as i32);
        let tkey = crate::store::topic_key(topic);
        if records.get(&tkey) == Some(&user_id.0) {
            records.remove(&tkey);
        }
        Ok(Some(topic))
    }

    async fn destination(&self) -> Result<Option<ChatId>> {
        self.check_read()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(crate::store::DESTINATION_KEY)
            .map(|v| ChatId(*v)))
    }

    async fn set_destination(&self, chat_id: ChatId) -> Result<()> {
        self.check_write()?;
        self.records
            .lock()
            .unwrap()
            .insert(crate::store::DESTINATION_KEY.to_string(), chat_id.0);
        Ok(())
    }
}
