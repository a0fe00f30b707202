use crate::domain::{ChatId, MessageRef, TopicId, UserId, UserProfile};

/// Cross-messenger incoming update model.
///
/// Telegram-specific fields live in the Telegram adapter; by the time an update reaches
/// the core it is one of these variants.
#[derive(Clone, Debug)]
pub enum IncomingUpdate {
    Command(Command),
    Private(PrivateMessage),
    GroupReply(GroupReply),
    Button(ButtonPress),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Group,
    Channel,
}

impl ChatKind {
    pub fn is_group(self) -> bool {
        matches!(self, ChatKind::Group)
    }
}

#[derive(Clone, Debug)]
pub struct Command {
    pub message: MessageRef,
    pub chat_kind: ChatKind,
    pub chat_title: Option<String>,
    pub thread: Option<TopicId>,
    pub from: UserProfile,
    pub name: String,
}

impl Command {
    pub fn chat_id(&self) -> ChatId {
        self.message.chat_id
    }
}

/// A non-command message from an end-user in their private chat with the bot.
#[derive(Clone, Debug)]
pub struct PrivateMessage {
    pub message: MessageRef,
    pub from: UserProfile,
    pub payload: Payload,
}

/// A reply written inside a group (normally inside a topic of the destination).
#[derive(Clone, Debug)]
pub struct GroupReply {
    pub message: MessageRef,
    pub topic: Option<TopicId>,
    pub from: UserId,
    pub payload: Payload,
    /// Author of the message being replied to, if Telegram reported one.
    pub reply_to_author: Option<UserId>,
}

#[derive(Clone, Debug)]
pub struct ButtonPress {
    pub callback_id: String,
    pub from: UserId,
    pub message: Option<MessageRef>,
    pub data: String,
}

/// What a message carries. Exactly one kind per message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Photo(Media),
    Document(Media),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Document,
}

/// A transport-side file reference plus the caption the sender attached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Media {
    pub file_id: String,
    pub caption: Option<String>,
}

impl Media {
    pub fn new(file_id: impl Into<String>, caption: Option<String>) -> Self {
        Self {
            file_id: file_id.into(),
            caption: caption.filter(|c| !c.trim().is_empty()),
        }
    }
}

impl Payload {
    pub fn media(&self) -> Option<(MediaKind, &Media)> {
        match self {
            Payload::Text(_) => None,
            Payload::Photo(m) => Some((MediaKind::Photo, m)),
            Payload::Document(m) => Some((MediaKind::Document, m)),
        }
    }
}

/// Inline keyboard (buttons) attached to an outgoing message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub buttons: Vec<InlineButton>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineKeyboard {
    pub fn single(label: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            buttons: vec![InlineButton {
                label: label.into(),
                callback_data: callback_data.into(),
            }],
        }
    }
}
