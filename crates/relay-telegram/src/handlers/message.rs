use teloxide::types::{Message, User};

use relay_core::{
    domain::{ChatId, MessageId, MessageRef, TopicId, UserId, UserProfile},
    messaging::types::{ChatKind, GroupReply, IncomingUpdate, Media, Payload, PrivateMessage},
};

/// Private messages go to the router; group messages are candidate support replies.
pub(super) fn classify(msg: &Message) -> Option<IncomingUpdate> {
    let from = msg.from()?;
    let payload = payload(msg)?;

    match chat_kind(msg) {
        ChatKind::Private => Some(IncomingUpdate::Private(PrivateMessage {
            message: message_ref(msg),
            from: profile(from),
            payload,
        })),
        ChatKind::Group => Some(IncomingUpdate::GroupReply(GroupReply {
            message: message_ref(msg),
            topic: msg.thread_id.map(TopicId),
            from: user_id(from),
            payload,
            reply_to_author: msg
                .reply_to_message()
                .and_then(|r| r.from())
                .map(user_id),
        })),
        ChatKind::Channel => None,
    }
}

/// Text, the largest photo size, or a document. Anything else is unsupported.
fn payload(msg: &Message) -> Option<Payload> {
    if let Some(text) = msg.text() {
        return Some(Payload::Text(text.to_string()));
    }
    let caption = msg.caption().map(str::to_string);
    if let Some(sizes) = msg.photo() {
        let largest = sizes.last()?;
        return Some(Payload::Photo(Media::new(largest.file.id.clone(), caption)));
    }
    if let Some(doc) = msg.document() {
        return Some(Payload::Document(Media::new(doc.file.id.clone(), caption)));
    }
    None
}

pub(super) fn chat_kind(msg: &Message) -> ChatKind {
    if msg.chat.is_private() {
        ChatKind::Private
    } else if msg.chat.is_group() || msg.chat.is_supergroup() {
        ChatKind::Group
    } else {
        ChatKind::Channel
    }
}

pub(super) fn message_ref(msg: &Message) -> MessageRef {
    MessageRef {
        chat_id: ChatId(msg.chat.id.0),
        message_id: MessageId(msg.id.0),
    }
}

pub(super) fn profile(user: &User) -> UserProfile {
    UserProfile {
        id: user_id(user),
        first_name: user.first_name.clone(),
        username: user.username.clone(),
    }
}

fn user_id(user: &User) -> UserId {
    UserId(user.id.0 as i64)
}
