use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef, TopicId, UserId},
    messaging::types::{InlineKeyboard, MediaKind},
    Result,
};

/// Messaging gateway port.
///
/// Every call is a single attempt: failures come back as `Error::Transport` and the
/// caller decides what to tell the user. Implementations must not retry.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn send_text(
        &self,
        chat_id: ChatId,
        thread: Option<TopicId>,
        text: &str,
    ) -> Result<MessageRef>;

    /// Send `text` as a reply to `to`, in the same chat.
    async fn reply_text(
        &self,
        to: MessageRef,
        thread: Option<TopicId>,
        text: &str,
    ) -> Result<MessageRef>;

    async fn send_media(
        &self,
        chat_id: ChatId,
        thread: Option<TopicId>,
        kind: MediaKind,
        file_id: &str,
        caption: Option<&str>,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageRef>;

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef>;

    async fn edit_text(&self, msg: MessageRef, text: &str) -> Result<()>;

    /// Stop the client's loading indicator on the pressed button.
    async fn answer_callback_query(&self, callback_id: &str) -> Result<()>;

    async fn create_topic(&self, chat_id: ChatId, name: &str) -> Result<TopicId>;

    async fn close_topic(&self, chat_id: ChatId, topic: TopicId) -> Result<()>;

    async fn administrators(&self, chat_id: ChatId) -> Result<Vec<UserId>>;

    async fn self_identity(&self) -> Result<UserId>;
}
