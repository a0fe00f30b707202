//! Telegram adapter (teloxide).
//!
//! This crate implements the `relay-core` MessagingGateway over Telegram Bot API and
//! feeds Telegram updates into the support desk.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile},
};

pub mod handlers;
pub mod router;

use relay_core::{
    domain::{ChatId, MessageId, MessageRef, TopicId, UserId},
    errors::Error,
    messaging::{
        port::MessagingGateway,
        types::{InlineKeyboard, MediaKind},
    },
    Result,
};

/// Icon color for created topics (one of the six colors Telegram accepts).
const TOPIC_ICON_COLOR: u32 = 0x6FB9F0;

#[derive(Clone)]
pub struct TelegramGateway {
    bot: Bot,
}

impl TelegramGateway {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn tg_markup(keyboard: InlineKeyboard) -> InlineKeyboardMarkup {
        let rows: Vec<Vec<InlineKeyboardButton>> = keyboard
            .buttons
            .into_iter()
            .map(|b| vec![InlineKeyboardButton::callback(b.label, b.callback_data)])
            .collect();
        InlineKeyboardMarkup::new(rows)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::Transport(e.to_string())
    }

    fn sent(chat_id: ChatId, msg: &Message) -> MessageRef {
        MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        }
    }
}

#[async_trait]
impl MessagingGateway for TelegramGateway {
    async fn send_text(
        &self,
        chat_id: ChatId,
        thread: Option<TopicId>,
        text: &str,
    ) -> Result<MessageRef> {
        let mut req = self.bot.send_message(Self::tg_chat(chat_id), text.to_string());
        if let Some(t) = thread {
            req = req.message_thread_id(t.0);
        }
        let msg = req.await.map_err(Self::map_err)?;
        Ok(Self::sent(chat_id, &msg))
    }

    async fn reply_text(
        &self,
        to: MessageRef,
        thread: Option<TopicId>,
        text: &str,
    ) -> Result<MessageRef> {
        let mut req = self
            .bot
            .send_message(Self::tg_chat(to.chat_id), text.to_string())
            .reply_to_message_id(Self::tg_msg_id(to.message_id));
        if let Some(t) = thread {
            req = req.message_thread_id(t.0);
        }
        let msg = req.await.map_err(Self::map_err)?;
        Ok(Self::sent(to.chat_id, &msg))
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
        let file = InputFile::file_id(file_id.to_string());
        let msg = match kind {
            MediaKind::Photo => {
                let mut req = self.bot.send_photo(Self::tg_chat(chat_id), file);
                if let Some(c) = caption {
                    req = req.caption(c.to_string());
                }
                if let Some(t) = thread {
                    req = req.message_thread_id(t.0);
                }
                if let Some(k) = keyboard {
                    req = req.reply_markup(Self::tg_markup(k));
                }
                req.await
            }
            MediaKind::Document => {
                let mut req = self.bot.send_document(Self::tg_chat(chat_id), file);
                if let Some(c) = caption {
                    req = req.caption(c.to_string());
                }
                if let Some(t) = thread {
                    req = req.message_thread_id(t.0);
                }
                if let Some(k) = keyboard {
                    req = req.reply_markup(Self::tg_markup(k));
                }
                req.await
            }
        }
        .map_err(Self::map_err)?;
        Ok(Self::sent(chat_id, &msg))
    }

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef> {
        let msg = self
            .bot
            .send_message(Self::tg_chat(chat_id), text.to_string())
            .reply_markup(Self::tg_markup(keyboard))
            .await
            .map_err(Self::map_err)?;
        Ok(Self::sent(chat_id, &msg))
    }

    async fn edit_text(&self, msg: MessageRef, text: &str) -> Result<()> {
        self.bot
            .edit_message_text(
                Self::tg_chat(msg.chat_id),
                Self::tg_msg_id(msg.message_id),
                text.to_string(),
            )
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn answer_callback_query(&self, callback_id: &str) -> Result<()> {
        self.bot
            .answer_callback_query(callback_id.to_string())
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn create_topic(&self, chat_id: ChatId, name: &str) -> Result<TopicId> {
        let topic = self
            .bot
            .create_forum_topic(
                Self::tg_chat(chat_id),
                name.to_string(),
                TOPIC_ICON_COLOR,
                String::new(),
            )
            .await
            .map_err(Self::map_err)?;
        Ok(TopicId(topic.message_thread_id))
    }

    async fn close_topic(&self, chat_id: ChatId, topic: TopicId) -> Result<()> {
        self.bot
            .close_forum_topic(Self::tg_chat(chat_id), topic.0)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn administrators(&self, chat_id: ChatId) -> Result<Vec<UserId>> {
        let members = self
            .bot
            .get_chat_administrators(Self::tg_chat(chat_id))
            .await
            .map_err(Self::map_err)?;
        Ok(members
            .into_iter()
            .map(|m| UserId(m.user.id.0 as i64))
            .collect())
    }

    async fn self_identity(&self) -> Result<UserId> {
        let me = self.bot.get_me().await.map_err(Self::map_err)?;
        Ok(UserId(me.user.id.0 as i64))
    }
}
