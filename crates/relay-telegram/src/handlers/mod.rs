//! Telegram update handlers.
//!
//! Each handler converts a teloxide update into a `relay-core` IncomingUpdate and hands
//! it to the support desk. Updates the desk has no use for are dropped here.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};
use tracing::debug;

use crate::router::AppState;

mod callback;
mod commands;
mod message;

pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    let update = callback::button_press(&q);
    state.desk.handle(update).await;
    Ok(())
}

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let update = if commands::is_command(&msg) {
        commands::command(&msg, &state.bot_username)
    } else {
        message::classify(&msg)
    };

    match update {
        Some(update) => state.desk.handle(update).await,
        None => debug!(
            chat_id = msg.chat.id.0,
            message_id = msg.id.0,
            "unsupported message; ignoring"
        ),
    }
    Ok(())
}
