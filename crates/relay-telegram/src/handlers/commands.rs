use teloxide::types::Message;

use relay_core::{
    domain::TopicId,
    messaging::types::{Command, IncomingUpdate},
};

use super::message::{chat_kind, message_ref, profile};

pub(super) fn is_command(msg: &Message) -> bool {
    msg.text().is_some_and(|t| t.starts_with('/'))
}

pub(super) fn command(msg: &Message, bot_username: &str) -> Option<IncomingUpdate> {
    let from = msg.from()?;
    let name = parse_command(msg.text()?, bot_username)?;

    Some(IncomingUpdate::Command(Command {
        message: message_ref(msg),
        chat_kind: chat_kind(msg),
        chat_title: msg.chat.title().map(str::to_string),
        thread: msg.thread_id.map(TopicId),
        from: profile(from),
        name,
    }))
}

/// Lowercased command name, or `None` when empty or addressed to a different bot.
fn parse_command(text: &str, bot_username: &str) -> Option<String> {
    // Telegram may send `/cmd@botname arg1 ...`
    let first = text.split_whitespace().next()?.trim_start_matches('/');
    let (name, mention) = match first.split_once('@') {
        Some((name, mention)) => (name, Some(mention)),
        None => (first, None),
    };
    if mention.is_some_and(|m| !m.eq_ignore_ascii_case(bot_username)) {
        return None;
    }
    if name.is_empty() {
        return None;
    }
    Some(name.to_lowercase())
}
