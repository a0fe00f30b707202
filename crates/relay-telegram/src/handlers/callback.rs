use teloxide::types::CallbackQuery;

use relay_core::{
    domain::UserId,
    messaging::types::{ButtonPress, IncomingUpdate},
};

use super::message::message_ref;

pub(super) fn button_press(q: &CallbackQuery) -> IncomingUpdate {
    IncomingUpdate::Button(ButtonPress {
        callback_id: q.id.clone(),
        from: UserId(q.from.id.0 as i64),
        message: q.message.as_ref().map(message_ref),
        data: q.data.clone().unwrap_or_default(),
    })
}
