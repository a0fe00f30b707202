use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    domain::{MessageRef, TopicId, UserId},
    messaging::{
        port::MessagingGateway,
        types::{InlineKeyboard, Media, MediaKind, Payload},
    },
    routing::RoutingOutcome,
    store::MappingStore,
    texts, Result,
};

/// Relays replies written inside a topic back to the user that owns the topic.
pub struct ReplyDemux {
    store: Arc<dyn MappingStore>,
    gateway: Arc<dyn MessagingGateway>,
}

impl ReplyDemux {
    pub fn new(store: Arc<dyn MappingStore>, gateway: Arc<dyn MessagingGateway>) -> Self {
        Self { store, gateway }
    }

    /// Only replies to the bot's own messages are relayed; anything else is `Ignored`.
    /// A failed delivery leaves the mapping alone.
    pub async fn route_reply(
        &self,
        topic: TopicId,
        replier: UserId,
        payload: &Payload,
        is_reply_to_bot: bool,
    ) -> Result<RoutingOutcome> {
        if !is_reply_to_bot {
            debug!(topic_id = topic.0, "reply not addressed to the bot; ignoring");
            return Ok(RoutingOutcome::Ignored);
        }

        let Some(user_id) = self.store.user_for_topic(topic).await? else {
            warn!(topic_id = topic.0, "reply in topic without a user mapping");
            return Ok(RoutingOutcome::UnknownTopic { topic });
        };

        let keyboard = InlineKeyboard::single(texts::REPLY_BUTTON_LABEL, texts::REPLY_BUTTON_DATA);
        let sent = match payload {
            Payload::Text(text) => {
                self.gateway
                    .send_inline_keyboard(user_id.chat(), &texts::support_reply(text), keyboard)
                    .await
            }
            Payload::Photo(media) => {
                self.send_media_reply(user_id, MediaKind::Photo, media, keyboard)
                    .await
            }
            Payload::Document(media) => {
                self.send_media_reply(user_id, MediaKind::Document, media, keyboard)
                    .await
            }
        };

        match sent {
            Ok(_) => {
                info!(
                    topic_id = topic.0,
                    user_id = user_id.0,
                    replier = replier.0,
                    "support reply delivered"
                );
                Ok(RoutingOutcome::Delivered {
                    user_id,
                    topic,
                    opened: false,
                })
            }
            Err(e) => {
                warn!(topic_id = topic.0, user_id = user_id.0, error = %e, "failed to deliver support reply");
                Ok(RoutingOutcome::DeliveryFailed {
                    user_id,
                    topic,
                    error: e,
                })
            }
        }
    }

    async fn send_media_reply(
        &self,
        user_id: UserId,
        kind: MediaKind,
        media: &Media,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef> {
        let caption = texts::support_caption(media.caption.as_deref());
        self.gateway
            .send_media(
                user_id.chat(),
                None,
                kind,
                &media.file_id,
                Some(&caption),
                Some(keyboard),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeGateway, MemoryStore, Sent};

    const ADMIN: UserId = UserId(7);

    async fn setup() -> (Arc<MemoryStore>, Arc<FakeGateway>, ReplyDemux) {
        let store = Arc::new(MemoryStore::default());
        store.bind(UserId(42), TopicId(5)).await.unwrap();
        let gateway = Arc::new(FakeGateway::default());
        let demux = ReplyDemux::new(store.clone(), gateway.clone());
        (store, gateway, demux)
    }

    #[tokio::test]
    async fn text_reply_reaches_user_with_reply_button() {
        let (_store, gateway, demux) = setup().await;

        let out = demux
            .route_reply(
                TopicId(5),
                ADMIN,
                &Payload::Text("ok, will check".to_string()),
                true,
            )
            .await
            .unwrap();

        assert!(matches!(
            out,
            RoutingOutcome::Delivered { user_id: UserId(42), .. }
        ));
        let sent = gateway.sent();
        assert_eq!(sent.len(), 1);
        let Sent::Keyboard {
            chat_id,
            text,
            keyboard,
        } = &sent[0]
        else {
            panic!("expected keyboard message, got {:?}", sent[0]);
        };
        assert_eq!(chat_id.0, 42);
        assert!(text.starts_with(texts::SUPPORT_REPLY_LABEL));
        assert!(text.ends_with("ok, will check"));
        assert_eq!(keyboard.buttons.len(), 1);
        assert_eq!(keyboard.buttons[0].callback_data, texts::REPLY_BUTTON_DATA);
    }

    #[tokio::test]
    async fn photo_reply_carries_label_as_caption() {
        let (_store, gateway, demux) = setup().await;

        demux
            .route_reply(
                TopicId(5),
                ADMIN,
                &Payload::Photo(Media::new("p", None)),
                true,
            )
            .await
            .unwrap();

        assert!(matches!(
            &gateway.sent()[0],
            Sent::Media { kind: MediaKind::Photo, caption: Some(c), keyboard: Some(_), .. }
                if c == texts::SUPPORT_REPLY_LABEL
        ));
    }

    #[tokio::test]
    async fn replies_to_other_messages_are_ignored() {
        let (_store, gateway, demux) = setup().await;

        let out = demux
            .route_reply(TopicId(5), ADMIN, &Payload::Text("x".to_string()), false)
            .await
            .unwrap();

        assert!(matches!(out, RoutingOutcome::Ignored));
        assert!(gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn unknown_topic_sends_nothing() {
        let (_store, gateway, demux) = setup().await;

        let out = demux
            .route_reply(TopicId(999), ADMIN, &Payload::Text("x".to_string()), true)
            .await
            .unwrap();

        assert!(matches!(out, RoutingOutcome::UnknownTopic { topic: TopicId(999) }));
        assert!(gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn blocked_user_keeps_mapping() {
        let (store, gateway, demux) = setup().await;
        gateway.fail_sends_to(UserId(42).chat());

        let out = demux
            .route_reply(TopicId(5), ADMIN, &Payload::Text("hi".to_string()), true)
            .await
            .unwrap();

        assert!(matches!(out, RoutingOutcome::DeliveryFailed { .. }));
        assert_eq!(
            store.user_for_topic(TopicId(5)).await.unwrap(),
            Some(UserId(42))
        );
    }
}
