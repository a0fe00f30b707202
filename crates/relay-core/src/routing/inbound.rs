use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    destination::DestinationCache,
    domain::{ChatId, MessageRef, TopicId, UserId, UserProfile},
    errors::Error,
    locks::UserLocks,
    messaging::{
        port::MessagingGateway,
        types::{Media, MediaKind, Payload},
    },
    routing::RoutingOutcome,
    store::MappingStore,
    texts,
    utils::{local_timestamp, truncate_chars},
    Result,
};

/// Where a user's conversation stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversationState {
    None,
    Open(TopicId),
}

#[derive(Debug)]
pub enum CancelOutcome {
    /// Topic closed and mapping removed.
    Closed { topic: TopicId },
    /// Mapping removed, but the topic could not be closed (or no group is bound).
    TopicLeftOpen { topic: TopicId, error: Error },
    NothingToCancel,
}

/// Routes end-user messages into their per-user topic, opening one on first contact.
pub struct ConversationRouter {
    store: Arc<dyn MappingStore>,
    gateway: Arc<dyn MessagingGateway>,
    destination: Arc<DestinationCache>,
    locks: UserLocks,
    topic_name_limit: usize,
}

impl ConversationRouter {
    pub fn new(
        store: Arc<dyn MappingStore>,
        gateway: Arc<dyn MessagingGateway>,
        destination: Arc<DestinationCache>,
        topic_name_limit: usize,
    ) -> Self {
        Self {
            store,
            gateway,
            destination,
            locks: UserLocks::default(),
            topic_name_limit,
        }
    }

    /// Route one inbound message from `user`.
    ///
    /// Lookup, topic creation and `bind` run under the user's lock, so concurrent first
    /// messages from one user open a single topic.
    pub async fn route_inbound(
        &self,
        user: &UserProfile,
        payload: &Payload,
    ) -> Result<RoutingOutcome> {
        let Some(group) = self.destination.resolve(self.store.as_ref()).await? else {
            return Ok(RoutingOutcome::NoDestinationConfigured);
        };

        let _guard = self.locks.lock_user(user.id).await;
        match self.store.topic_for_user(user.id).await? {
            Some(topic) => Ok(self.forward(group, topic, user.id, payload).await),
            None => self.open(group, user, payload).await,
        }
    }

    pub async fn status(&self, user_id: UserId) -> Result<ConversationState> {
        Ok(match self.store.topic_for_user(user_id).await? {
            Some(topic) => ConversationState::Open(topic),
            None => ConversationState::None,
        })
    }

    /// OPEN → NONE. Closing the topic is best-effort; the mapping is always removed.
    pub async fn cancel(&self, user_id: UserId) -> Result<CancelOutcome> {
        let _guard = self.locks.lock_user(user_id).await;
        let Some(topic) = self.store.topic_for_user(user_id).await? else {
            return Ok(CancelOutcome::NothingToCancel);
        };

        let close_result = match self.destination.resolve(self.store.as_ref()).await? {
            Some(group) => self.gateway.close_topic(group, topic).await,
            None => Err(Error::Config("no support group bound".to_string())),
        };

        self.store.unbind(user_id).await?;

        match close_result {
            Ok(()) => {
                info!(user_id = user_id.0, topic_id = topic.0, "conversation closed");
                Ok(CancelOutcome::Closed { topic })
            }
            Err(e) => {
                warn!(user_id = user_id.0, topic_id = topic.0, error = %e, "failed to close topic; mapping removed anyway");
                Ok(CancelOutcome::TopicLeftOpen { topic, error: e })
            }
        }
    }

    async fn open(
        &self,
        group: ChatId,
        user: &UserProfile,
        payload: &Payload,
    ) -> Result<RoutingOutcome> {
        let name = truncate_chars(&user.topic_label(), self.topic_name_limit);
        let topic = match self.gateway.create_topic(group, &name).await {
            Ok(t) => t,
            Err(e) => {
                warn!(user_id = user.id.0, chat_id = group.0, error = %e, "failed to create topic");
                return Ok(RoutingOutcome::CreationFailed { error: e });
            }
        };

        if let Err(e) = self.store.bind(user.id, topic).await {
            // Without a mapping nobody can reach this topic again.
            if let Err(close_err) = self.gateway.close_topic(group, topic).await {
                warn!(topic_id = topic.0, error = %close_err, "failed to close unmapped topic");
            }
            return Err(e);
        }
        info!(user_id = user.id.0, topic_id = topic.0, "conversation opened");

        let first_text = match payload {
            Payload::Text(t) => Some(t.as_str()),
            Payload::Photo(_) | Payload::Document(_) => None,
        };
        let intro = texts::introduction(user, &local_timestamp(), first_text);

        let mut sent = self.gateway.send_text(group, Some(topic), &intro).await;
        if sent.is_ok() {
            if let Some((kind, media)) = payload.media() {
                sent = self
                    .gateway
                    .send_media(
                        group,
                        Some(topic),
                        kind,
                        &media.file_id,
                        media.caption.as_deref(),
                        None,
                    )
                    .await;
            }
        }

        Ok(match sent {
            Ok(_) => RoutingOutcome::Delivered {
                user_id: user.id,
                topic,
                opened: true,
            },
            Err(e) => {
                warn!(user_id = user.id.0, topic_id = topic.0, error = %e, "failed to post into new topic");
                RoutingOutcome::DeliveryFailed {
                    user_id: user.id,
                    topic,
                    error: e,
                }
            }
        })
    }

    async fn forward(
        &self,
        group: ChatId,
        topic: TopicId,
        user_id: UserId,
        payload: &Payload,
    ) -> RoutingOutcome {
        let sent = match payload {
            Payload::Text(text) => {
                self.gateway
                    .send_text(group, Some(topic), &texts::user_text(text))
                    .await
            }
            Payload::Photo(media) => {
                self.forward_media(group, topic, MediaKind::Photo, media)
                    .await
            }
            Payload::Document(media) => {
                self.forward_media(group, topic, MediaKind::Document, media)
                    .await
            }
        };

        match sent {
            Ok(_) => RoutingOutcome::Delivered {
                user_id,
                topic,
                opened: false,
            },
            Err(e) => {
                warn!(user_id = user_id.0, topic_id = topic.0, error = %e, "failed to forward message into topic");
                RoutingOutcome::DeliveryFailed {
                    user_id,
                    topic,
                    error: e,
                }
            }
        }
    }

    async fn forward_media(
        &self,
        group: ChatId,
        topic: TopicId,
        kind: MediaKind,
        media: &Media,
    ) -> Result<MessageRef> {
        let caption = texts::user_caption(media.caption.as_deref());
        self.gateway
            .send_media(
                group,
                Some(topic),
                kind,
                &media.file_id,
                caption.as_deref(),
                None,
            )
            .await
    }
}
