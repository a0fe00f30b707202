//! The support desk: turns incoming updates into routing calls and routing outcomes into
//! user/admin-visible messages.
//!
//! Nothing here returns an error to the dispatcher. Every failure is logged and reported
//! once to whoever triggered it.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::{
    bootstrap::{AdminBootstrap, BindOutcome},
    config::Config,
    destination::DestinationCache,
    domain::{ChatId, MessageRef, TopicId, UserId},
    errors::Error,
    messaging::{
        port::MessagingGateway,
        types::{ButtonPress, ChatKind, Command, GroupReply, IncomingUpdate, Payload, PrivateMessage},
    },
    routing::{CancelOutcome, ConversationRouter, ConversationState, ReplyDemux, RoutingOutcome},
    store::MappingStore,
    texts,
    utils::short_error,
    Result,
};

const MAX_ERROR_CHARS: usize = 200;

pub struct SupportDesk {
    gateway: Arc<dyn MessagingGateway>,
    store: Arc<dyn MappingStore>,
    destination: Arc<DestinationCache>,
    router: ConversationRouter,
    replies: ReplyDemux,
    bootstrap: AdminBootstrap,
    bot_id: UserId,
}

impl SupportDesk {
    /// Load the bound destination (seeding it from config if the store has none) and learn
    /// the bot's own identity.
    pub async fn connect(
        cfg: &Config,
        store: Arc<dyn MappingStore>,
        gateway: Arc<dyn MessagingGateway>,
    ) -> Result<Self> {
        let mut bound = store.destination().await?;
        if bound.is_none() {
            if let Some(seed) = cfg.seed_admin_group {
                info!(chat_id = seed.0, "seeding support group from config");
                store.set_destination(seed).await?;
                bound = Some(seed);
            }
        }
        match bound {
            Some(id) => info!(chat_id = id.0, "support group loaded"),
            None => warn!("no support group bound yet; run /setgroup inside the group"),
        }

        let bot_id = gateway.self_identity().await?;
        Ok(Self::new(
            store,
            gateway,
            Arc::new(DestinationCache::new(bound)),
            bot_id,
            cfg.topic_name_limit,
        ))
    }

    pub fn new(
        store: Arc<dyn MappingStore>,
        gateway: Arc<dyn MessagingGateway>,
        destination: Arc<DestinationCache>,
        bot_id: UserId,
        topic_name_limit: usize,
    ) -> Self {
        Self {
            router: ConversationRouter::new(
                store.clone(),
                gateway.clone(),
                destination.clone(),
                topic_name_limit,
            ),
            replies: ReplyDemux::new(store.clone(), gateway.clone()),
            bootstrap: AdminBootstrap::new(store.clone(), gateway.clone(), destination.clone()),
            gateway,
            store,
            destination,
            bot_id,
        }
    }

    pub fn destination(&self) -> Option<ChatId> {
        self.destination.get()
    }

    pub async fn handle(&self, update: IncomingUpdate) {
        match update {
            IncomingUpdate::Command(cmd) => self.handle_command(cmd).await,
            IncomingUpdate::Private(msg) => self.handle_private(msg).await,
            IncomingUpdate::GroupReply(reply) => self.handle_group_reply(reply).await,
            IncomingUpdate::Button(press) => self.handle_button(press).await,
        }
    }

    async fn handle_command(&self, cmd: Command) {
        let private = cmd.chat_kind == ChatKind::Private;
        match (cmd.name.as_str(), private) {
            ("start", true) => {
                self.respond(&cmd, &texts::welcome(&cmd.from.first_name))
                    .await
            }
            ("help", true) => self.respond(&cmd, texts::USER_HELP).await,
            ("status", true) => self.status(&cmd).await,
            ("cancel", true) => self.cancel(&cmd).await,
            ("setgroup", _) => self.set_group(&cmd).await,
            ("adminhelp", _) => self.respond(&cmd, texts::ADMIN_HELP).await,
            (_, true) => self.respond(&cmd, texts::UNKNOWN_COMMAND).await,
            (name, false) => debug!(command = name, chat_id = cmd.chat_id().0, "ignoring group command"),
        }
    }

    async fn status(&self, cmd: &Command) {
        let text = match self.router.status(cmd.from.id).await {
            Ok(ConversationState::Open(_)) => texts::STATUS_OPEN,
            Ok(ConversationState::None) => texts::STATUS_NONE,
            Err(e) => {
                error!(user_id = cmd.from.id.0, error = %e, "status lookup failed");
                texts::INTERNAL_ERROR
            }
        };
        self.respond(cmd, text).await;
    }

    async fn cancel(&self, cmd: &Command) {
        let text = match self.router.cancel(cmd.from.id).await {
            Ok(CancelOutcome::Closed { .. }) => texts::CANCEL_CLOSED,
            Ok(CancelOutcome::TopicLeftOpen { .. }) => texts::CANCEL_TOPIC_LEFT_OPEN,
            Ok(CancelOutcome::NothingToCancel) => texts::CANCEL_NOTHING,
            Err(e) => {
                error!(user_id = cmd.from.id.0, error = %e, "cancel failed");
                texts::INTERNAL_ERROR
            }
        };
        self.respond(cmd, text).await;
    }

    async fn set_group(&self, cmd: &Command) {
        let outcome = self
            .bootstrap
            .bind_destination(cmd.chat_id(), cmd.chat_kind, cmd.from.id)
            .await;
        let text = match outcome {
            Ok(BindOutcome::Bound { destination, .. }) => {
                texts::group_bound(destination, cmd.chat_title.as_deref())
            }
            Ok(BindOutcome::WrongContext) => texts::SETGROUP_WRONG_CONTEXT.to_string(),
            Ok(BindOutcome::Unauthorized) => texts::SETGROUP_UNAUTHORIZED.to_string(),
            Ok(BindOutcome::AdminCheckFailed { .. }) => texts::SETGROUP_CHECK_FAILED.to_string(),
            Err(e) => {
                error!(chat_id = cmd.chat_id().0, error = %e, "failed to persist support group");
                texts::INTERNAL_ERROR.to_string()
            }
        };
        self.respond(cmd, &text).await;
    }

    async fn handle_private(&self, msg: PrivateMessage) {
        let user_id = msg.from.id;
        let text = match self.router.route_inbound(&msg.from, &msg.payload).await {
            Ok(RoutingOutcome::Delivered { opened: true, .. }) => Some(texts::FIRST_CONTACT_OK),
            Ok(RoutingOutcome::Delivered { .. }) => match msg.payload {
                Payload::Text(_) => None,
                Payload::Photo(_) => Some(texts::PHOTO_SENT),
                Payload::Document(_) => Some(texts::FILE_SENT),
            },
            Ok(RoutingOutcome::NoDestinationConfigured) => Some(texts::NOT_CONFIGURED),
            Ok(RoutingOutcome::CreationFailed { .. }) => Some(texts::CREATION_FAILED),
            Ok(RoutingOutcome::DeliveryFailed { .. }) => Some(texts::DELIVERY_FAILED),
            Ok(RoutingOutcome::Ignored | RoutingOutcome::UnknownTopic { .. }) => None,
            Err(e) => {
                error!(user_id = user_id.0, error = %e, "failed to route user message");
                Some(texts::INTERNAL_ERROR)
            }
        };

        if let Some(text) = text {
            self.notify(user_id.chat(), None, text).await;
        }
    }

    async fn handle_group_reply(&self, reply: GroupReply) {
        let chat_id = reply.message.chat_id;
        match self.destination.resolve(self.store.as_ref()).await {
            Ok(Some(group)) if group == chat_id => {}
            Ok(_) => {
                debug!(chat_id = chat_id.0, "reply outside the support group; ignoring");
                return;
            }
            Err(e) => {
                error!(chat_id = chat_id.0, error = %e, "failed to load support group");
                return;
            }
        }
        let Some(topic) = reply.topic else {
            debug!(chat_id = chat_id.0, "reply outside any topic; ignoring");
            return;
        };

        let is_reply_to_bot = reply.reply_to_author == Some(self.bot_id);
        let outcome = self
            .replies
            .route_reply(topic, reply.from, &reply.payload, is_reply_to_bot)
            .await;

        let text = match outcome {
            Ok(RoutingOutcome::Delivered { .. }) => texts::REPLY_DELIVERED.to_string(),
            Ok(RoutingOutcome::UnknownTopic { .. }) => texts::UNKNOWN_TOPIC.to_string(),
            Ok(RoutingOutcome::DeliveryFailed { error, .. }) => {
                texts::reply_failed(&short_error(&error, MAX_ERROR_CHARS))
            }
            Ok(RoutingOutcome::Ignored) => return,
            Ok(other) => {
                debug!(outcome = ?other, "unexpected reply outcome");
                return;
            }
            Err(e) => texts::reply_failed(&short_error(&e, MAX_ERROR_CHARS)),
        };

        self.reply_in_topic(reply.message, topic, &text).await;
    }

    async fn handle_button(&self, press: ButtonPress) {
        if let Err(e) = self
            .gateway
            .answer_callback_query(&press.callback_id)
            .await
        {
            warn!(user_id = press.from.0, error = %e, "failed to answer callback query");
        }

        if press.data != texts::REPLY_BUTTON_DATA {
            debug!(data = %press.data, "unknown callback data");
            return;
        }

        match press.message {
            Some(msg) => {
                if let Err(e) = self.gateway.edit_text(msg, texts::REPLY_PROMPT).await {
                    // Media messages have no text to edit; send the prompt instead.
                    debug!(error = %e, "could not edit message into reply prompt");
                    self.notify(msg.chat_id, None, texts::REPLY_PROMPT).await;
                }
            }
            None => {
                self.notify(press.from.chat(), None, texts::REPLY_PROMPT)
                    .await
            }
        }
    }

    /// Answer a command: plain message in private chats, quoted reply in groups.
    async fn respond(&self, cmd: &Command, text: &str) {
        let res = if cmd.chat_kind == ChatKind::Private {
            self.gateway.send_text(cmd.chat_id(), None, text).await
        } else {
            self.gateway.reply_text(cmd.message, cmd.thread, text).await
        };
        log_send_failure(cmd.chat_id(), res.err());
    }

    async fn notify(&self, chat_id: ChatId, thread: Option<TopicId>, text: &str) {
        let res = self.gateway.send_text(chat_id, thread, text).await;
        log_send_failure(chat_id, res.err());
    }

    async fn reply_in_topic(&self, to: MessageRef, topic: TopicId, text: &str) {
        let res = self.gateway.reply_text(to, Some(topic), text).await;
        log_send_failure(to.chat_id, res.err());
    }
}

fn log_send_failure(chat_id: ChatId, err: Option<Error>) {
    if let Some(e) = err {
        warn!(chat_id = chat_id.0, error = %e, "failed to send message");
    }
}
