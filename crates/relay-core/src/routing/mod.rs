//! Conversation routing: user → topic (inbound) and topic → user (replies).

pub mod inbound;
pub mod reply;

pub use inbound::{CancelOutcome, ConversationRouter, ConversationState};
pub use reply::ReplyDemux;

use crate::{
    domain::{TopicId, UserId},
    errors::Error,
};

/// Result of routing one message in either direction.
///
/// Storage failures are not an outcome: they come back as `Err` from the routing call.
#[derive(Debug)]
pub enum RoutingOutcome {
    Delivered {
        user_id: UserId,
        topic: TopicId,
        /// A topic was created for this message.
        opened: bool,
    },
    NoDestinationConfigured,
    /// The topic could not be created; nothing was persisted.
    CreationFailed { error: Error },
    /// The mapping exists (and stays) but this message was not delivered.
    DeliveryFailed {
        user_id: UserId,
        topic: TopicId,
        error: Error,
    },
    /// A reply that was not addressed to the bot.
    Ignored,
    UnknownTopic { topic: TopicId },
}
