use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    destination::DestinationCache,
    domain::{ChatId, UserId},
    errors::Error,
    messaging::{port::MessagingGateway, types::ChatKind},
    store::MappingStore,
    Result,
};

#[derive(Debug)]
pub enum BindOutcome {
    Bound {
        destination: ChatId,
        previous: Option<ChatId>,
    },
    /// Not run inside a group.
    WrongContext,
    Unauthorized,
    /// Could not fetch the group's administrators; nothing changed.
    AdminCheckFailed { error: Error },
}

/// Designates the support group. Last authorized call wins; existing conversations are
/// not migrated.
pub struct AdminBootstrap {
    store: Arc<dyn MappingStore>,
    gateway: Arc<dyn MessagingGateway>,
    destination: Arc<DestinationCache>,
}

impl AdminBootstrap {
    pub fn new(
        store: Arc<dyn MappingStore>,
        gateway: Arc<dyn MessagingGateway>,
        destination: Arc<DestinationCache>,
    ) -> Self {
        Self {
            store,
            gateway,
            destination,
        }
    }

    pub async fn bind_destination(
        &self,
        candidate: ChatId,
        chat_kind: ChatKind,
        requester: UserId,
    ) -> Result<BindOutcome> {
        if !chat_kind.is_group() {
            return Ok(BindOutcome::WrongContext);
        }

        let admins = match self.gateway.administrators(candidate).await {
            Ok(a) => a,
            Err(e) => {
                warn!(chat_id = candidate.0, error = %e, "failed to fetch administrators");
                return Ok(BindOutcome::AdminCheckFailed { error: e });
            }
        };
        if !admins.contains(&requester) {
            warn!(
                chat_id = candidate.0,
                user_id = requester.0,
                "non-admin tried to bind support group"
            );
            return Ok(BindOutcome::Unauthorized);
        }

        // Loaded at startup; only used for the replacement warning.
        let previous = self.destination.get();
        self.store.set_destination(candidate).await?;
        self.destination.set(candidate);

        if let Some(prev) = previous.filter(|p| *p != candidate) {
            warn!(
                previous = prev.0,
                chat_id = candidate.0,
                "support group replaced; conversations opened in the previous group are orphaned"
            );
        }
        info!(chat_id = candidate.0, user_id = requester.0, "support group bound");

        Ok(BindOutcome::Bound {
            destination: candidate,
            previous,
        })
    }
}
