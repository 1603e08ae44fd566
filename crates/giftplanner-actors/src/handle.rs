//! Async handle to a running entity actor.

use std::fmt;
use std::time::Duration;

use giftplanner_core::aggregate::AggregateRoot;
use giftplanner_core::command::{CommandEnvelope, CommandSuccess};
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::actor::ActorMessage;
use crate::error::ActorError;

/// Lightweight, cloneable handle to one entity's actor.
///
/// Every call is a bounded ask: the message is queued behind whatever the
/// actor is already doing, and the caller waits at most `ask_timeout` for
/// the reply.
pub struct EntityHandle<A: AggregateRoot> {
    entity_id: Uuid,
    sender: mpsc::Sender<ActorMessage<A>>,
    ask_timeout: Duration,
}

// Manual `Clone` because `A` itself need not be `Clone` for the handle.
impl<A: AggregateRoot> Clone for EntityHandle<A> {
    fn clone(&self) -> Self {
        Self {
            entity_id: self.entity_id,
            sender: self.sender.clone(),
            ask_timeout: self.ask_timeout,
        }
    }
}

impl<A: AggregateRoot> fmt::Debug for EntityHandle<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityHandle")
            .field("entity_kind", &A::STREAM_PREFIX)
            .field("entity_id", &self.entity_id)
            .field("alive", &self.is_alive())
            .finish_non_exhaustive()
    }
}

impl<A: AggregateRoot> EntityHandle<A> {
    pub(crate) fn new(
        entity_id: Uuid,
        sender: mpsc::Sender<ActorMessage<A>>,
        ask_timeout: Duration,
    ) -> Self {
        Self {
            entity_id,
            sender,
            ask_timeout,
        }
    }

    /// The entity this handle addresses.
    #[must_use]
    pub fn entity_id(&self) -> Uuid {
        self.entity_id
    }

    /// Sends a command and waits for its outcome.
    ///
    /// # Errors
    ///
    /// * [`ActorError::Rejected`] -- a precondition failed; nothing was written.
    /// * [`ActorError::Infrastructure`] -- the event log failed.
    /// * [`ActorError::Timeout`] -- no reply within the ask timeout.
    /// * [`ActorError::Unavailable`] -- the actor exhausted its restart budget.
    /// * [`ActorError::Stopped`] -- the actor task has exited.
    pub async fn execute(
        &self,
        envelope: CommandEnvelope<A::Command>,
    ) -> Result<CommandSuccess, ActorError> {
        let (reply, rx) = oneshot::channel();
        self.ask(ActorMessage::Execute { envelope, reply }, rx).await
    }

    /// Fetches the current read model, `None` if the entity was never created.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute), minus `Rejected`.
    pub async fn state(&self) -> Result<Option<A::View>, ActorError> {
        let (reply, rx) = oneshot::channel();
        self.ask(ActorMessage::GetState { reply }, rx).await
    }

    /// Returns `true` while the actor task is still receiving.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.sender.is_closed()
    }

    async fn ask<T>(
        &self,
        message: ActorMessage<A>,
        rx: oneshot::Receiver<Result<T, ActorError>>,
    ) -> Result<T, ActorError> {
        let round_trip = async {
            self.sender
                .send(message)
                .await
                .map_err(|_| ActorError::Stopped)?;
            rx.await.map_err(|_| ActorError::Stopped)?
        };
        tokio::time::timeout(self.ask_timeout, round_trip)
            .await
            .map_err(|_| ActorError::Timeout(self.ask_timeout))?
    }
}
