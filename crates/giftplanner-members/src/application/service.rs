//! Application service for the Members context.
//!
//! Thin facade over the member [`Supervisor`]: commands are routed to the
//! owning actor, queries read actor snapshots.

use std::sync::Arc;

use giftplanner_actors::{ActorError, Supervisor};
use giftplanner_core::command::{CommandEnvelope, CommandSuccess};
use tracing::debug;
use uuid::Uuid;

use crate::domain::aggregates::MemberAggregate;
use crate::domain::commands::MemberCommand;
use crate::domain::views::MemberView;

/// Entry point used by transports.
#[derive(Debug, Clone)]
pub struct MemberService {
    supervisor: Arc<Supervisor<MemberAggregate>>,
}

impl MemberService {
    #[must_use]
    pub fn new(supervisor: Arc<Supervisor<MemberAggregate>>) -> Self {
        Self { supervisor }
    }

    /// The underlying supervisor, for operational endpoints.
    #[must_use]
    pub fn supervisor(&self) -> &Supervisor<MemberAggregate> {
        &self.supervisor
    }

    /// Executes a command with its envelope metadata.
    ///
    /// # Errors
    ///
    /// Returns `ActorError::Rejected` when a precondition fails, or a runtime
    /// error when the actor cannot answer.
    pub async fn execute(
        &self,
        envelope: CommandEnvelope<MemberCommand>,
    ) -> Result<CommandSuccess, ActorError> {
        self.supervisor.execute(envelope).await
    }

    /// Executes a bare command.
    ///
    /// # Errors
    ///
    /// See [`MemberService::execute`].
    pub async fn send(&self, command: MemberCommand) -> Result<CommandSuccess, ActorError> {
        self.supervisor.send(command).await
    }

    /// Current read model of one member. Deleted members are still returned,
    /// flagged `is_deleted`; `None` means the member was never created.
    ///
    /// # Errors
    ///
    /// Returns a runtime error when the actor cannot answer.
    pub async fn get_member(&self, member_id: Uuid) -> Result<Option<MemberView>, ActorError> {
        self.supervisor.query(member_id).await
    }

    /// Every member that exists and is not deleted, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `ActorError::Infrastructure` if the event log cannot be
    /// enumerated, or the first error raised while querying an actor.
    pub async fn list_members(&self) -> Result<Vec<MemberView>, ActorError> {
        let ids = self.supervisor.list_ids().await?;
        let mut members = Vec::with_capacity(ids.len());
        for id in ids {
            match self.supervisor.query(id).await? {
                Some(view) if !view.is_deleted => members.push(view),
                _ => debug!(member_id = %id, "skipping absent or deleted member"),
            }
        }
        members.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(members)
    }

    /// Checks a PIN for a live member. Unknown, deleted and PIN-less members
    /// never match.
    ///
    /// # Errors
    ///
    /// Returns a runtime error when the actor cannot answer.
    pub async fn verify_pin(&self, member_id: Uuid, candidate: &str) -> Result<bool, ActorError> {
        Ok(self
            .get_member(member_id)
            .await?
            .is_some_and(|view| !view.is_deleted && view.verify_pin(candidate)))
    }
}
