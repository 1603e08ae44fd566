//! Application service for the Secret Santa context.

use std::sync::Arc;

use giftplanner_actors::{ActorError, Supervisor};
use giftplanner_core::command::{CommandEnvelope, CommandSuccess};
use uuid::Uuid;

use crate::domain::aggregates::RaffleAggregate;
use crate::domain::commands::RaffleCommand;
use crate::domain::views::RaffleView;

/// Entry point used by transports.
#[derive(Debug, Clone)]
pub struct RaffleService {
    supervisor: Arc<Supervisor<RaffleAggregate>>,
}

impl RaffleService {
    #[must_use]
    pub fn new(supervisor: Arc<Supervisor<RaffleAggregate>>) -> Self {
        Self { supervisor }
    }

    /// The underlying supervisor, for operational endpoints.
    #[must_use]
    pub fn supervisor(&self) -> &Supervisor<RaffleAggregate> {
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
        envelope: CommandEnvelope<RaffleCommand>,
    ) -> Result<CommandSuccess, ActorError> {
        self.supervisor.execute(envelope).await
    }

    /// Executes a bare command.
    ///
    /// # Errors
    ///
    /// See [`RaffleService::execute`].
    pub async fn send(&self, command: RaffleCommand) -> Result<CommandSuccess, ActorError> {
        self.supervisor.send(command).await
    }

    /// Current read model of one raffle, `None` if never created.
    ///
    /// # Errors
    ///
    /// Returns a runtime error when the actor cannot answer.
    pub async fn get_raffle(&self, raffle_id: Uuid) -> Result<Option<RaffleView>, ActorError> {
        self.supervisor.query(raffle_id).await
    }

    /// Every raffle, newest year first, then by name. Cancelled raffles are
    /// included.
    ///
    /// # Errors
    ///
    /// Returns `ActorError::Infrastructure` if the event log cannot be
    /// enumerated, or the first error raised while querying an actor.
    pub async fn list_raffles(&self) -> Result<Vec<RaffleView>, ActorError> {
        let ids = self.supervisor.list_ids().await?;
        let mut raffles = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(view) = self.supervisor.query(id).await? {
                raffles.push(view);
            }
        }
        raffles.sort_by(|a, b| {
            b.year
                .cmp(&a.year)
                .then_with(|| a.name.cmp(&b.name))
                .then(a.id.cmp(&b.id))
        });
        Ok(raffles)
    }

    /// Raffles held in `year` that were not cancelled.
    ///
    /// # Errors
    ///
    /// See [`RaffleService::list_raffles`].
    pub async fn raffles_by_year(&self, year: i32) -> Result<Vec<RaffleView>, ActorError> {
        let mut raffles = self.list_raffles().await?;
        raffles.retain(|raffle| raffle.year == year && !raffle.is_cancelled);
        Ok(raffles)
    }

    /// Drawn, uncancelled raffles `member_id` takes part in.
    ///
    /// # Errors
    ///
    /// See [`RaffleService::list_raffles`].
    pub async fn raffles_for_member(&self, member_id: Uuid) -> Result<Vec<RaffleView>, ActorError> {
        let mut raffles = self.list_raffles().await?;
        raffles.retain(|raffle| raffle.is_active_draw() && raffle.participant_ids.contains(&member_id));
        Ok(raffles)
    }

    /// Who `member_id` buys for in a standing draw.
    ///
    /// # Errors
    ///
    /// Returns a runtime error when the actor cannot answer.
    pub async fn assignment_for(
        &self,
        raffle_id: Uuid,
        member_id: Uuid,
    ) -> Result<Option<Uuid>, ActorError> {
        Ok(self
            .get_raffle(raffle_id)
            .await?
            .filter(RaffleView::is_active_draw)
            .and_then(|raffle| raffle.assignment_for(member_id)))
    }
}
