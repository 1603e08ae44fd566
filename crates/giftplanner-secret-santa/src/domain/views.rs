//! Read model returned by raffle queries.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::aggregates::RaffleAggregate;
use super::assignment::Assignment;

/// Snapshot of one raffle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaffleView {
    pub id: Uuid,
    pub name: String,
    pub participant_ids: Vec<Uuid>,
    pub budget_cents: Option<i64>,
    pub created_by: Option<Uuid>,
    pub year: i32,
    pub is_executed: bool,
    pub is_cancelled: bool,
    /// Empty until executed.
    pub assignments: Vec<Assignment>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i64,
}

impl RaffleView {
    pub(crate) fn from_aggregate(id: Uuid, raffle: &RaffleAggregate) -> Self {
        Self {
            id,
            name: raffle.name.clone(),
            participant_ids: raffle.participant_ids.clone(),
            budget_cents: raffle.budget_cents,
            created_by: raffle.created_by,
            year: raffle.year,
            is_executed: raffle.is_executed,
            is_cancelled: raffle.is_cancelled,
            assignments: raffle.assignments.clone(),
            created_at: raffle.created_at,
            updated_at: raffle.updated_at,
            version: raffle.version,
        }
    }

    /// The member `giver` buys for, once drawn.
    #[must_use]
    pub fn assignment_for(&self, giver: Uuid) -> Option<Uuid> {
        self.assignments
            .iter()
            .find(|assignment| assignment.giver == giver)
            .map(|assignment| assignment.receiver)
    }

    /// `true` when the draw stands: executed and not cancelled.
    #[must_use]
    pub fn is_active_draw(&self) -> bool {
        self.is_executed && !self.is_cancelled
    }
}
