//! Domain events for the Secret Santa context.

use giftplanner_core::event::EventKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::assignment::Assignment;

/// Emitted when a raffle is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaffleCreated {
    pub raffle_id: Uuid,
    pub name: String,
    /// Participants in the order they were given.
    pub participant_ids: Vec<Uuid>,
    /// Spending limit in minor currency units.
    #[serde(default)]
    pub budget_cents: Option<i64>,
    pub created_by: Uuid,
    pub year: i32,
}

/// Emitted when the draw has been made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaffleExecuted {
    /// The chain in draw order.
    pub assignments: Vec<Assignment>,
}

/// Emitted when a raffle is called off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaffleCancelled {
    pub reason: String,
    pub cancelled_by: Uuid,
}

/// Event payload variants for the Secret Santa context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaffleEventKind {
    RaffleCreated(RaffleCreated),
    RaffleExecuted(RaffleExecuted),
    RaffleCancelled(RaffleCancelled),
}

impl EventKind for RaffleEventKind {
    fn event_type(&self) -> &'static str {
        match self {
            Self::RaffleCreated(_) => "secretsanta.raffle_created",
            Self::RaffleExecuted(_) => "secretsanta.raffle_executed",
            Self::RaffleCancelled(_) => "secretsanta.raffle_cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executed_payload_keeps_chain_order() {
        // Arrange
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let kind = RaffleEventKind::RaffleExecuted(RaffleExecuted {
            assignments: vec![
                Assignment { giver: a, receiver: b },
                Assignment { giver: b, receiver: a },
            ],
        });

        // Act
        let json = serde_json::to_value(&kind).unwrap();
        let back: RaffleEventKind = serde_json::from_value(json.clone()).unwrap();

        // Assert
        assert_eq!(json["RaffleExecuted"]["assignments"][0]["giver"], a.to_string());
        assert_eq!(back, kind);
        assert_eq!(back.event_type(), "secretsanta.raffle_executed");
    }
}
