//! Commands for the Secret Santa context.

use giftplanner_core::command::Command;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reason recorded when a cancellation does not name one.
pub const DEFAULT_CANCEL_REASON: &str = "Raffle cancelled";

fn default_reason() -> String {
    DEFAULT_CANCEL_REASON.to_owned()
}

/// Command to create a raffle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRaffle {
    pub raffle_id: Uuid,
    pub name: String,
    /// At least two entries and an even count.
    pub participant_ids: Vec<Uuid>,
    #[serde(default)]
    pub budget_cents: Option<i64>,
    pub created_by: Uuid,
    pub year: i32,
}

/// Command to draw the assignments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteRaffle {
    pub raffle_id: Uuid,
}

/// Command to call a raffle off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelRaffle {
    pub raffle_id: Uuid,
    #[serde(default = "default_reason")]
    pub reason: String,
    pub cancelled_by: Uuid,
}

/// Every command the raffle actor accepts.
#[derive(Debug, Clone)]
pub enum RaffleCommand {
    CreateRaffle(CreateRaffle),
    ExecuteRaffle(ExecuteRaffle),
    CancelRaffle(CancelRaffle),
}

impl Command for RaffleCommand {
    fn command_type(&self) -> &'static str {
        match self {
            Self::CreateRaffle(_) => "secretsanta.create",
            Self::ExecuteRaffle(_) => "secretsanta.execute",
            Self::CancelRaffle(_) => "secretsanta.cancel",
        }
    }

    fn target_id(&self) -> Uuid {
        match self {
            Self::CreateRaffle(c) => c.raffle_id,
            Self::ExecuteRaffle(c) => c.raffle_id,
            Self::CancelRaffle(c) => c.raffle_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_reason_defaults_when_absent() {
        let json = serde_json::json!({"raffle_id": Uuid::nil(), "cancelled_by": Uuid::nil()});

        let command: CancelRaffle = serde_json::from_value(json).unwrap();

        assert_eq!(command.reason, "Raffle cancelled");
    }
}
