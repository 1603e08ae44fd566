//! Aggregate root for the Secret Santa context.

use chrono::{DateTime, Utc};
use giftplanner_core::aggregate::{Accepted, AggregateRoot};
use giftplanner_core::command::CommandFailure;
use giftplanner_core::event::Event;
use giftplanner_core::rng::DeterministicRng;
use uuid::Uuid;

use super::assignment::{self, Assignment, MIN_PARTICIPANTS};
use super::commands::{CancelRaffle, CreateRaffle, RaffleCommand};
use super::events::{RaffleCancelled, RaffleCreated, RaffleEventKind, RaffleExecuted};
use super::views::RaffleView;

/// One Secret Santa raffle.
///
/// Cancelled raffles never execute; executed raffles never execute again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RaffleAggregate {
    pub(crate) id: Option<Uuid>,
    pub(crate) name: String,
    pub(crate) participant_ids: Vec<Uuid>,
    pub(crate) budget_cents: Option<i64>,
    pub(crate) created_by: Option<Uuid>,
    pub(crate) year: i32,
    pub(crate) is_executed: bool,
    pub(crate) is_cancelled: bool,
    pub(crate) assignments: Vec<Assignment>,
    pub(crate) created_at: Option<DateTime<Utc>>,
    pub(crate) updated_at: Option<DateTime<Utc>>,
    pub(crate) version: i64,
}

impl RaffleAggregate {
    fn require_created(&self, raffle_id: Uuid) -> Result<(), CommandFailure> {
        if self.id.is_some() {
            Ok(())
        } else {
            Err(CommandFailure::not_found(format!("Raffle {raffle_id} not found")))
        }
    }

    fn handle_create(&self, cmd: CreateRaffle) -> Result<Accepted<RaffleEventKind>, CommandFailure> {
        if self.id.is_some() {
            return Err(CommandFailure::already_exists(format!(
                "Raffle {} already exists",
                cmd.raffle_id
            )));
        }
        if cmd.name.trim().is_empty() {
            return Err(CommandFailure::invalid_input("Name must not be blank"));
        }
        if cmd.participant_ids.len() < MIN_PARTICIPANTS {
            return Err(CommandFailure::invalid_input(format!(
                "At least {MIN_PARTICIPANTS} participants required"
            )));
        }
        if cmd.participant_ids.len() % 2 != 0 {
            return Err(CommandFailure::invalid_input("Participant count must be even"));
        }
        if cmd.budget_cents.is_some_and(|cents| cents < 0) {
            return Err(CommandFailure::invalid_input("Budget must not be negative"));
        }
        Ok(Accepted::new(
            RaffleEventKind::RaffleCreated(RaffleCreated {
                raffle_id: cmd.raffle_id,
                name: cmd.name,
                participant_ids: cmd.participant_ids,
                budget_cents: cmd.budget_cents,
                created_by: cmd.created_by,
                year: cmd.year,
            }),
            "Raffle created successfully",
        ))
    }

    fn handle_execute(
        &self,
        raffle_id: Uuid,
        rng: &mut dyn DeterministicRng,
    ) -> Result<Accepted<RaffleEventKind>, CommandFailure> {
        self.require_created(raffle_id)?;
        if self.is_cancelled {
            return Err(CommandFailure::invalid_state("Cannot execute a cancelled raffle"));
        }
        if self.is_executed {
            return Err(CommandFailure::invalid_state("Raffle has already been executed"));
        }
        let assignments = assignment::assign(&self.participant_ids, rng)?;
        Ok(Accepted::new(
            RaffleEventKind::RaffleExecuted(RaffleExecuted { assignments }),
            "Raffle executed successfully",
        ))
    }

    fn handle_cancel(&self, cmd: CancelRaffle) -> Result<Accepted<RaffleEventKind>, CommandFailure> {
        self.require_created(cmd.raffle_id)?;
        if self.is_cancelled {
            return Err(CommandFailure::invalid_state("Raffle is already cancelled"));
        }
        Ok(Accepted::new(
            RaffleEventKind::RaffleCancelled(RaffleCancelled {
                reason: cmd.reason,
                cancelled_by: cmd.cancelled_by,
            }),
            "Raffle cancelled successfully",
        ))
    }
}

impl AggregateRoot for RaffleAggregate {
    type EventKind = RaffleEventKind;
    type Command = RaffleCommand;
    type View = RaffleView;

    const STREAM_PREFIX: &'static str = "secretsanta";

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Event<RaffleEventKind>) {
        let at = event.metadata.occurred_at;
        match &event.kind {
            RaffleEventKind::RaffleCreated(payload) => {
                *self = Self {
                    id: Some(payload.raffle_id),
                    name: payload.name.clone(),
                    participant_ids: payload.participant_ids.clone(),
                    budget_cents: payload.budget_cents,
                    created_by: Some(payload.created_by),
                    year: payload.year,
                    created_at: Some(at),
                    updated_at: Some(at),
                    ..Self::default()
                };
            }
            RaffleEventKind::RaffleExecuted(payload) => {
                self.is_executed = true;
                self.assignments.clone_from(&payload.assignments);
                self.updated_at = Some(at);
            }
            RaffleEventKind::RaffleCancelled(_) => {
                self.is_cancelled = true;
                self.updated_at = Some(at);
            }
        }
        self.version = event.metadata.sequence_number;
    }

    fn handle(
        &self,
        command: RaffleCommand,
        rng: &mut dyn DeterministicRng,
    ) -> Result<Accepted<RaffleEventKind>, CommandFailure> {
        match command {
            RaffleCommand::CreateRaffle(cmd) => self.handle_create(cmd),
            RaffleCommand::ExecuteRaffle(cmd) => self.handle_execute(cmd.raffle_id, rng),
            RaffleCommand::CancelRaffle(cmd) => self.handle_cancel(cmd),
        }
    }

    fn to_view(&self) -> Option<RaffleView> {
        self.id.map(|id| RaffleView::from_aggregate(id, self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::ExecuteRaffle;
    use giftplanner_core::command::FailureReason;
    use giftplanner_core::rng::StdRandom;
    use giftplanner_test_support::{FirstIndexRng, fixed_instant};
    use proptest::prelude::*;

    fn run(
        raffle: &mut RaffleAggregate,
        command: RaffleCommand,
        rng: &mut dyn DeterministicRng,
    ) -> Result<Event<RaffleEventKind>, CommandFailure> {
        let accepted = raffle.handle(command, rng)?;
        let mut event = Event::new(
            "secretsanta-test",
            Uuid::new_v4(),
            Uuid::new_v4(),
            fixed_instant(),
            accepted.event,
        );
        event.metadata.sequence_number = raffle.version + 1;
        raffle.apply(&event);
        Ok(event)
    }

    fn create(raffle_id: Uuid, participant_ids: Vec<Uuid>) -> RaffleCommand {
        RaffleCommand::CreateRaffle(CreateRaffle {
            raffle_id,
            name: "Family 2026".to_owned(),
            participant_ids,
            budget_cents: Some(5_000),
            created_by: Uuid::new_v4(),
            year: 2026,
        })
    }

    fn execute(raffle_id: Uuid) -> RaffleCommand {
        RaffleCommand::ExecuteRaffle(ExecuteRaffle { raffle_id })
    }

    fn cancel(raffle_id: Uuid) -> RaffleCommand {
        RaffleCommand::CancelRaffle(CancelRaffle {
            raffle_id,
            reason: "Raffle cancelled".to_owned(),
            cancelled_by: Uuid::new_v4(),
        })
    }

    fn participants(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn test_execute_records_a_full_chain() {
        // Arrange
        let id = Uuid::new_v4();
        let people = participants(4);
        let mut raffle = RaffleAggregate::default();
        run(&mut raffle, create(id, people.clone()), &mut FirstIndexRng).unwrap();

        // Act
        run(&mut raffle, execute(id), &mut StdRandom::seeded(42)).unwrap();

        // Assert
        let view = raffle.to_view().unwrap();
        assert!(view.is_executed);
        assert_eq!(view.assignments.len(), 4);
        for giver in &people {
            let receiver = view.assignment_for(*giver).unwrap();
            assert_ne!(receiver, *giver);
            assert!(people.contains(&receiver));
        }
    }

    #[test]
    fn test_create_rejects_odd_or_too_few_participants() {
        let mut raffle = RaffleAggregate::default();

        let odd = run(&mut raffle, create(Uuid::new_v4(), participants(3)), &mut FirstIndexRng);
        let lonely = run(&mut raffle, create(Uuid::new_v4(), participants(1)), &mut FirstIndexRng);
        let empty = run(&mut raffle, create(Uuid::new_v4(), vec![]), &mut FirstIndexRng);

        assert_eq!(odd.unwrap_err().reason, FailureReason::InvalidInput);
        assert_eq!(lonely.unwrap_err().reason, FailureReason::InvalidInput);
        assert_eq!(empty.unwrap_err().reason, FailureReason::InvalidInput);
        assert_eq!(raffle, RaffleAggregate::default());
    }

    #[test]
    fn test_duplicate_create_is_already_exists() {
        let id = Uuid::new_v4();
        let mut raffle = RaffleAggregate::default();
        run(&mut raffle, create(id, participants(2)), &mut FirstIndexRng).unwrap();

        let err = run(&mut raffle, create(id, participants(4)), &mut FirstIndexRng).unwrap_err();

        assert_eq!(err.reason, FailureReason::AlreadyExists);
        assert_eq!(raffle.participant_ids.len(), 2);
    }

    #[test]
    fn test_execute_twice_is_invalid_state() {
        let id = Uuid::new_v4();
        let mut raffle = RaffleAggregate::default();
        run(&mut raffle, create(id, participants(2)), &mut FirstIndexRng).unwrap();
        run(&mut raffle, execute(id), &mut FirstIndexRng).unwrap();
        let first_draw = raffle.assignments.clone();

        let err = run(&mut raffle, execute(id), &mut FirstIndexRng).unwrap_err();

        assert_eq!(err.reason, FailureReason::InvalidState);
        assert_eq!(raffle.assignments, first_draw);
    }

    #[test]
    fn test_cancelled_raffle_never_executes() {
        // Arrange
        let id = Uuid::new_v4();
        let mut raffle = RaffleAggregate::default();
        run(&mut raffle, create(id, participants(4)), &mut FirstIndexRng).unwrap();
        run(&mut raffle, cancel(id), &mut FirstIndexRng).unwrap();

        // Act
        let execute_err = run(&mut raffle, execute(id), &mut FirstIndexRng).unwrap_err();
        let cancel_err = run(&mut raffle, cancel(id), &mut FirstIndexRng).unwrap_err();

        // Assert
        assert_eq!(execute_err.reason, FailureReason::InvalidState);
        assert_eq!(cancel_err.reason, FailureReason::InvalidState);
        let view = raffle.to_view().unwrap();
        assert!(view.is_cancelled);
        assert!(!view.is_executed);
        assert!(view.assignments.is_empty());
    }

    #[test]
    fn test_executed_raffle_can_still_be_cancelled() {
        let id = Uuid::new_v4();
        let mut raffle = RaffleAggregate::default();
        run(&mut raffle, create(id, participants(2)), &mut FirstIndexRng).unwrap();
        run(&mut raffle, execute(id), &mut FirstIndexRng).unwrap();

        run(&mut raffle, cancel(id), &mut FirstIndexRng).unwrap();

        assert!(raffle.is_executed);
        assert!(raffle.is_cancelled);
    }

    #[test]
    fn test_commands_on_unknown_raffle_are_not_found() {
        let id = Uuid::new_v4();
        let mut raffle = RaffleAggregate::default();

        let execute_err = run(&mut raffle, execute(id), &mut FirstIndexRng).unwrap_err();
        let cancel_err = run(&mut raffle, cancel(id), &mut FirstIndexRng).unwrap_err();

        assert_eq!(execute_err.reason, FailureReason::NotFound);
        assert_eq!(cancel_err.reason, FailureReason::NotFound);
        assert!(raffle.to_view().is_none());
    }

    #[test]
    fn test_negative_budget_is_invalid_input() {
        let mut raffle = RaffleAggregate::default();
        let command = RaffleCommand::CreateRaffle(CreateRaffle {
            raffle_id: Uuid::new_v4(),
            name: "Cheap".to_owned(),
            participant_ids: participants(2),
            budget_cents: Some(-100),
            created_by: Uuid::new_v4(),
            year: 2026,
        });

        let err = run(&mut raffle, command, &mut FirstIndexRng).unwrap_err();

        assert_eq!(err.reason, FailureReason::InvalidInput);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_replay_reproduces_the_recorded_draw(half in 1usize..20, seed in any::<u64>(), cancel_first in any::<bool>()) {
            // Arrange
            let id = Uuid::new_v4();
            let mut live = RaffleAggregate::default();
            let mut log = vec![run(&mut live, create(id, participants(half * 2)), &mut FirstIndexRng).unwrap()];
            if cancel_first {
                log.push(run(&mut live, cancel(id), &mut FirstIndexRng).unwrap());
            }
            if let Ok(event) = run(&mut live, execute(id), &mut StdRandom::seeded(seed)) {
                log.push(event);
            }

            // Act: replay never consults an RNG.
            let mut replayed = RaffleAggregate::default();
            for event in &log {
                replayed.apply(event);
            }

            // Assert
            prop_assert_eq!(replayed.to_view(), live.to_view());
            prop_assert_eq!(replayed.is_executed, !cancel_first);
        }
    }
}
