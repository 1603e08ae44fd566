//! End-to-end tests for `RaffleService` over the in-memory event log.

mod common;

use std::collections::HashSet;

use giftplanner_actors::ActorError;
use giftplanner_core::command::FailureReason;
use giftplanner_core::event_log::EventLog;
use giftplanner_secret_santa::domain::commands::{CancelRaffle, ExecuteRaffle, RaffleCommand};
use uuid::Uuid;

use common::{create, participants, service, service_over};

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

#[tokio::test]
async fn test_four_participant_raffle_draws_one_cycle() {
    // Arrange
    let (raffles, _) = service();
    let id = Uuid::new_v4();
    let people = participants(4);
    raffles.send(create(id, "Family", 2026, people.clone())).await.unwrap();

    // Act
    let success = raffles.send(execute(id)).await.unwrap();
    let view = raffles.get_raffle(id).await.unwrap().unwrap();

    // Assert
    assert_eq!(success.message, "Raffle executed successfully");
    assert_eq!(view.assignments.len(), 4);
    assert!(view.assignments.iter().all(|a| a.giver != a.receiver));
    let mut visited = HashSet::new();
    let mut current = people[0];
    while visited.insert(current) {
        current = view.assignment_for(current).unwrap();
    }
    assert_eq!(current, people[0]);
    assert_eq!(visited.len(), 4);
}

#[tokio::test]
async fn test_draw_is_read_back_after_restart() {
    // Arrange
    let (raffles, log) = service();
    let id = Uuid::new_v4();
    raffles.send(create(id, "Family", 2026, participants(6))).await.unwrap();
    raffles.send(execute(id)).await.unwrap();
    let before = raffles.get_raffle(id).await.unwrap();

    // Act
    let after = service_over(log).get_raffle(id).await.unwrap();

    // Assert
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_cancelled_raffle_refuses_execution_and_writes_nothing() {
    // Arrange
    let (raffles, log) = service();
    let id = Uuid::new_v4();
    raffles.send(create(id, "Office", 2026, participants(2))).await.unwrap();
    raffles.send(cancel(id)).await.unwrap();

    // Act
    let result = raffles.send(execute(id)).await;

    // Assert
    match result {
        Err(ActorError::Rejected(failure)) => assert_eq!(failure.reason, FailureReason::InvalidState),
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(log.read(&format!("secretsanta-{id}")).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_odd_participant_count_is_rejected() {
    let (raffles, _) = service();
    let id = Uuid::new_v4();

    let result = raffles.send(create(id, "Odd", 2026, participants(3))).await;

    assert!(matches!(
        result,
        Err(ActorError::Rejected(ref failure)) if failure.reason == FailureReason::InvalidInput
    ));
    assert!(raffles.get_raffle(id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_listing_filters_by_year_and_member() {
    // Arrange
    let (raffles, _) = service();
    let people = participants(4);
    let (current, older, called_off) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    raffles.send(create(current, "Cousins", 2026, people.clone())).await.unwrap();
    raffles.send(execute(current)).await.unwrap();
    raffles.send(create(older, "Cousins", 2025, people.clone())).await.unwrap();
    raffles.send(create(called_off, "Aunts", 2026, participants(2))).await.unwrap();
    raffles.send(cancel(called_off)).await.unwrap();

    // Act
    let all = raffles.list_raffles().await.unwrap();
    let this_year = raffles.raffles_by_year(2026).await.unwrap();
    let mine = raffles.raffles_for_member(people[0]).await.unwrap();
    let my_receiver = raffles.assignment_for(current, people[0]).await.unwrap();
    let undrawn = raffles.assignment_for(older, people[0]).await.unwrap();

    // Assert
    let ids: Vec<Uuid> = all.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![called_off, current, older]);
    assert_eq!(this_year.iter().map(|r| r.id).collect::<Vec<_>>(), vec![current]);
    assert_eq!(mine.iter().map(|r| r.id).collect::<Vec<_>>(), vec![current]);
    let receiver = my_receiver.unwrap();
    assert_ne!(receiver, people[0]);
    assert!(people.contains(&receiver));
    assert_eq!(undrawn, None);
}
