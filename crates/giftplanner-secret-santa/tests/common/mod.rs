//! Shared fixtures for raffle service integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use giftplanner_actors::{Supervisor, SupervisorConfig};
use giftplanner_core::event_log::EventLog;
use giftplanner_core::rng::{DeterministicRng, StdRandom};
use giftplanner_event_store::InMemoryEventLog;
use giftplanner_secret_santa::application::service::RaffleService;
use giftplanner_secret_santa::domain::commands::{CreateRaffle, RaffleCommand};
use giftplanner_test_support::FixedClock;
use uuid::Uuid;

/// A service over a fresh in-memory log with a seeded draw.
pub fn service() -> (RaffleService, Arc<InMemoryEventLog>) {
    let log = Arc::new(InMemoryEventLog::new());
    (service_over(log.clone()), log)
}

pub fn service_over(log: Arc<dyn EventLog>) -> RaffleService {
    let supervisor = Supervisor::with_rng_factory(
        log,
        Arc::new(FixedClock::default()),
        SupervisorConfig::default(),
        Arc::new(|| Box::new(StdRandom::seeded(2026)) as Box<dyn DeterministicRng>),
    );
    RaffleService::new(Arc::new(supervisor))
}

pub fn create(raffle_id: Uuid, name: &str, year: i32, participant_ids: Vec<Uuid>) -> RaffleCommand {
    RaffleCommand::CreateRaffle(CreateRaffle {
        raffle_id,
        name: name.to_owned(),
        participant_ids,
        budget_cents: Some(2_500),
        created_by: Uuid::new_v4(),
        year,
    })
}

pub fn participants(n: usize) -> Vec<Uuid> {
    (0..n).map(|_| Uuid::new_v4()).collect()
}
