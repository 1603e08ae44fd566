//! Shared fixtures for member service integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use giftplanner_actors::{Supervisor, SupervisorConfig};
use giftplanner_core::event_log::EventLog;
use giftplanner_event_store::InMemoryEventLog;
use giftplanner_members::application::service::MemberService;
use giftplanner_members::domain::aggregates::GiftPriority;
use giftplanner_members::domain::commands::{AddGift, CreateMember, MemberCommand};
use giftplanner_test_support::FixedClock;
use uuid::Uuid;

/// A service over a fresh in-memory log, plus the log for inspection.
pub fn service() -> (MemberService, Arc<InMemoryEventLog>) {
    let log = Arc::new(InMemoryEventLog::new());
    (service_over(log.clone()), log)
}

/// A service over an existing log, as after a process restart.
pub fn service_over(log: Arc<dyn EventLog>) -> MemberService {
    let supervisor = Supervisor::new(log, Arc::new(FixedClock::default()), SupervisorConfig::default());
    MemberService::new(Arc::new(supervisor))
}

pub fn create(member_id: Uuid, name: &str) -> MemberCommand {
    MemberCommand::CreateMember(CreateMember {
        member_id,
        name: name.to_owned(),
        email: None,
        date_of_birth: None,
        notes: None,
    })
}

pub fn add_gift(member_id: Uuid, gift_id: Uuid, name: &str) -> MemberCommand {
    MemberCommand::AddGift(AddGift {
        member_id,
        gift_id,
        name: name.to_owned(),
        description: None,
        price_cents: Some(1_500),
        url: Some("https://example.com/item".to_owned()),
        priority: GiftPriority::Medium,
    })
}
