//! Shared application state.

use std::sync::Arc;

use giftplanner_actors::{Supervisor, SupervisorConfig};
use giftplanner_core::clock::Clock;
use giftplanner_core::event_log::EventLog;
use giftplanner_members::application::service::MemberService;
use giftplanner_secret_santa::application::service::RaffleService;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub members: MemberService,
    pub raffles: RaffleService,
}

impl AppState {
    /// Creates one supervisor per entity kind over a shared event log.
    #[must_use]
    pub fn new(log: Arc<dyn EventLog>, clock: Arc<dyn Clock>, config: SupervisorConfig) -> Self {
        Self {
            members: MemberService::new(Arc::new(Supervisor::new(
                Arc::clone(&log),
                Arc::clone(&clock),
                config,
            ))),
            raffles: RaffleService::new(Arc::new(Supervisor::new(log, clock, config))),
        }
    }

    /// Assembles state from prebuilt services.
    #[must_use]
    pub fn from_services(members: MemberService, raffles: RaffleService) -> Self {
        Self { members, raffles }
    }
}
