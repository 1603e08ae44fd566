//! Shared fixtures for actor runtime integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use giftplanner_actors::{RestartPolicy, Supervisor, SupervisorConfig};
use giftplanner_core::aggregate::{Accepted, AggregateRoot};
use giftplanner_core::command::{Command, CommandFailure};
use giftplanner_core::event::{Event, EventKind};
use giftplanner_core::event_log::EventLog;
use giftplanner_core::rng::DeterministicRng;
use giftplanner_test_support::FixedClock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tally: opened once, then accumulates positive entries in order.
#[derive(Debug, Default)]
pub struct Tally {
    id: Option<Uuid>,
    entries: Vec<u32>,
    closed: bool,
    version: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TallyEvent {
    Opened { id: Uuid },
    Added { amount: u32 },
    Closed,
}

impl EventKind for TallyEvent {
    fn event_type(&self) -> &'static str {
        match self {
            Self::Opened { .. } => "tally.opened",
            Self::Added { .. } => "tally.added",
            Self::Closed => "tally.closed",
        }
    }
}

#[derive(Debug, Clone)]
pub enum TallyCommand {
    Open { id: Uuid },
    Add { id: Uuid, amount: u32 },
    Close { id: Uuid },
    /// Panics inside `handle`, standing in for a bug in domain code.
    Explode { id: Uuid },
}

impl Command for TallyCommand {
    fn command_type(&self) -> &'static str {
        match self {
            Self::Open { .. } => "tally.open",
            Self::Add { .. } => "tally.add",
            Self::Close { .. } => "tally.close",
            Self::Explode { .. } => "tally.explode",
        }
    }

    fn target_id(&self) -> Uuid {
        match self {
            Self::Open { id }
            | Self::Add { id, .. }
            | Self::Close { id }
            | Self::Explode { id } => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TallyView {
    pub id: Uuid,
    pub entries: Vec<u32>,
    pub total: u64,
    pub closed: bool,
    pub version: i64,
}

impl AggregateRoot for Tally {
    type EventKind = TallyEvent;
    type Command = TallyCommand;
    type View = TallyView;

    const STREAM_PREFIX: &'static str = "tally";

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Event<TallyEvent>) {
        match &event.kind {
            TallyEvent::Opened { id } => self.id = Some(*id),
            TallyEvent::Added { amount } => self.entries.push(*amount),
            TallyEvent::Closed => self.closed = true,
        }
        self.version = event.metadata.sequence_number;
    }

    fn handle(
        &self,
        command: TallyCommand,
        _rng: &mut dyn DeterministicRng,
    ) -> Result<Accepted<TallyEvent>, CommandFailure> {
        match command {
            TallyCommand::Open { id } => {
                if self.id.is_some() {
                    return Err(CommandFailure::already_exists("tally already open"));
                }
                Ok(Accepted::new(TallyEvent::Opened { id }, "tally opened"))
            }
            TallyCommand::Add { amount, .. } => {
                if self.id.is_none() {
                    return Err(CommandFailure::not_found("tally does not exist"));
                }
                if self.closed {
                    return Err(CommandFailure::invalid_state("tally is closed"));
                }
                if amount == 0 {
                    return Err(CommandFailure::invalid_input("amount must be positive"));
                }
                Ok(Accepted::new(TallyEvent::Added { amount }, "entry added"))
            }
            TallyCommand::Close { .. } => {
                if self.id.is_none() {
                    return Err(CommandFailure::not_found("tally does not exist"));
                }
                Ok(Accepted::new(TallyEvent::Closed, "tally closed"))
            }
            TallyCommand::Explode { .. } => panic!("tally exploded"),
        }
    }

    fn to_view(&self) -> Option<TallyView> {
        self.id.map(|id| TallyView {
            id,
            entries: self.entries.clone(),
            total: self.entries.iter().map(|&e| u64::from(e)).sum(),
            closed: self.closed,
            version: self.version,
        })
    }
}

/// Config with fast restarts so failure tests finish quickly.
pub fn fast_config(max_restarts: u32) -> SupervisorConfig {
    SupervisorConfig {
        ask_timeout: Duration::from_secs(5),
        mailbox_capacity: 64,
        restart_policy: RestartPolicy {
            max_restarts,
            within: Duration::from_secs(60),
            backoff: Duration::from_millis(1),
        },
    }
}

/// Supervisor over `log` with a fixed clock.
pub fn supervisor(log: Arc<dyn EventLog>, config: SupervisorConfig) -> Supervisor<Tally> {
    Supervisor::new(log, Arc::new(FixedClock::default()), config)
}
