//! Supervision policy: which failures restart an actor, and how often.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::ActorError;

/// Bounded restart budget applied to every actor of one supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartPolicy {
    /// Restarts allowed inside one rolling window.
    pub max_restarts: u32,
    /// Length of the rolling window.
    pub within: Duration,
    /// Pause before each restart.
    pub backoff: Duration,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            max_restarts: 10,
            within: Duration::from_secs(60),
            backoff: Duration::from_millis(100),
        }
    }
}

/// What the supervisor does with an actor after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Keep the actor and its state; the caller already received the error.
    Resume,
    /// Discard the in-memory aggregate and replay the stream.
    Restart,
}

/// Classifies a failure. Precondition rejections resume, everything else
/// restarts.
#[must_use]
pub fn decide(error: &ActorError) -> Directive {
    match error {
        ActorError::Rejected(_) => Directive::Resume,
        _ => Directive::Restart,
    }
}

/// Rolling-window restart counter for a single actor.
#[derive(Debug)]
pub(crate) struct RestartBudget {
    policy: RestartPolicy,
    restarts: VecDeque<Instant>,
}

impl RestartBudget {
    pub(crate) fn new(policy: RestartPolicy) -> Self {
        Self {
            policy,
            restarts: VecDeque::new(),
        }
    }

    /// Records a restart at `now` if the window still has room.
    pub(crate) fn try_acquire(&mut self, now: Instant) -> bool {
        while let Some(&oldest) = self.restarts.front() {
            if now.duration_since(oldest) >= self.policy.within {
                self.restarts.pop_front();
            } else {
                break;
            }
        }
        if self.restarts.len() >= self.policy.max_restarts as usize {
            return false;
        }
        self.restarts.push_back(now);
        true
    }
}
