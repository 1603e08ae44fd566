//! Command abstractions and command outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Trait that all commands implement.
pub trait Command: Send + Sync + fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// The entity this command is addressed to. Used as the routing key.
    fn target_id(&self) -> Uuid;
}

/// A command plus the cross-cutting data that travels with it.
#[derive(Debug, Clone)]
pub struct CommandEnvelope<C> {
    /// The domain command.
    pub command: C,
    /// Correlation ID stamped on the resulting event.
    pub correlation_id: Uuid,
    /// Caller-supplied key for safe retries. When set it becomes the id of
    /// the appended event, and a repeat of an already folded key is
    /// acknowledged without a second write.
    pub idempotency_key: Option<Uuid>,
}

impl<C> CommandEnvelope<C> {
    /// Wraps a command with a fresh correlation id and no idempotency key.
    #[must_use]
    pub fn new(command: C) -> Self {
        Self {
            command,
            correlation_id: Uuid::new_v4(),
            idempotency_key: None,
        }
    }

    /// Sets the idempotency key.
    #[must_use]
    pub fn with_idempotency_key(mut self, key: Uuid) -> Self {
        self.idempotency_key = Some(key);
        self
    }

    /// Overrides the correlation id.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = correlation_id;
        self
    }
}

/// Positive command acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSuccess {
    /// Human-readable confirmation.
    pub message: String,
}

impl CommandSuccess {
    /// Builds a success with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Category of a rejected command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The entity already exists.
    AlreadyExists,
    /// The entity was never created, or has been deleted.
    NotFound,
    /// A gift or relationship referenced by the command does not exist.
    ChildNotFound,
    /// The command is illegal in the entity's current state.
    InvalidState,
    /// The command payload is malformed.
    InvalidInput,
}

impl FailureReason {
    /// Machine-readable code, stable across releases.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::AlreadyExists => "already_exists",
            Self::NotFound => "not_found",
            Self::ChildNotFound => "child_not_found",
            Self::InvalidState => "invalid_state",
            Self::InvalidInput => "invalid_input",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A command rejected by a precondition check. Never accompanied by a write.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{reason}: {message}")]
pub struct CommandFailure {
    /// Failure category.
    pub reason: FailureReason,
    /// Human-readable explanation.
    pub message: String,
}

impl CommandFailure {
    /// Builds a failure.
    #[must_use]
    pub fn new(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }

    /// `AlreadyExists` failure.
    #[must_use]
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(FailureReason::AlreadyExists, message)
    }

    /// `NotFound` failure.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FailureReason::NotFound, message)
    }

    /// `ChildNotFound` failure.
    #[must_use]
    pub fn child_not_found(message: impl Into<String>) -> Self {
        Self::new(FailureReason::ChildNotFound, message)
    }

    /// `InvalidState` failure.
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(FailureReason::InvalidState, message)
    }

    /// `InvalidInput` failure.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(FailureReason::InvalidInput, message)
    }
}

/// Outcome of a command handled by an entity actor.
pub type CommandResult = Result<CommandSuccess, CommandFailure>;
