//! Errors surfaced by the actor runtime to its callers.

use std::time::Duration;

use giftplanner_core::command::CommandFailure;
use giftplanner_core::error::DomainError;
use uuid::Uuid;

/// Why a command or query did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActorError {
    /// The aggregate rejected the command. Nothing was written.
    #[error(transparent)]
    Rejected(#[from] CommandFailure),

    /// The event log failed, or returned data that could not be replayed.
    #[error(transparent)]
    Infrastructure(#[from] DomainError),

    /// No reply arrived within the ask timeout. The command may or may not
    /// have been appended.
    #[error("no reply within {0:?}")]
    Timeout(Duration),

    /// The actor exhausted its restart budget and refuses work until it is
    /// reset.
    #[error("entity {entity_id} is unavailable: restart budget exhausted")]
    Unavailable {
        /// The failed entity.
        entity_id: Uuid,
    },

    /// The actor task ended before replying.
    #[error("entity actor stopped before replying")]
    Stopped,
}

impl ActorError {
    /// `true` when the caller's request was refused by a precondition.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_displays_inner_failure() {
        let err: ActorError = CommandFailure::not_found("member 7 does not exist").into();

        assert_eq!(err.to_string(), "not_found: member 7 does not exist");
        assert!(err.is_rejection());
    }

    #[test]
    fn test_infrastructure_converts_from_domain_error() {
        let err: ActorError = DomainError::Infrastructure("connection refused".into()).into();

        assert_eq!(err.to_string(), "infrastructure error: connection refused");
        assert!(!err.is_rejection());
    }

    #[test]
    fn test_timeout_display_includes_duration() {
        let err = ActorError::Timeout(Duration::from_millis(250));

        assert_eq!(err.to_string(), "no reply within 250ms");
    }
}
