//! Infrastructure error types.
//!
//! Precondition violations are never represented here: they travel as
//! [`CommandFailure`](crate::command::CommandFailure) values. A `DomainError`
//! always means the event log or the data it returned could not be trusted.

use thiserror::Error;

/// Failure raised by the event log or while decoding its contents.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    /// The event log could not be reached or rejected the operation.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),

    /// A stored event payload could not be encoded or decoded.
    #[error("event serialization failed: {0}")]
    Serialization(String),

    /// A stream returned events that violate the log's ordering contract.
    #[error("stream {stream_id} is corrupt: {reason}")]
    CorruptStream {
        /// The offending stream.
        stream_id: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_error_converts_to_serialization_variant() {
        let err = serde_json::from_str::<u32>("\"nope\"").unwrap_err();

        let domain: DomainError = err.into();

        assert!(matches!(domain, DomainError::Serialization(_)));
    }

    #[test]
    fn test_corrupt_stream_display_names_stream() {
        let err = DomainError::CorruptStream {
            stream_id: "member-1".to_owned(),
            reason: "sequence gap".to_owned(),
        };

        assert_eq!(err.to_string(), "stream member-1 is corrupt: sequence gap");
    }
}
