//! Event log contract.
//!
//! Backends (PostgreSQL, in-memory, ...) implement [`EventLog`]; the actor
//! runtime never depends on backend-specific types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DomainError;

/// An event submitted for append. Carries no sequence number: the log
/// assigns it.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    /// Unique event identifier, used to discard duplicate submissions.
    pub event_id: Uuid,
    /// Event type name for deserialization routing.
    pub event_type: String,
    /// Serialized event payload.
    pub payload: serde_json::Value,
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Timestamp of event creation.
    pub occurred_at: DateTime<Utc>,
}

/// Stored representation of a domain event.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEvent {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Stream this event belongs to.
    pub stream_id: String,
    /// Event type name for deserialization routing.
    pub event_type: String,
    /// Serialized event payload.
    pub payload: serde_json::Value,
    /// Sequence number within the stream, starting at 1.
    pub sequence_number: i64,
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Timestamp of event creation.
    pub occurred_at: DateTime<Utc>,
}

impl StoredEvent {
    /// Builds the stored form of `event` at `sequence_number` in `stream_id`.
    #[must_use]
    pub fn from_new(stream_id: &str, sequence_number: i64, event: NewEvent) -> Self {
        Self {
            event_id: event.event_id,
            stream_id: stream_id.to_owned(),
            event_type: event.event_type,
            payload: event.payload,
            sequence_number,
            correlation_id: event.correlation_id,
            occurred_at: event.occurred_at,
        }
    }
}

/// Result of an append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The event was stored at this sequence number.
    Appended(i64),
    /// An event with the same id was already stored at this sequence number;
    /// nothing was written.
    Duplicate(i64),
}

impl AppendOutcome {
    /// The sequence number the event occupies in its stream.
    #[must_use]
    pub fn sequence_number(self) -> i64 {
        match self {
            Self::Appended(seq) | Self::Duplicate(seq) => seq,
        }
    }
}

/// Append-only, per-stream ordered event storage.
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Appends one event to `stream_id`, assigning the next sequence number.
    ///
    /// Re-submitting an `event_id` already stored in the stream is a no-op
    /// reported as [`AppendOutcome::Duplicate`].
    async fn append(&self, stream_id: &str, event: NewEvent) -> Result<AppendOutcome, DomainError>;

    /// Reads every event of `stream_id` in ascending sequence order. A stream
    /// that never existed yields an empty list, never an error.
    async fn read(&self, stream_id: &str) -> Result<Vec<StoredEvent>, DomainError>;

    /// Lists the distinct stream names starting with `prefix`, excluding
    /// system streams.
    async fn list_stream_ids(&self, prefix: &str) -> Result<Vec<String>, DomainError>;
}
