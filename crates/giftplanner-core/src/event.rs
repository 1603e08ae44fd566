//! Domain event abstractions.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::event_log::{NewEvent, StoredEvent};

/// Metadata attached to every domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event identifier; doubles as the log's idempotency key.
    pub event_id: Uuid,
    /// Type name for deserialization routing.
    pub event_type: String,
    /// Stream this event belongs to.
    pub stream_id: String,
    /// Position within the stream. Assigned by the event log on append,
    /// zero until then.
    pub sequence_number: i64,
    /// Correlation ID for tracing a command through its effects.
    pub correlation_id: Uuid,
    /// Timestamp of event creation.
    pub occurred_at: DateTime<Utc>,
}

/// Payload side of an event: a closed enum per entity kind.
pub trait EventKind:
    Serialize + DeserializeOwned + Clone + PartialEq + std::fmt::Debug + Send + Sync + 'static
{
    /// Returns the event type name (used for serialization routing).
    fn event_type(&self) -> &'static str;
}

/// Trait that all domain events implement.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Returns the event type name (used for serialization routing).
    fn event_type(&self) -> &'static str;

    /// Serializes the event payload to JSON.
    fn to_payload(&self) -> serde_json::Value;

    /// Returns the metadata for this event.
    fn metadata(&self) -> &EventMetadata;
}

/// Domain event envelope: metadata plus an entity-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<K> {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: K,
}

impl<K: EventKind> Event<K> {
    /// Wraps a freshly decided payload. The sequence number stays zero until
    /// the log acknowledges the append.
    #[must_use]
    pub fn new(
        stream_id: &str,
        event_id: Uuid,
        correlation_id: Uuid,
        occurred_at: DateTime<Utc>,
        kind: K,
    ) -> Self {
        Self {
            metadata: EventMetadata {
                event_id,
                event_type: kind.event_type().to_owned(),
                stream_id: stream_id.to_owned(),
                sequence_number: 0,
                correlation_id,
                occurred_at,
            },
            kind,
        }
    }

    /// Rebuilds a typed event from its stored form.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Serialization` if the payload does not decode
    /// into `K`.
    pub fn from_stored(stored: &StoredEvent) -> Result<Self, DomainError> {
        let kind: K = serde_json::from_value(stored.payload.clone()).map_err(|e| {
            DomainError::Serialization(format!(
                "event {} ({}) in {}: {e}",
                stored.event_id, stored.event_type, stored.stream_id
            ))
        })?;
        Ok(Self {
            metadata: EventMetadata {
                event_id: stored.event_id,
                event_type: stored.event_type.clone(),
                stream_id: stored.stream_id.clone(),
                sequence_number: stored.sequence_number,
                correlation_id: stored.correlation_id,
                occurred_at: stored.occurred_at,
            },
            kind,
        })
    }

    /// Converts the event into the shape handed to [`EventLog::append`](crate::event_log::EventLog::append).
    #[must_use]
    pub fn to_new_event(&self) -> NewEvent {
        NewEvent {
            event_id: self.metadata.event_id,
            event_type: self.event_type().to_owned(),
            payload: self.to_payload(),
            correlation_id: self.metadata.correlation_id,
            occurred_at: self.metadata.occurred_at,
        }
    }
}

impl<K: EventKind> DomainEvent for Event<K> {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("event payload serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
