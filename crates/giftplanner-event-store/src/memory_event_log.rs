//! In-process implementation of the `EventLog` trait.
//!
//! Used for local development (no `DATABASE_URL`) and throughout the test
//! suites. Data lives only as long as the value.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use giftplanner_core::error::DomainError;
use giftplanner_core::event_log::{AppendOutcome, EventLog, NewEvent, StoredEvent};
use giftplanner_core::stream::is_system_stream;

/// Event log held in memory, one vector per stream.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    streams: RwLock<BTreeMap<String, Vec<StoredEvent>>>,
}

impl InMemoryEventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored events across all streams.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the internal lock is poisoned.
    pub fn event_count(&self) -> Result<usize, DomainError> {
        let streams = self.streams.read().map_err(poisoned)?;
        Ok(streams.values().map(Vec::len).sum())
    }
}

fn poisoned<T>(_: T) -> DomainError {
    DomainError::Infrastructure("in-memory event log lock poisoned".to_owned())
}

#[async_trait]
impl EventLog for InMemoryEventLog {
    async fn append(&self, stream_id: &str, event: NewEvent) -> Result<AppendOutcome, DomainError> {
        let mut streams = self.streams.write().map_err(poisoned)?;
        let stream = streams.entry(stream_id.to_owned()).or_default();

        if let Some(existing) = stream.iter().find(|e| e.event_id == event.event_id) {
            return Ok(AppendOutcome::Duplicate(existing.sequence_number));
        }

        let sequence_number = stream.last().map_or(1, |last| last.sequence_number + 1);
        stream.push(StoredEvent::from_new(stream_id, sequence_number, event));
        Ok(AppendOutcome::Appended(sequence_number))
    }

    async fn read(&self, stream_id: &str) -> Result<Vec<StoredEvent>, DomainError> {
        let streams = self.streams.read().map_err(poisoned)?;
        Ok(streams.get(stream_id).cloned().unwrap_or_default())
    }

    async fn list_stream_ids(&self, prefix: &str) -> Result<Vec<String>, DomainError> {
        let streams = self.streams.read().map_err(poisoned)?;
        Ok(streams
            .keys()
            .filter(|name| name.starts_with(prefix) && !is_system_stream(name))
            .cloned()
            .collect())
    }
}
