//! `EventLog` wrappers that inject faults and delays.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use giftplanner_core::error::DomainError;
use giftplanner_core::event_log::{AppendOutcome, EventLog, NewEvent, StoredEvent};
use tokio::sync::watch;

fn connection_refused() -> DomainError {
    DomainError::Infrastructure("connection refused".into())
}

/// An event log that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug, Default)]
pub struct FailingEventLog;

#[async_trait]
impl EventLog for FailingEventLog {
    async fn append(&self, _stream_id: &str, _event: NewEvent) -> Result<AppendOutcome, DomainError> {
        Err(connection_refused())
    }

    async fn read(&self, _stream_id: &str) -> Result<Vec<StoredEvent>, DomainError> {
        Err(connection_refused())
    }

    async fn list_stream_ids(&self, _prefix: &str) -> Result<Vec<String>, DomainError> {
        Err(connection_refused())
    }
}

/// Wraps another log and fails the first `n` reads and/or appends before
/// delegating. Counts every read so tests can observe reloads.
pub struct FlakyEventLog {
    inner: Arc<dyn EventLog>,
    failing_reads: AtomicUsize,
    failing_appends: AtomicUsize,
    reads: AtomicUsize,
}

impl FlakyEventLog {
    /// Create a wrapper that fails `failing_reads` reads and
    /// `failing_appends` appends.
    #[must_use]
    pub fn new(inner: Arc<dyn EventLog>, failing_reads: usize, failing_appends: usize) -> Self {
        Self {
            inner,
            failing_reads: AtomicUsize::new(failing_reads),
            failing_appends: AtomicUsize::new(failing_appends),
            reads: AtomicUsize::new(0),
        }
    }

    /// Number of `read` calls seen so far, failed ones included.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl EventLog for FlakyEventLog {
    async fn append(&self, stream_id: &str, event: NewEvent) -> Result<AppendOutcome, DomainError> {
        if Self::take_failure(&self.failing_appends) {
            return Err(connection_refused());
        }
        self.inner.append(stream_id, event).await
    }

    async fn read(&self, stream_id: &str) -> Result<Vec<StoredEvent>, DomainError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.failing_reads) {
            return Err(connection_refused());
        }
        self.inner.read(stream_id).await
    }

    async fn list_stream_ids(&self, prefix: &str) -> Result<Vec<String>, DomainError> {
        self.inner.list_stream_ids(prefix).await
    }
}

/// Wraps another log and holds every `read` until [`GatedEventLog::open`] is
/// called. Lets tests queue commands while an actor is still loading.
pub struct GatedEventLog {
    inner: Arc<dyn EventLog>,
    gate: watch::Sender<bool>,
}

impl GatedEventLog {
    /// Create a closed gate in front of `inner`.
    #[must_use]
    pub fn new(inner: Arc<dyn EventLog>) -> Self {
        Self {
            inner,
            gate: watch::Sender::new(false),
        }
    }

    /// Releases all pending and future reads.
    pub fn open(&self) {
        self.gate.send_replace(true);
    }
}

#[async_trait]
impl EventLog for GatedEventLog {
    async fn append(&self, stream_id: &str, event: NewEvent) -> Result<AppendOutcome, DomainError> {
        self.inner.append(stream_id, event).await
    }

    async fn read(&self, stream_id: &str) -> Result<Vec<StoredEvent>, DomainError> {
        let mut gate = self.gate.subscribe();
        gate.wait_for(|open| *open)
            .await
            .map(|_| ())
            .map_err(|e| DomainError::Infrastructure(e.to_string()))?;
        self.inner.read(stream_id).await
    }

    async fn list_stream_ids(&self, prefix: &str) -> Result<Vec<String>, DomainError> {
        self.inner.list_stream_ids(prefix).await
    }
}
