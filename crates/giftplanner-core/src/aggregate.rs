//! Aggregate root abstraction.

use crate::command::{Command, CommandFailure};
use crate::event::{Event, EventKind};
use crate::rng::DeterministicRng;

/// The single event a successful command produces, plus the confirmation
/// message returned to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Accepted<K> {
    /// Payload of the event to append.
    pub event: K,
    /// Confirmation message for the caller.
    pub message: &'static str,
}

impl<K> Accepted<K> {
    /// Builds an acceptance.
    #[must_use]
    pub fn new(event: K, message: &'static str) -> Self {
        Self { event, message }
    }
}

/// Trait for aggregate roots that reconstitute from event history.
///
/// `apply` is the fold: pure, deterministic, and the only path that ever
/// changes aggregate fields. `handle` inspects current state and either
/// rejects a command or names the one event that records its effect; it
/// never mutates.
pub trait AggregateRoot: Default + Send + Sync + 'static {
    /// Payload enum this aggregate produces and consumes.
    type EventKind: EventKind;

    /// Command enum this aggregate accepts.
    type Command: Command + 'static;

    /// Caller-facing read model.
    type View: Clone + std::fmt::Debug + Send + Sync + 'static;

    /// Stream name prefix shared by every instance of this aggregate.
    const STREAM_PREFIX: &'static str;

    /// Returns the current version (sequence number of the last folded event).
    fn version(&self) -> i64;

    /// Folds one event into the aggregate.
    fn apply(&mut self, event: &Event<Self::EventKind>);

    /// Validates a command against current state.
    ///
    /// # Errors
    ///
    /// Returns a `CommandFailure` describing the violated precondition.
    fn handle(
        &self,
        command: Self::Command,
        rng: &mut dyn DeterministicRng,
    ) -> Result<Accepted<Self::EventKind>, CommandFailure>;

    /// Snapshot read model, or `None` if the aggregate was never created.
    fn to_view(&self) -> Option<Self::View>;
}
