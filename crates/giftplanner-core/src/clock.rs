//! Clock abstraction for deterministic timestamps.

use chrono::{DateTime, Utc};

/// Source of event timestamps. Actors stamp every appended event with
/// `now()`, so tests inject a fixed clock to get reproducible aggregates.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
