//! Shared test doubles for the Gift Planner workspace.

mod clock;
mod event_log;
mod rng;

pub use clock::{FixedClock, fixed_instant};
pub use event_log::{FailingEventLog, FlakyEventLog, GatedEventLog};
pub use rng::{FirstIndexRng, SequenceRng};
