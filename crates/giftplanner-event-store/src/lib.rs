//! Gift Planner event log backends.
//!
//! Both backends satisfy the [`EventLog`](giftplanner_core::event_log::EventLog)
//! contract: strictly increasing per-stream sequence numbers assigned at
//! append time, idempotent appends keyed by event id, and empty reads for
//! streams that never existed.

pub mod memory_event_log;
pub mod pg_event_log;
pub mod schema;

pub use memory_event_log::InMemoryEventLog;
pub use pg_event_log::PgEventLog;
