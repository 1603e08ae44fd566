//! Gift Planner actor runtime.
//!
//! Every entity (one member, one raffle) is owned by a single Tokio task that
//! replays the entity's stream, then handles commands and queries strictly
//! one at a time. A [`Supervisor`] per entity kind spawns those tasks on
//! first reference, routes messages to them, and restarts them within a
//! bounded budget when the event log misbehaves.

mod actor;
pub mod error;
pub mod handle;
pub mod policy;
pub mod supervisor;

pub use error::ActorError;
pub use handle::EntityHandle;
pub use policy::{Directive, RestartPolicy};
pub use supervisor::{RngFactory, Supervisor, SupervisorConfig};
