//! Shared event-sourcing abstractions.
//!
//! This crate defines the fundamental traits and types that every entity
//! context (members, Secret Santa raffles) and the actor runtime depend on.
//! It contains no infrastructure code.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod event_log;
pub mod rng;
pub mod stream;
