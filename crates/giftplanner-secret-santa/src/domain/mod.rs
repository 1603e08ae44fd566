//! Domain layer for the Secret Santa context.

pub mod aggregates;
pub mod assignment;
pub mod commands;
pub mod events;
pub mod views;
