//! Domain layer for the Members context.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod pin;
pub mod views;
