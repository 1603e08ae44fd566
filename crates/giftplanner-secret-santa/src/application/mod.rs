//! Application layer for the Secret Santa context.

pub mod service;
