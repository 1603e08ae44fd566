//! Application layer for the Members context.

pub mod service;
