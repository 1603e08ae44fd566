//! Secret Santa raffle bounded context.
//!
//! A raffle is created with a list of participating members, executed once
//! to draw a giver-to-receiver chain, and may be cancelled at any time.

pub mod application;
pub mod domain;
