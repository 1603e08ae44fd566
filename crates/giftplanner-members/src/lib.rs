//! Members bounded context: family members, their wishlists and relationships.
//!
//! Responsible for family members, their gift wishlists, gift claiming, and
//! the relationships between members.

pub mod application;
pub mod domain;
