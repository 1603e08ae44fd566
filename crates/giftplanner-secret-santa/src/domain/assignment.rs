//! Giver-to-receiver draw.
//!
//! Participants are shuffled with Sattolo's algorithm and then chained
//! circularly: each participant gives to the next one, the last gives to the
//! first. For distinct participants the result is a single cycle through
//! everyone with nobody drawing themself.

use giftplanner_core::command::CommandFailure;
use giftplanner_core::rng::DeterministicRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fewest participants a draw can work with.
pub const MIN_PARTICIPANTS: usize = 2;

/// One link of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub giver: Uuid,
    pub receiver: Uuid,
}

/// Draws assignments for `participants`, in chain order.
///
/// The list is used as given; duplicates are not removed.
///
/// # Errors
///
/// Returns an `InvalidInput` failure with fewer than [`MIN_PARTICIPANTS`].
pub fn assign(
    participants: &[Uuid],
    rng: &mut dyn DeterministicRng,
) -> Result<Vec<Assignment>, CommandFailure> {
    let n = participants.len();
    if n < MIN_PARTICIPANTS {
        return Err(CommandFailure::invalid_input(format!(
            "At least {MIN_PARTICIPANTS} participants required"
        )));
    }

    let mut order = participants.to_vec();
    // j < i strictly: a swap with itself would allow a fixed point.
    for i in (1..n).rev() {
        let j = rng.next_index(i);
        order.swap(i, j);
    }

    Ok((0..n)
        .map(|k| Assignment {
            giver: order[k],
            receiver: order[(k + 1) % n],
        })
        .collect())
}
