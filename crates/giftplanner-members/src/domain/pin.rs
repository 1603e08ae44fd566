//! PIN validation and hashing.
//!
//! A PIN is 4 to 8 ASCII digits. Only its SHA-256 hex digest ever reaches
//! an event or an aggregate.

use std::fmt::Write;

use giftplanner_core::command::CommandFailure;
use sha2::{Digest, Sha256};

/// Shortest accepted PIN.
pub const MIN_PIN_LEN: usize = 4;
/// Longest accepted PIN.
pub const MAX_PIN_LEN: usize = 8;

/// Checks the PIN shape.
///
/// # Errors
///
/// Returns an `InvalidInput` failure if the PIN has the wrong length or
/// contains anything but ASCII digits.
pub fn validate(pin: &str) -> Result<(), CommandFailure> {
    if !(MIN_PIN_LEN..=MAX_PIN_LEN).contains(&pin.len()) || !pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CommandFailure::invalid_input(format!(
            "PIN must be {MIN_PIN_LEN} to {MAX_PIN_LEN} digits"
        )));
    }
    Ok(())
}

/// Lowercase hex SHA-256 digest of `pin`.
#[must_use]
pub fn hash(pin: &str) -> String {
    Sha256::digest(pin.as_bytes())
        .iter()
        .fold(String::with_capacity(64), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}

/// `true` when `pin` hashes to `expected_hash`.
#[must_use]
pub fn verify(expected_hash: &str, pin: &str) -> bool {
    hash(pin) == expected_hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_hex_sha256() {
        assert_eq!(
            hash("1234"),
            "03ac674216f3e15c761ee1a5e255f067953623c8b388b4459e13f978d7c846f4"
        );
    }

    #[test]
    fn test_validate_accepts_four_to_eight_digits() {
        assert!(validate("1234").is_ok());
        assert!(validate("12345678").is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_shapes() {
        for pin in ["", "123", "123456789", "12a4", "１２３４", " 1234"] {
            assert!(validate(pin).is_err(), "{pin:?} should be rejected");
        }
    }

    #[test]
    fn test_verify_matches_only_the_same_pin() {
        let stored = hash("9876");

        assert!(verify(&stored, "9876"));
        assert!(!verify(&stored, "9875"));
    }
}
