//! Route modules organized by bounded context.

pub mod health;
pub mod members;
pub mod raffles;

use axum::http::HeaderMap;
use giftplanner_core::command::{CommandEnvelope, CommandSuccess};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying a caller-chosen idempotency key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Header carrying the caller's correlation id.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Response body returned after a command is accepted.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// The entity the command addressed.
    pub id: Uuid,
    /// Confirmation message.
    pub message: String,
}

impl CommandResponse {
    pub(crate) fn new(id: Uuid, success: CommandSuccess) -> Self {
        Self {
            id,
            message: success.message,
        }
    }
}

/// Wraps `command` with the envelope metadata found in `headers`.
pub(crate) fn envelope<C>(headers: &HeaderMap, command: C) -> Result<CommandEnvelope<C>, ApiError> {
    let mut envelope = CommandEnvelope::new(command);
    if let Some(key) = uuid_header(headers, IDEMPOTENCY_KEY_HEADER)? {
        envelope = envelope.with_idempotency_key(key);
    }
    if let Some(correlation_id) = uuid_header(headers, CORRELATION_ID_HEADER)? {
        envelope = envelope.with_correlation_id(correlation_id);
    }
    Ok(envelope)
}

fn uuid_header(headers: &HeaderMap, name: &str) -> Result<Option<Uuid>, ApiError> {
    headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .ok()
                .and_then(|raw| raw.parse().ok())
                .ok_or_else(|| ApiError::BadRequest(format!("{name} must be a UUID")))
        })
        .transpose()
}
