//! Stream naming.
//!
//! Every entity owns exactly one stream named `<prefix>-<uuid>`, for example
//! `member-6f1c...` or `secretsanta-09ab...`. The name never changes, even
//! after the entity is deleted or cancelled.

use uuid::Uuid;

/// Builds the stream identifier for an entity.
#[must_use]
pub fn stream_id(prefix: &str, id: Uuid) -> String {
    format!("{prefix}-{id}")
}

/// Extracts the entity id from a stream name, or `None` when the name does
/// not belong to `prefix` or carries a malformed id.
#[must_use]
pub fn parse_stream_id(prefix: &str, stream: &str) -> Option<Uuid> {
    let rest = stream.strip_prefix(prefix)?.strip_prefix('-')?;
    Uuid::parse_str(rest).ok()
}

/// System streams (projections, indexes) are never part of a domain.
#[must_use]
pub fn is_system_stream(stream: &str) -> bool {
    stream.starts_with('$')
}
