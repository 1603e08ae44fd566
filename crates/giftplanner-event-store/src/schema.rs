//! Event store database schema.

/// SQL to create the events table.
///
/// `(stream_id, event_id)` is the idempotency key; `(stream_id,
/// sequence_number)` guarantees a single writer per position.
pub const CREATE_EVENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS domain_events (
    event_id        UUID NOT NULL,
    stream_id       TEXT NOT NULL,
    event_type      VARCHAR(255) NOT NULL,
    payload         JSONB NOT NULL,
    sequence_number BIGINT NOT NULL,
    correlation_id  UUID NOT NULL,
    occurred_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (stream_id, event_id),
    UNIQUE (stream_id, sequence_number)
);

CREATE INDEX IF NOT EXISTS idx_domain_events_correlation_id
    ON domain_events (correlation_id);
";
