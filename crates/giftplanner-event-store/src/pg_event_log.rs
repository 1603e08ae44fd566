//! `PostgreSQL` implementation of the `EventLog` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use giftplanner_core::error::DomainError;
use giftplanner_core::event_log::{AppendOutcome, EventLog, NewEvent, StoredEvent};

use crate::schema::CREATE_EVENTS_TABLE;

type EventRow = (Uuid, String, String, serde_json::Value, i64, Uuid, DateTime<Utc>);

/// PostgreSQL-backed event log.
#[derive(Debug, Clone)]
pub struct PgEventLog {
    pool: PgPool,
}

impl PgEventLog {
    /// Creates a new `PgEventLog`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `domain_events` table and its indexes if missing.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the DDL fails.
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        sqlx::raw_sql(CREATE_EVENTS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(())
    }
}

fn infrastructure(err: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(err.to_string())
}

fn to_stored(row: EventRow) -> StoredEvent {
    let (event_id, stream_id, event_type, payload, sequence_number, correlation_id, occurred_at) =
        row;
    StoredEvent {
        event_id,
        stream_id,
        event_type,
        payload,
        sequence_number,
        correlation_id,
        occurred_at,
    }
}

#[async_trait]
impl EventLog for PgEventLog {
    async fn append(&self, stream_id: &str, event: NewEvent) -> Result<AppendOutcome, DomainError> {
        let mut tx = self.pool.begin().await.map_err(infrastructure)?;

        // Serializes writers of the same stream for the rest of the transaction.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(stream_id)
            .execute(&mut *tx)
            .await
            .map_err(infrastructure)?;

        let existing: Option<(i64,)> = sqlx::query_as(
            "SELECT sequence_number FROM domain_events WHERE stream_id = $1 AND event_id = $2",
        )
        .bind(stream_id)
        .bind(event.event_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(infrastructure)?;

        if let Some((sequence_number,)) = existing {
            tx.commit().await.map_err(infrastructure)?;
            tracing::debug!(
                stream_id,
                event_id = %event.event_id,
                sequence_number,
                "duplicate append ignored"
            );
            return Ok(AppendOutcome::Duplicate(sequence_number));
        }

        let (sequence_number,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(sequence_number), 0) + 1 FROM domain_events WHERE stream_id = $1",
        )
        .bind(stream_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(infrastructure)?;

        sqlx::query(
            "INSERT INTO domain_events \
             (event_id, stream_id, event_type, payload, sequence_number, correlation_id, occurred_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(event.event_id)
        .bind(stream_id)
        .bind(&event.event_type)
        .bind(&event.payload)
        .bind(sequence_number)
        .bind(event.correlation_id)
        .bind(event.occurred_at)
        .execute(&mut *tx)
        .await
        .map_err(infrastructure)?;

        tx.commit().await.map_err(infrastructure)?;
        Ok(AppendOutcome::Appended(sequence_number))
    }

    async fn read(&self, stream_id: &str) -> Result<Vec<StoredEvent>, DomainError> {
        let rows: Vec<EventRow> = sqlx::query_as(
            "SELECT event_id, stream_id, event_type, payload, sequence_number, correlation_id, occurred_at \
             FROM domain_events WHERE stream_id = $1 ORDER BY sequence_number ASC",
        )
        .bind(stream_id)
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(rows.into_iter().map(to_stored).collect())
    }

    async fn list_stream_ids(&self, prefix: &str) -> Result<Vec<String>, DomainError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT stream_id FROM domain_events \
             WHERE starts_with(stream_id, $1) AND NOT starts_with(stream_id, '$') \
             ORDER BY stream_id",
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(rows.into_iter().map(|(stream_id,)| stream_id).collect())
    }
}
