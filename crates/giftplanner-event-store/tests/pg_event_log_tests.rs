//! Integration tests for `PgEventLog`.
//!
//! These need a running PostgreSQL reachable through `DATABASE_URL`; run
//! them with `cargo test -- --ignored`.

use chrono::{SubsecRound, Utc};
use giftplanner_core::event_log::{AppendOutcome, EventLog, NewEvent};
use giftplanner_event_store::pg_event_log::PgEventLog;
use sqlx::PgPool;
use uuid::Uuid;

/// Helper to build a `NewEvent` with sensible defaults.
fn make_new_event() -> NewEvent {
    NewEvent {
        event_id: Uuid::new_v4(),
        event_type: "TestEvent".to_string(),
        payload: serde_json::json!({"key": "value"}),
        correlation_id: Uuid::new_v4(),
        // PostgreSQL stores microseconds.
        occurred_at: Utc::now().trunc_subsecs(6),
    }
}

// --- read ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_read_returns_empty_vec_for_nonexistent_stream(pool: PgPool) {
    let log = PgEventLog::new(pool);

    let events = log.read(&format!("member-{}", Uuid::new_v4())).await.unwrap();

    assert!(events.is_empty());
}

// --- append + read round-trip ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_append_and_read_single_event(pool: PgPool) {
    let log = PgEventLog::new(pool);
    let stream = format!("member-{}", Uuid::new_v4());
    let event = make_new_event();
    let expected = event.clone();

    let outcome = log.append(&stream, event).await.unwrap();

    assert_eq!(outcome, AppendOutcome::Appended(1));
    let loaded = log.read(&stream).await.unwrap();
    assert_eq!(loaded.len(), 1);
    let e = &loaded[0];
    assert_eq!(e.event_id, expected.event_id);
    assert_eq!(e.stream_id, stream);
    assert_eq!(e.event_type, expected.event_type);
    assert_eq!(e.payload, expected.payload);
    assert_eq!(e.sequence_number, 1);
    assert_eq!(e.correlation_id, expected.correlation_id);
    assert_eq!(e.occurred_at, expected.occurred_at);
}

// --- ordering ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_append_multiple_events_preserves_sequence_order(pool: PgPool) {
    let log = PgEventLog::new(pool);
    let stream = format!("member-{}", Uuid::new_v4());

    for _ in 0..3 {
        log.append(&stream, make_new_event()).await.unwrap();
    }

    let loaded = log.read(&stream).await.unwrap();
    let sequences: Vec<i64> = loaded.iter().map(|e| e.sequence_number).collect();
    assert_eq!(sequences, vec![1, 2, 3]);
}

// --- idempotency ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_event_id_is_not_stored_twice(pool: PgPool) {
    let log = PgEventLog::new(pool);
    let stream = format!("member-{}", Uuid::new_v4());
    let event = make_new_event();

    let first = log.append(&stream, event.clone()).await.unwrap();
    let second = log.append(&stream, event).await.unwrap();

    assert_eq!(first, AppendOutcome::Appended(1));
    assert_eq!(second, AppendOutcome::Duplicate(1));
    assert_eq!(log.read(&stream).await.unwrap().len(), 1);
}

// --- concurrency ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_appends_get_distinct_sequence_numbers(pool: PgPool) {
    let log = PgEventLog::new(pool);
    let stream = format!("member-{}", Uuid::new_v4());

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let log = log.clone();
            let stream = stream.clone();
            tokio::spawn(async move { log.append(&stream, make_new_event()).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let loaded = log.read(&stream).await.unwrap();
    let sequences: Vec<i64> = loaded.iter().map(|e| e.sequence_number).collect();
    assert_eq!(sequences, (1..=8).collect::<Vec<i64>>());
}

// --- listing ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_list_stream_ids_filters_by_prefix(pool: PgPool) {
    let log = PgEventLog::new(pool);
    let member = format!("member-{}", Uuid::new_v4());
    let raffle = format!("secretsanta-{}", Uuid::new_v4());
    log.append(&member, make_new_event()).await.unwrap();
    log.append(&raffle, make_new_event()).await.unwrap();
    log.append("$projection", make_new_event()).await.unwrap();

    let members = log.list_stream_ids("member-").await.unwrap();
    let raffles = log.list_stream_ids("secretsanta-").await.unwrap();
    let all = log.list_stream_ids("").await.unwrap();

    assert_eq!(members, vec![member]);
    assert_eq!(raffles, vec![raffle]);
    assert_eq!(all.len(), 2);
}

// --- schema bootstrap ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_ensure_schema_is_idempotent(pool: PgPool) {
    let log = PgEventLog::new(pool);

    log.ensure_schema().await.unwrap();
    log.ensure_schema().await.unwrap();
}
