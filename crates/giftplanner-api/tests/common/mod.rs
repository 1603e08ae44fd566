//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use giftplanner_actors::{Supervisor, SupervisorConfig};
use giftplanner_core::clock::Clock;
use giftplanner_core::event_log::EventLog;
use giftplanner_core::rng::{DeterministicRng, StdRandom};
use giftplanner_event_store::InMemoryEventLog;
use giftplanner_members::application::service::MemberService;
use giftplanner_secret_santa::application::service::RaffleService;
use giftplanner_test_support::FixedClock;
use http_body_util::BodyExt;
use tower::ServiceExt;

use giftplanner_api::state::AppState;

/// Build the full app router over an in-memory event log with a fixed clock
/// and a seeded raffle draw. Uses the same route structure as `main.rs`.
pub fn build_test_app() -> Router {
    build_test_app_over(Arc::new(InMemoryEventLog::new()))
}

/// Same as [`build_test_app`] over a caller-provided log, e.g. to simulate a
/// restart against existing history.
pub fn build_test_app_over(log: Arc<dyn EventLog>) -> Router {
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::default());
    let config = SupervisorConfig::default();
    let members = MemberService::new(Arc::new(Supervisor::new(
        Arc::clone(&log),
        Arc::clone(&clock),
        config,
    )));
    let raffles = RaffleService::new(Arc::new(Supervisor::with_rng_factory(
        log,
        clock,
        config,
        Arc::new(|| Box::new(StdRandom::seeded(1225)) as Box<dyn DeterministicRng>),
    )));
    giftplanner_api::app(AppState::from_services(members, raffles))
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, post_request(uri, body, &[])).await
}

/// Send a POST request with extra headers.
pub async fn post_json_with_headers(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
    headers: &[(&str, &str)],
) -> (StatusCode, serde_json::Value) {
    send(app, post_request(uri, body, headers)).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

fn post_request(uri: &str, body: &serde_json::Value, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
