//! HTTP transport for the family gift planner.
//!
//! Routes translate JSON requests into member and raffle commands, hand them
//! to the entity supervisors and map the outcome to a status code.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Builds the full application router without transport layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/members", routes::members::router())
        .nest("/api/v1/raffles", routes::raffles::router())
        .with_state(state)
}
