//! Routes for the Secret Santa bounded context.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use giftplanner_core::command::Command;
use giftplanner_secret_santa::domain::commands::{
    CancelRaffle, CreateRaffle, DEFAULT_CANCEL_REASON, ExecuteRaffle, RaffleCommand,
};
use giftplanner_secret_santa::domain::views::RaffleView;

use super::{CommandResponse, envelope};
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct CreateRaffleRequest {
    pub raffle_id: Option<Uuid>,
    pub name: String,
    pub participant_ids: Vec<Uuid>,
    pub budget_cents: Option<i64>,
    pub created_by: Uuid,
    pub year: i32,
}

/// Request body for POST /{raffle_id}/cancel.
#[derive(Debug, Deserialize)]
pub struct CancelRaffleRequest {
    pub reason: Option<String>,
    pub cancelled_by: Uuid,
}

/// Query string for GET /. Filters combine.
#[derive(Debug, Default, Deserialize)]
pub struct RaffleFilter {
    /// Uncancelled raffles of this year.
    pub year: Option<i32>,
    /// Drawn, uncancelled raffles this member takes part in.
    pub member_id: Option<Uuid>,
}

/// Response body for GET /{raffle_id}/assignments/{member_id}.
#[derive(Debug, Serialize)]
pub struct AssignmentResponse {
    pub giver: Uuid,
    pub receiver: Uuid,
}

/// Response body for POST /{raffle_id}/reset.
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub reset: bool,
}

async fn dispatch(
    state: &AppState,
    headers: &HeaderMap,
    raffle_id: Uuid,
    command: RaffleCommand,
) -> Result<Json<CommandResponse>, ApiError> {
    let envelope = envelope(headers, command)?;
    info!(
        correlation_id = %envelope.correlation_id,
        command_type = envelope.command.command_type(),
        "handling raffle command"
    );
    let success = state.raffles.execute(envelope).await?;
    Ok(Json(CommandResponse::new(raffle_id, success)))
}

/// GET /
#[instrument(skip(state))]
async fn list_raffles(
    State(state): State<AppState>,
    Query(filter): Query<RaffleFilter>,
) -> Result<Json<Vec<RaffleView>>, ApiError> {
    let mut raffles = match (filter.year, filter.member_id) {
        (_, Some(member_id)) => state.raffles.raffles_for_member(member_id).await?,
        (Some(year), None) => state.raffles.raffles_by_year(year).await?,
        (None, None) => state.raffles.list_raffles().await?,
    };
    if let (Some(year), Some(_)) = (filter.year, filter.member_id) {
        raffles.retain(|raffle| raffle.year == year);
    }
    Ok(Json(raffles))
}

/// GET /{raffle_id}
#[instrument(skip(state))]
async fn get_raffle(
    State(state): State<AppState>,
    Path(raffle_id): Path<Uuid>,
) -> Result<Json<RaffleView>, ApiError> {
    state
        .raffles
        .get_raffle(raffle_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Raffle {raffle_id} not found")))
}

/// GET /{raffle_id}/assignments/{member_id}
#[instrument(skip(state))]
async fn get_assignment(
    State(state): State<AppState>,
    Path((raffle_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    state
        .raffles
        .assignment_for(raffle_id, member_id)
        .await?
        .map(|receiver| {
            Json(AssignmentResponse {
                giver: member_id,
                receiver,
            })
        })
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "No standing assignment for member {member_id} in raffle {raffle_id}"
            ))
        })
}

/// POST /
#[instrument(skip(state, headers, request))]
async fn create_raffle(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateRaffleRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let raffle_id = request.raffle_id.unwrap_or_else(Uuid::new_v4);
    let command = RaffleCommand::CreateRaffle(CreateRaffle {
        raffle_id,
        name: request.name,
        participant_ids: request.participant_ids,
        budget_cents: request.budget_cents,
        created_by: request.created_by,
        year: request.year,
    });
    dispatch(&state, &headers, raffle_id, command).await
}

/// POST /{raffle_id}/execute
#[instrument(skip(state, headers))]
async fn execute_raffle(
    State(state): State<AppState>,
    Path(raffle_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = RaffleCommand::ExecuteRaffle(ExecuteRaffle { raffle_id });
    dispatch(&state, &headers, raffle_id, command).await
}

/// POST /{raffle_id}/cancel
#[instrument(skip(state, headers, request))]
async fn cancel_raffle(
    State(state): State<AppState>,
    Path(raffle_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<CancelRaffleRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = RaffleCommand::CancelRaffle(CancelRaffle {
        raffle_id,
        reason: request
            .reason
            .unwrap_or_else(|| DEFAULT_CANCEL_REASON.to_owned()),
        cancelled_by: request.cancelled_by,
    });
    dispatch(&state, &headers, raffle_id, command).await
}

/// POST /{raffle_id}/reset
#[instrument(skip(state))]
async fn reset_raffle(
    State(state): State<AppState>,
    Path(raffle_id): Path<Uuid>,
) -> Json<ResetResponse> {
    let reset = state.raffles.supervisor().reset(raffle_id).await;
    Json(ResetResponse { reset })
}

/// Returns the router for the raffles context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_raffles).post(create_raffle))
        .route("/{raffle_id}", get(get_raffle))
        .route("/{raffle_id}/execute", post(execute_raffle))
        .route("/{raffle_id}/cancel", post(cancel_raffle))
        .route("/{raffle_id}/reset", post(reset_raffle))
        .route("/{raffle_id}/assignments/{member_id}", get(get_assignment))
}
