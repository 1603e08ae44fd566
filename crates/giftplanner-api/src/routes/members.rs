//! Routes for the Members bounded context.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use giftplanner_core::command::Command;
use giftplanner_members::domain::aggregates::{GiftPriority, RelationshipType};
use giftplanner_members::domain::commands::{
    self, AddGift, AddRelationship, CreateMember, DeleteMember, MemberCommand, ReleaseGift,
    RemoveGift, RemoveRelationship, ReorderGifts, SetPinCode, TakeGift, UpdateGift,
    UpdateMember, UpdateRelationship,
};
use giftplanner_members::domain::views::MemberView;

use super::{CommandResponse, envelope};
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct CreateMemberRequest {
    /// Optional client-chosen id; generated when absent.
    pub member_id: Option<Uuid>,
    pub name: String,
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Request body for POST /{member_id}/update.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateMemberRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Request body for POST /{member_id}/delete and /remove-gift.
#[derive(Debug, Default, Deserialize)]
pub struct ReasonRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request body for POST /{member_id}/add-gift.
#[derive(Debug, Deserialize)]
pub struct AddGiftRequest {
    pub gift_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub url: Option<String>,
    #[serde(default)]
    pub priority: GiftPriority,
}

/// Request body for POST /{member_id}/update-gift.
#[derive(Debug, Deserialize)]
pub struct UpdateGiftRequest {
    pub gift_id: Uuid,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub url: Option<String>,
    pub priority: Option<GiftPriority>,
}

/// Request body for POST /{member_id}/take-gift.
#[derive(Debug, Deserialize)]
pub struct TakeGiftRequest {
    pub gift_id: Uuid,
    pub taken_by: Uuid,
}

/// Request body for POST /{member_id}/release-gift.
#[derive(Debug, Deserialize)]
pub struct ReleaseGiftRequest {
    pub gift_id: Uuid,
    pub released_by: Uuid,
}

/// Request body for POST /{member_id}/remove-gift.
#[derive(Debug, Deserialize)]
pub struct RemoveGiftRequest {
    pub gift_id: Uuid,
    pub reason: Option<String>,
}

/// Request body for POST /{member_id}/reorder-gifts.
#[derive(Debug, Deserialize)]
pub struct ReorderGiftsRequest {
    pub orders: BTreeMap<Uuid, i32>,
}

/// Request body for POST /{member_id}/add-relationship.
#[derive(Debug, Deserialize)]
pub struct AddRelationshipRequest {
    pub relationship_id: Option<Uuid>,
    pub to_member_id: Uuid,
    pub relationship_type: RelationshipType,
}

/// Request body for POST /{member_id}/update-relationship.
#[derive(Debug, Deserialize)]
pub struct UpdateRelationshipRequest {
    pub relationship_id: Uuid,
    pub new_type: RelationshipType,
}

/// Request body for POST /{member_id}/remove-relationship.
#[derive(Debug, Deserialize)]
pub struct RemoveRelationshipRequest {
    pub relationship_id: Uuid,
}

/// Request body for POST /{member_id}/set-pin and /verify-pin.
#[derive(Deserialize)]
pub struct PinRequest {
    pub pin_code: String,
}

/// Response body for POST /{member_id}/verify-pin.
#[derive(Debug, Serialize)]
pub struct VerifyPinResponse {
    pub valid: bool,
}

/// Response body for POST /{member_id}/reset.
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    /// Whether a live actor was evicted.
    pub reset: bool,
}

async fn dispatch(
    state: &AppState,
    headers: &HeaderMap,
    response_id: Uuid,
    command: MemberCommand,
) -> Result<Json<CommandResponse>, ApiError> {
    let envelope = envelope(headers, command)?;
    info!(
        correlation_id = %envelope.correlation_id,
        command_type = envelope.command.command_type(),
        "handling member command"
    );
    let success = state.members.execute(envelope).await?;
    Ok(Json(CommandResponse::new(response_id, success)))
}

fn reason_or_default(reason: Option<String>) -> String {
    reason.unwrap_or_else(|| commands::DEFAULT_REMOVAL_REASON.to_owned())
}

/// GET /
#[instrument(skip(state))]
async fn list_members(State(state): State<AppState>) -> Result<Json<Vec<MemberView>>, ApiError> {
    Ok(Json(state.members.list_members().await?))
}

/// GET /{member_id}
#[instrument(skip(state))]
async fn get_member(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<MemberView>, ApiError> {
    state
        .members
        .get_member(member_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Member {member_id} not found")))
}

/// POST /
#[instrument(skip(state, headers, request))]
async fn create_member(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateMemberRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let member_id = request.member_id.unwrap_or_else(Uuid::new_v4);
    let command = MemberCommand::CreateMember(CreateMember {
        member_id,
        name: request.name,
        email: request.email,
        date_of_birth: request.date_of_birth,
        notes: request.notes,
    });
    dispatch(&state, &headers, member_id, command).await
}

/// POST /{member_id}/update
#[instrument(skip(state, headers, request))]
async fn update_member(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<UpdateMemberRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = MemberCommand::UpdateMember(UpdateMember {
        member_id,
        name: request.name,
        email: request.email,
        date_of_birth: request.date_of_birth,
        notes: request.notes,
    });
    dispatch(&state, &headers, member_id, command).await
}

/// POST /{member_id}/delete
#[instrument(skip(state, headers, request))]
async fn delete_member(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<ReasonRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = MemberCommand::DeleteMember(DeleteMember {
        member_id,
        reason: reason_or_default(request.reason),
    });
    dispatch(&state, &headers, member_id, command).await
}

/// POST /{member_id}/add-gift
#[instrument(skip(state, headers, request))]
async fn add_gift(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<AddGiftRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let gift_id = request.gift_id.unwrap_or_else(Uuid::new_v4);
    let command = MemberCommand::AddGift(AddGift {
        member_id,
        gift_id,
        name: request.name,
        description: request.description,
        price_cents: request.price_cents,
        url: request.url,
        priority: request.priority,
    });
    dispatch(&state, &headers, gift_id, command).await
}

/// POST /{member_id}/update-gift
#[instrument(skip(state, headers, request))]
async fn update_gift(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<UpdateGiftRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = MemberCommand::UpdateGift(UpdateGift {
        member_id,
        gift_id: request.gift_id,
        name: request.name,
        description: request.description,
        price_cents: request.price_cents,
        url: request.url,
        priority: request.priority,
    });
    dispatch(&state, &headers, request.gift_id, command).await
}

/// POST /{member_id}/take-gift
#[instrument(skip(state, headers, request))]
async fn take_gift(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<TakeGiftRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = MemberCommand::TakeGift(TakeGift {
        member_id,
        gift_id: request.gift_id,
        taken_by: request.taken_by,
    });
    dispatch(&state, &headers, request.gift_id, command).await
}

/// POST /{member_id}/release-gift
#[instrument(skip(state, headers, request))]
async fn release_gift(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<ReleaseGiftRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = MemberCommand::ReleaseGift(ReleaseGift {
        member_id,
        gift_id: request.gift_id,
        released_by: request.released_by,
    });
    dispatch(&state, &headers, request.gift_id, command).await
}

/// POST /{member_id}/remove-gift
#[instrument(skip(state, headers, request))]
async fn remove_gift(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<RemoveGiftRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = MemberCommand::RemoveGift(RemoveGift {
        member_id,
        gift_id: request.gift_id,
        reason: reason_or_default(request.reason),
    });
    dispatch(&state, &headers, request.gift_id, command).await
}

/// POST /{member_id}/reorder-gifts
#[instrument(skip(state, headers, request))]
async fn reorder_gifts(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<ReorderGiftsRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = MemberCommand::ReorderGifts(ReorderGifts {
        member_id,
        orders: request.orders,
    });
    dispatch(&state, &headers, member_id, command).await
}

/// POST /{member_id}/add-relationship
#[instrument(skip(state, headers, request))]
async fn add_relationship(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<AddRelationshipRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let relationship_id = request.relationship_id.unwrap_or_else(Uuid::new_v4);
    let command = MemberCommand::AddRelationship(AddRelationship {
        member_id,
        relationship_id,
        to_member_id: request.to_member_id,
        relationship_type: request.relationship_type,
    });
    dispatch(&state, &headers, relationship_id, command).await
}

/// POST /{member_id}/update-relationship
#[instrument(skip(state, headers, request))]
async fn update_relationship(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<UpdateRelationshipRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = MemberCommand::UpdateRelationship(UpdateRelationship {
        member_id,
        relationship_id: request.relationship_id,
        new_type: request.new_type,
    });
    dispatch(&state, &headers, request.relationship_id, command).await
}

/// POST /{member_id}/remove-relationship
#[instrument(skip(state, headers, request))]
async fn remove_relationship(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<RemoveRelationshipRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = MemberCommand::RemoveRelationship(RemoveRelationship {
        member_id,
        relationship_id: request.relationship_id,
    });
    dispatch(&state, &headers, request.relationship_id, command).await
}

/// POST /{member_id}/set-pin
#[instrument(skip(state, headers, request))]
async fn set_pin(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<PinRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = MemberCommand::SetPinCode(SetPinCode {
        member_id,
        pin_code: request.pin_code,
    });
    dispatch(&state, &headers, member_id, command).await
}

/// POST /{member_id}/verify-pin
#[instrument(skip(state, request))]
async fn verify_pin(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    Json(request): Json<PinRequest>,
) -> Result<Json<VerifyPinResponse>, ApiError> {
    let valid = state.members.verify_pin(member_id, &request.pin_code).await?;
    Ok(Json(VerifyPinResponse { valid }))
}

/// POST /{member_id}/reset
#[instrument(skip(state))]
async fn reset_member(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
) -> Json<ResetResponse> {
    let reset = state.members.supervisor().reset(member_id).await;
    Json(ResetResponse { reset })
}

/// Returns the router for the members context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_members).post(create_member))
        .route("/{member_id}", get(get_member))
        .route("/{member_id}/update", post(update_member))
        .route("/{member_id}/delete", post(delete_member))
        .route("/{member_id}/add-gift", post(add_gift))
        .route("/{member_id}/update-gift", post(update_gift))
        .route("/{member_id}/take-gift", post(take_gift))
        .route("/{member_id}/release-gift", post(release_gift))
        .route("/{member_id}/remove-gift", post(remove_gift))
        .route("/{member_id}/reorder-gifts", post(reorder_gifts))
        .route("/{member_id}/add-relationship", post(add_relationship))
        .route("/{member_id}/update-relationship", post(update_relationship))
        .route("/{member_id}/remove-relationship", post(remove_relationship))
        .route("/{member_id}/set-pin", post(set_pin))
        .route("/{member_id}/verify-pin", post(verify_pin))
        .route("/{member_id}/reset", post(reset_member))
}
