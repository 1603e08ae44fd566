//! Commands for the Members context.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use giftplanner_core::command::Command;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::aggregates::{GiftPriority, RelationshipType};

/// Reason recorded when a delete or removal does not name one.
pub const DEFAULT_REMOVAL_REASON: &str = "User deleted";

fn default_reason() -> String {
    DEFAULT_REMOVAL_REASON.to_owned()
}

/// Command to create a new member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMember {
    /// The member to create.
    pub member_id: Uuid,
    /// Display name; must not be blank.
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Command to change member details. Unset fields stay unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMember {
    pub member_id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Command to delete a member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteMember {
    pub member_id: Uuid,
    #[serde(default = "default_reason")]
    pub reason: String,
}

/// Command to add a gift to a member's wishlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddGift {
    pub member_id: Uuid,
    pub gift_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Price in minor currency units; must not be negative.
    #[serde(default)]
    pub price_cents: Option<i64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub priority: GiftPriority,
}

/// Command to change gift details. Unset fields stay unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateGift {
    pub member_id: Uuid,
    pub gift_id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price_cents: Option<i64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub priority: Option<GiftPriority>,
}

/// Command to claim a gift on behalf of another member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakeGift {
    pub member_id: Uuid,
    pub gift_id: Uuid,
    pub taken_by: Uuid,
}

/// Command to give back a claimed gift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseGift {
    pub member_id: Uuid,
    pub gift_id: Uuid,
    pub released_by: Uuid,
}

/// Command to remove a gift from the wishlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveGift {
    pub member_id: Uuid,
    pub gift_id: Uuid,
    #[serde(default = "default_reason")]
    pub reason: String,
}

/// Command to assign new sort positions to gifts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderGifts {
    pub member_id: Uuid,
    /// Gift id to new position. Gifts not listed keep their position.
    pub orders: BTreeMap<Uuid, i32>,
}

/// Command to relate this member to another one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddRelationship {
    pub member_id: Uuid,
    pub relationship_id: Uuid,
    pub to_member_id: Uuid,
    pub relationship_type: RelationshipType,
}

/// Command to change a relationship's type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRelationship {
    pub member_id: Uuid,
    pub relationship_id: Uuid,
    pub new_type: RelationshipType,
}

/// Command to drop a relationship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveRelationship {
    pub member_id: Uuid,
    pub relationship_id: Uuid,
}

/// Command to set or replace the member's PIN.
#[derive(Clone, Serialize, Deserialize)]
pub struct SetPinCode {
    pub member_id: Uuid,
    /// Plain PIN, 4 to 8 ASCII digits. Never persisted.
    pub pin_code: String,
}

impl std::fmt::Debug for SetPinCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetPinCode")
            .field("member_id", &self.member_id)
            .field("pin_code", &"<redacted>")
            .finish()
    }
}

/// Every command the member actor accepts.
#[derive(Debug, Clone)]
pub enum MemberCommand {
    CreateMember(CreateMember),
    UpdateMember(UpdateMember),
    DeleteMember(DeleteMember),
    AddGift(AddGift),
    UpdateGift(UpdateGift),
    TakeGift(TakeGift),
    ReleaseGift(ReleaseGift),
    RemoveGift(RemoveGift),
    ReorderGifts(ReorderGifts),
    AddRelationship(AddRelationship),
    UpdateRelationship(UpdateRelationship),
    RemoveRelationship(RemoveRelationship),
    SetPinCode(SetPinCode),
}

impl Command for MemberCommand {
    fn command_type(&self) -> &'static str {
        match self {
            Self::CreateMember(_) => "member.create",
            Self::UpdateMember(_) => "member.update",
            Self::DeleteMember(_) => "member.delete",
            Self::AddGift(_) => "member.add_gift",
            Self::UpdateGift(_) => "member.update_gift",
            Self::TakeGift(_) => "member.take_gift",
            Self::ReleaseGift(_) => "member.release_gift",
            Self::RemoveGift(_) => "member.remove_gift",
            Self::ReorderGifts(_) => "member.reorder_gifts",
            Self::AddRelationship(_) => "member.add_relationship",
            Self::UpdateRelationship(_) => "member.update_relationship",
            Self::RemoveRelationship(_) => "member.remove_relationship",
            Self::SetPinCode(_) => "member.set_pin_code",
        }
    }

    fn target_id(&self) -> Uuid {
        match self {
            Self::CreateMember(c) => c.member_id,
            Self::UpdateMember(c) => c.member_id,
            Self::DeleteMember(c) => c.member_id,
            Self::AddGift(c) => c.member_id,
            Self::UpdateGift(c) => c.member_id,
            Self::TakeGift(c) => c.member_id,
            Self::ReleaseGift(c) => c.member_id,
            Self::RemoveGift(c) => c.member_id,
            Self::ReorderGifts(c) => c.member_id,
            Self::AddRelationship(c) => c.member_id,
            Self::UpdateRelationship(c) => c.member_id,
            Self::RemoveRelationship(c) => c.member_id,
            Self::SetPinCode(c) => c.member_id,
        }
    }
}
