//! Domain events for the Members context.
//!
//! Every event carries only the fields it changes. `None` in an update
//! event means "leave as is".

use chrono::NaiveDate;
use giftplanner_core::event::EventKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::aggregates::{GiftPriority, RelationshipType};

/// Emitted when a member is created, or re-created after deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberCreated {
    /// The member identifier.
    pub member_id: Uuid,
    /// Display name.
    pub name: String,
    /// Contact address.
    #[serde(default)]
    pub email: Option<String>,
    /// Birth date.
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Emitted when member details change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberUpdated {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Emitted when a member is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDeleted {
    pub reason: String,
}

/// Emitted when a gift is added to the wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftAdded {
    pub gift_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Price in minor currency units.
    #[serde(default)]
    pub price_cents: Option<i64>,
    #[serde(default)]
    pub url: Option<String>,
    pub priority: GiftPriority,
    /// Position assigned at creation; later changed by `GiftsReordered`.
    pub sort_order: i32,
}

/// Emitted when gift details change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftUpdated {
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

/// Emitted when someone claims a gift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftTaken {
    pub gift_id: Uuid,
    pub taken_by: Uuid,
}

/// Emitted when a claimed gift becomes available again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftReleased {
    pub gift_id: Uuid,
    pub released_by: Uuid,
}

/// Emitted when a gift is taken off the wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftRemoved {
    pub gift_id: Uuid,
    pub reason: String,
}

/// New position of one gift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftOrder {
    pub gift_id: Uuid,
    pub sort_order: i32,
}

/// Emitted when the wishlist is reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftsReordered {
    pub orders: Vec<GiftOrder>,
}

/// Emitted when a relationship to another member is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipAdded {
    pub relationship_id: Uuid,
    pub to_member_id: Uuid,
    pub relationship_type: RelationshipType,
}

/// Emitted when a relationship changes type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipUpdated {
    pub relationship_id: Uuid,
    pub new_type: RelationshipType,
}

/// Emitted when a relationship is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRemoved {
    pub relationship_id: Uuid,
    pub to_member_id: Uuid,
}

/// Emitted when a PIN is set. Only the digest is ever stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinCodeSet {
    pub pin_hash: String,
}

/// Event payload variants for the Members context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberEventKind {
    MemberCreated(MemberCreated),
    MemberUpdated(MemberUpdated),
    MemberDeleted(MemberDeleted),
    GiftAdded(GiftAdded),
    GiftUpdated(GiftUpdated),
    GiftTaken(GiftTaken),
    GiftReleased(GiftReleased),
    GiftRemoved(GiftRemoved),
    GiftsReordered(GiftsReordered),
    RelationshipAdded(RelationshipAdded),
    RelationshipUpdated(RelationshipUpdated),
    RelationshipRemoved(RelationshipRemoved),
    PinCodeSet(PinCodeSet),
}

impl EventKind for MemberEventKind {
    fn event_type(&self) -> &'static str {
        match self {
            Self::MemberCreated(_) => "member.created",
            Self::MemberUpdated(_) => "member.updated",
            Self::MemberDeleted(_) => "member.deleted",
            Self::GiftAdded(_) => "member.gift_added",
            Self::GiftUpdated(_) => "member.gift_updated",
            Self::GiftTaken(_) => "member.gift_taken",
            Self::GiftReleased(_) => "member.gift_released",
            Self::GiftRemoved(_) => "member.gift_removed",
            Self::GiftsReordered(_) => "member.gifts_reordered",
            Self::RelationshipAdded(_) => "member.relationship_added",
            Self::RelationshipUpdated(_) => "member.relationship_updated",
            Self::RelationshipRemoved(_) => "member.relationship_removed",
            Self::PinCodeSet(_) => "member.pin_code_set",
        }
    }
}
