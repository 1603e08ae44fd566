//! Read models returned by member queries.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::aggregates::{
    Gift, GiftPriority, GiftStatus, MemberAggregate, Relationship, RelationshipType,
};
use super::pin;

/// Snapshot of a member, its live gifts and live relationships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberView {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub notes: Option<String>,
    pub is_deleted: bool,
    pub has_pin: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Ordered by `sort_order`, then creation time.
    pub gifts: Vec<GiftView>,
    /// Ordered by creation time.
    pub relationships: Vec<RelationshipView>,
    pub version: i64,
    #[serde(skip)]
    pin_hash: Option<String>,
}

impl MemberView {
    pub(crate) fn from_aggregate(id: Uuid, member: &MemberAggregate) -> Self {
        let mut gifts: Vec<GiftView> = member
            .gifts
            .values()
            .filter(|gift| !gift.is_removed)
            .map(GiftView::from)
            .collect();
        gifts.sort_by(|a, b| {
            (a.sort_order, a.created_at, a.id).cmp(&(b.sort_order, b.created_at, b.id))
        });

        let mut relationships: Vec<RelationshipView> = member
            .relationships
            .values()
            .filter(|relationship| !relationship.is_removed)
            .map(RelationshipView::from)
            .collect();
        relationships.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));

        Self {
            id,
            name: member.name.clone(),
            email: member.email.clone(),
            date_of_birth: member.date_of_birth,
            notes: member.notes.clone(),
            is_deleted: member.is_deleted,
            has_pin: member.pin_hash.is_some(),
            created_at: member.created_at,
            updated_at: member.updated_at,
            gifts,
            relationships,
            version: member.version,
            pin_hash: member.pin_hash.clone(),
        }
    }

    /// Checks a candidate PIN against the digest captured in this snapshot.
    #[must_use]
    pub fn verify_pin(&self, candidate: &str) -> bool {
        self.pin_hash
            .as_deref()
            .is_some_and(|stored| pin::verify(stored, candidate))
    }
}

/// One wishlist entry as shown to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GiftView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub url: Option<String>,
    pub status: GiftStatus,
    pub taken_by: Option<Uuid>,
    pub taken_at: Option<DateTime<Utc>>,
    pub priority: GiftPriority,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Gift> for GiftView {
    fn from(gift: &Gift) -> Self {
        Self {
            id: gift.id,
            name: gift.name.clone(),
            description: gift.description.clone(),
            price_cents: gift.price_cents,
            url: gift.url.clone(),
            status: gift.status,
            taken_by: gift.taken_by,
            taken_at: gift.taken_at,
            priority: gift.priority,
            sort_order: gift.sort_order,
            created_at: gift.created_at,
            updated_at: gift.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipView {
    pub id: Uuid,
    pub to_member_id: Uuid,
    pub relationship_type: RelationshipType,
    pub created_at: DateTime<Utc>,
}

impl From<&Relationship> for RelationshipView {
    fn from(relationship: &Relationship) -> Self {
        Self {
            id: relationship.id,
            to_member_id: relationship.to_member_id,
            relationship_type: relationship.relationship_type,
            created_at: relationship.created_at,
        }
    }
}
