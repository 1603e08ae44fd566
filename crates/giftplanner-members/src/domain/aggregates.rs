//! Aggregate root for the Members context.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use giftplanner_core::aggregate::{Accepted, AggregateRoot};
use giftplanner_core::command::CommandFailure;
use giftplanner_core::event::Event;
use giftplanner_core::rng::DeterministicRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::commands::{
    AddGift, AddRelationship, CreateMember, MemberCommand, ReleaseGift, ReorderGifts, TakeGift,
    UpdateGift, UpdateMember,
};
use super::events::{
    GiftAdded, GiftOrder, GiftReleased, GiftRemoved, GiftTaken, GiftUpdated, GiftsReordered,
    MemberCreated, MemberDeleted, MemberEventKind, MemberUpdated, PinCodeSet, RelationshipAdded,
    RelationshipRemoved, RelationshipUpdated,
};
use super::pin;
use super::views::MemberView;

/// How much the member wants a gift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GiftPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// Whether someone has claimed a gift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GiftStatus {
    #[default]
    Available,
    Taken,
}

/// Kind of link between two members, read "this member is ... of target".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    ChildOf,
    PartnerOf,
}

/// A wishlist entry.
///
/// `taken_by` and `taken_at` are both set exactly when `status` is
/// [`GiftStatus::Taken`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gift {
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
    /// Removed gifts stay in the mapping but are hidden from every view.
    pub is_removed: bool,
}

/// A directed link from this member to another one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: Uuid,
    pub to_member_id: Uuid,
    pub relationship_type: RelationshipType,
    pub created_at: DateTime<Utc>,
    pub is_removed: bool,
}

/// The aggregate root for one family member.
///
/// Only [`AggregateRoot::apply`] writes these fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberAggregate {
    /// `None` until the first `MemberCreated` is folded.
    pub(crate) id: Option<Uuid>,
    pub(crate) name: String,
    pub(crate) email: Option<String>,
    pub(crate) date_of_birth: Option<NaiveDate>,
    pub(crate) notes: Option<String>,
    pub(crate) is_deleted: bool,
    pub(crate) created_at: Option<DateTime<Utc>>,
    pub(crate) updated_at: Option<DateTime<Utc>>,
    pub(crate) pin_hash: Option<String>,
    pub(crate) gifts: HashMap<Uuid, Gift>,
    pub(crate) relationships: HashMap<Uuid, Relationship>,
    pub(crate) version: i64,
}

impl MemberAggregate {
    /// `true` once created and not deleted.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.id.is_some() && !self.is_deleted
    }

    /// Checks `pin` against the stored digest. `false` when no PIN is set.
    #[must_use]
    pub fn verify_pin(&self, candidate: &str) -> bool {
        self.pin_hash
            .as_deref()
            .is_some_and(|stored| pin::verify(stored, candidate))
    }

    /// A gift that has not been removed.
    #[must_use]
    pub fn gift(&self, gift_id: Uuid) -> Option<&Gift> {
        self.gifts.get(&gift_id).filter(|gift| !gift.is_removed)
    }

    /// A relationship that has not been removed.
    #[must_use]
    pub fn relationship(&self, relationship_id: Uuid) -> Option<&Relationship> {
        self.relationships
            .get(&relationship_id)
            .filter(|relationship| !relationship.is_removed)
    }

    fn require_live(&self, member_id: Uuid) -> Result<(), CommandFailure> {
        if self.is_live() {
            Ok(())
        } else {
            Err(CommandFailure::not_found(format!("Member {member_id} not found")))
        }
    }

    fn require_gift(&self, gift_id: Uuid) -> Result<&Gift, CommandFailure> {
        self.gift(gift_id)
            .ok_or_else(|| CommandFailure::child_not_found(format!("Gift {gift_id} not found")))
    }

    fn require_relationship(&self, relationship_id: Uuid) -> Result<&Relationship, CommandFailure> {
        self.relationship(relationship_id).ok_or_else(|| {
            CommandFailure::child_not_found(format!("Relationship {relationship_id} not found"))
        })
    }

    fn next_sort_order(&self) -> i32 {
        self.gifts
            .values()
            .filter(|gift| !gift.is_removed)
            .map(|gift| gift.sort_order.saturating_add(1))
            .max()
            .unwrap_or(0)
    }

    fn handle_create(&self, cmd: CreateMember) -> Result<Accepted<MemberEventKind>, CommandFailure> {
        if self.is_live() {
            return Err(CommandFailure::already_exists(format!(
                "Member {} already exists",
                cmd.member_id
            )));
        }
        require_name(&cmd.name)?;
        Ok(Accepted::new(
            MemberEventKind::MemberCreated(MemberCreated {
                member_id: cmd.member_id,
                name: cmd.name,
                email: cmd.email,
                date_of_birth: cmd.date_of_birth,
                notes: cmd.notes,
            }),
            "Member created successfully",
        ))
    }

    fn handle_update(&self, cmd: UpdateMember) -> Result<Accepted<MemberEventKind>, CommandFailure> {
        self.require_live(cmd.member_id)?;
        if let Some(name) = &cmd.name {
            require_name(name)?;
        }
        Ok(Accepted::new(
            MemberEventKind::MemberUpdated(MemberUpdated {
                name: cmd.name,
                email: cmd.email,
                date_of_birth: cmd.date_of_birth,
                notes: cmd.notes,
            }),
            "Member updated successfully",
        ))
    }

    fn handle_add_gift(&self, cmd: AddGift) -> Result<Accepted<MemberEventKind>, CommandFailure> {
        self.require_live(cmd.member_id)?;
        if self.gifts.contains_key(&cmd.gift_id) {
            return Err(CommandFailure::already_exists(format!(
                "Gift {} already exists",
                cmd.gift_id
            )));
        }
        require_name(&cmd.name)?;
        require_price(cmd.price_cents)?;
        Ok(Accepted::new(
            MemberEventKind::GiftAdded(GiftAdded {
                gift_id: cmd.gift_id,
                name: cmd.name,
                description: cmd.description,
                price_cents: cmd.price_cents,
                url: cmd.url,
                priority: cmd.priority,
                sort_order: self.next_sort_order(),
            }),
            "Gift added successfully",
        ))
    }

    fn handle_update_gift(&self, cmd: UpdateGift) -> Result<Accepted<MemberEventKind>, CommandFailure> {
        self.require_live(cmd.member_id)?;
        self.require_gift(cmd.gift_id)?;
        if let Some(name) = &cmd.name {
            require_name(name)?;
        }
        require_price(cmd.price_cents)?;
        Ok(Accepted::new(
            MemberEventKind::GiftUpdated(GiftUpdated {
                gift_id: cmd.gift_id,
                name: cmd.name,
                description: cmd.description,
                price_cents: cmd.price_cents,
                url: cmd.url,
                priority: cmd.priority,
            }),
            "Gift updated successfully",
        ))
    }

    fn handle_take_gift(&self, cmd: TakeGift) -> Result<Accepted<MemberEventKind>, CommandFailure> {
        self.require_live(cmd.member_id)?;
        let gift = self.require_gift(cmd.gift_id)?;
        if gift.status == GiftStatus::Taken {
            return Err(CommandFailure::invalid_state(format!(
                "Gift {} is already taken",
                cmd.gift_id
            )));
        }
        Ok(Accepted::new(
            MemberEventKind::GiftTaken(GiftTaken {
                gift_id: cmd.gift_id,
                taken_by: cmd.taken_by,
            }),
            "Gift taken successfully",
        ))
    }

    fn handle_release_gift(&self, cmd: ReleaseGift) -> Result<Accepted<MemberEventKind>, CommandFailure> {
        self.require_live(cmd.member_id)?;
        let gift = self.require_gift(cmd.gift_id)?;
        if gift.status == GiftStatus::Available {
            return Err(CommandFailure::invalid_state(format!(
                "Gift {} is not taken",
                cmd.gift_id
            )));
        }
        Ok(Accepted::new(
            MemberEventKind::GiftReleased(GiftReleased {
                gift_id: cmd.gift_id,
                released_by: cmd.released_by,
            }),
            "Gift released successfully",
        ))
    }

    fn handle_reorder(&self, cmd: ReorderGifts) -> Result<Accepted<MemberEventKind>, CommandFailure> {
        self.require_live(cmd.member_id)?;
        if cmd.orders.is_empty() {
            return Err(CommandFailure::invalid_input("No gift orders given"));
        }
        for gift_id in cmd.orders.keys() {
            self.require_gift(*gift_id)?;
        }
        let orders = cmd
            .orders
            .into_iter()
            .map(|(gift_id, sort_order)| GiftOrder { gift_id, sort_order })
            .collect();
        Ok(Accepted::new(
            MemberEventKind::GiftsReordered(GiftsReordered { orders }),
            "Gifts reordered successfully",
        ))
    }

    fn handle_add_relationship(
        &self,
        cmd: AddRelationship,
    ) -> Result<Accepted<MemberEventKind>, CommandFailure> {
        self.require_live(cmd.member_id)?;
        if self.relationships.contains_key(&cmd.relationship_id) {
            return Err(CommandFailure::already_exists(format!(
                "Relationship {} already exists",
                cmd.relationship_id
            )));
        }
        if cmd.to_member_id == cmd.member_id {
            return Err(CommandFailure::invalid_input(
                "A member cannot be related to themself",
            ));
        }
        Ok(Accepted::new(
            MemberEventKind::RelationshipAdded(RelationshipAdded {
                relationship_id: cmd.relationship_id,
                to_member_id: cmd.to_member_id,
                relationship_type: cmd.relationship_type,
            }),
            "Relationship added successfully",
        ))
    }
}

fn require_name(name: &str) -> Result<(), CommandFailure> {
    if name.trim().is_empty() {
        return Err(CommandFailure::invalid_input("Name must not be blank"));
    }
    Ok(())
}

fn require_price(price_cents: Option<i64>) -> Result<(), CommandFailure> {
    if price_cents.is_some_and(|cents| cents < 0) {
        return Err(CommandFailure::invalid_input("Price must not be negative"));
    }
    Ok(())
}

impl AggregateRoot for MemberAggregate {
    type EventKind = MemberEventKind;
    type Command = MemberCommand;
    type View = MemberView;

    const STREAM_PREFIX: &'static str = "member";

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Event<MemberEventKind>) {
        let at = event.metadata.occurred_at;
        match &event.kind {
            MemberEventKind::MemberCreated(payload) => {
                // Re-creation after deletion starts from a clean slate.
                *self = Self {
                    id: Some(payload.member_id),
                    name: payload.name.clone(),
                    email: payload.email.clone(),
                    date_of_birth: payload.date_of_birth,
                    notes: payload.notes.clone(),
                    created_at: Some(at),
                    updated_at: Some(at),
                    ..Self::default()
                };
            }
            MemberEventKind::MemberUpdated(payload) => {
                if let Some(name) = &payload.name {
                    self.name.clone_from(name);
                }
                if let Some(email) = &payload.email {
                    self.email = Some(email.clone());
                }
                if let Some(date_of_birth) = payload.date_of_birth {
                    self.date_of_birth = Some(date_of_birth);
                }
                if let Some(notes) = &payload.notes {
                    self.notes = Some(notes.clone());
                }
                self.updated_at = Some(at);
            }
            MemberEventKind::MemberDeleted(_) => {
                self.is_deleted = true;
                self.updated_at = Some(at);
            }
            MemberEventKind::GiftAdded(payload) => {
                self.gifts.insert(
                    payload.gift_id,
                    Gift {
                        id: payload.gift_id,
                        name: payload.name.clone(),
                        description: payload.description.clone(),
                        price_cents: payload.price_cents,
                        url: payload.url.clone(),
                        status: GiftStatus::Available,
                        taken_by: None,
                        taken_at: None,
                        priority: payload.priority,
                        sort_order: payload.sort_order,
                        created_at: at,
                        updated_at: at,
                        is_removed: false,
                    },
                );
                self.updated_at = Some(at);
            }
            MemberEventKind::GiftUpdated(payload) => {
                if let Some(gift) = self.gifts.get_mut(&payload.gift_id) {
                    if let Some(name) = &payload.name {
                        gift.name.clone_from(name);
                    }
                    if let Some(description) = &payload.description {
                        gift.description = Some(description.clone());
                    }
                    if let Some(price_cents) = payload.price_cents {
                        gift.price_cents = Some(price_cents);
                    }
                    if let Some(url) = &payload.url {
                        gift.url = Some(url.clone());
                    }
                    if let Some(priority) = payload.priority {
                        gift.priority = priority;
                    }
                    gift.updated_at = at;
                }
            }
            MemberEventKind::GiftTaken(payload) => {
                if let Some(gift) = self.gifts.get_mut(&payload.gift_id) {
                    gift.status = GiftStatus::Taken;
                    gift.taken_by = Some(payload.taken_by);
                    gift.taken_at = Some(at);
                    gift.updated_at = at;
                }
            }
            MemberEventKind::GiftReleased(payload) => {
                if let Some(gift) = self.gifts.get_mut(&payload.gift_id) {
                    gift.status = GiftStatus::Available;
                    gift.taken_by = None;
                    gift.taken_at = None;
                    gift.updated_at = at;
                }
            }
            MemberEventKind::GiftRemoved(payload) => {
                if let Some(gift) = self.gifts.get_mut(&payload.gift_id) {
                    gift.is_removed = true;
                    gift.updated_at = at;
                }
            }
            MemberEventKind::GiftsReordered(payload) => {
                for order in &payload.orders {
                    if let Some(gift) = self.gifts.get_mut(&order.gift_id) {
                        gift.sort_order = order.sort_order;
                        gift.updated_at = at;
                    }
                }
            }
            MemberEventKind::RelationshipAdded(payload) => {
                self.relationships.insert(
                    payload.relationship_id,
                    Relationship {
                        id: payload.relationship_id,
                        to_member_id: payload.to_member_id,
                        relationship_type: payload.relationship_type,
                        created_at: at,
                        is_removed: false,
                    },
                );
            }
            MemberEventKind::RelationshipUpdated(payload) => {
                if let Some(relationship) = self.relationships.get_mut(&payload.relationship_id) {
                    relationship.relationship_type = payload.new_type;
                }
            }
            MemberEventKind::RelationshipRemoved(payload) => {
                if let Some(relationship) = self.relationships.get_mut(&payload.relationship_id) {
                    relationship.is_removed = true;
                }
            }
            MemberEventKind::PinCodeSet(payload) => {
                self.pin_hash = Some(payload.pin_hash.clone());
                self.updated_at = Some(at);
            }
        }
        self.version = event.metadata.sequence_number;
    }

    fn handle(
        &self,
        command: MemberCommand,
        _rng: &mut dyn DeterministicRng,
    ) -> Result<Accepted<MemberEventKind>, CommandFailure> {
        match command {
            MemberCommand::CreateMember(cmd) => self.handle_create(cmd),
            MemberCommand::UpdateMember(cmd) => self.handle_update(cmd),
            MemberCommand::DeleteMember(cmd) => {
                self.require_live(cmd.member_id)?;
                Ok(Accepted::new(
                    MemberEventKind::MemberDeleted(MemberDeleted { reason: cmd.reason }),
                    "Member deleted successfully",
                ))
            }
            MemberCommand::AddGift(cmd) => self.handle_add_gift(cmd),
            MemberCommand::UpdateGift(cmd) => self.handle_update_gift(cmd),
            MemberCommand::TakeGift(cmd) => self.handle_take_gift(cmd),
            MemberCommand::ReleaseGift(cmd) => self.handle_release_gift(cmd),
            MemberCommand::RemoveGift(cmd) => {
                self.require_live(cmd.member_id)?;
                self.require_gift(cmd.gift_id)?;
                Ok(Accepted::new(
                    MemberEventKind::GiftRemoved(GiftRemoved {
                        gift_id: cmd.gift_id,
                        reason: cmd.reason,
                    }),
                    "Gift removed successfully",
                ))
            }
            MemberCommand::ReorderGifts(cmd) => self.handle_reorder(cmd),
            MemberCommand::AddRelationship(cmd) => self.handle_add_relationship(cmd),
            MemberCommand::UpdateRelationship(cmd) => {
                self.require_live(cmd.member_id)?;
                self.require_relationship(cmd.relationship_id)?;
                Ok(Accepted::new(
                    MemberEventKind::RelationshipUpdated(RelationshipUpdated {
                        relationship_id: cmd.relationship_id,
                        new_type: cmd.new_type,
                    }),
                    "Relationship updated successfully",
                ))
            }
            MemberCommand::RemoveRelationship(cmd) => {
                self.require_live(cmd.member_id)?;
                let relationship = self.require_relationship(cmd.relationship_id)?;
                Ok(Accepted::new(
                    MemberEventKind::RelationshipRemoved(RelationshipRemoved {
                        relationship_id: cmd.relationship_id,
                        to_member_id: relationship.to_member_id,
                    }),
                    "Relationship removed successfully",
                ))
            }
            MemberCommand::SetPinCode(cmd) => {
                self.require_live(cmd.member_id)?;
                pin::validate(&cmd.pin_code)?;
                Ok(Accepted::new(
                    MemberEventKind::PinCodeSet(PinCodeSet {
                        pin_hash: pin::hash(&cmd.pin_code),
                    }),
                    "PIN code set successfully",
                ))
            }
        }
    }

    fn to_view(&self) -> Option<MemberView> {
        self.id.map(|id| MemberView::from_aggregate(id, self))
    }
}
