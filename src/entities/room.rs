//! Room entity - An assignable guest room.
//!
//! `held_by_reservation_id` is the claim column: a room can be held by at most one
//! reservation, and claims are taken with a conditional update.

use super::sea_orm_active_enums::{HousekeepingStatus, OperationalStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Room database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    /// Unique identifier for the room
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Property the room is in
    pub property_id: i64,
    /// Room type used for matching reservations
    pub room_type_id: i64,
    /// Room number shown to staff and guests
    pub number: String,
    /// Operational status
    pub status: OperationalStatus,
    /// Housekeeping status
    pub housekeeping: HousekeepingStatus,
    /// Reservation currently holding the room
    pub held_by_reservation_id: Option<i64>,
}

/// Rooms are referenced by id only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
