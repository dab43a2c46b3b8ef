//! Table booking entity - A restaurant reservation for a party.

use super::sea_orm_active_enums::TableBookingStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Table booking database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "table_bookings")]
pub struct Model {
    /// Unique identifier for the booking
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Property the restaurant belongs to
    pub property_id: i64,
    /// Name the booking is under
    pub guest_name: String,
    /// Number of diners
    pub party_size: i32,
    /// Requested seating time
    pub booked_for: DateTimeUtc,
    /// Current status
    pub status: TableBookingStatus,
    /// Table claimed for the party
    pub assigned_table_id: Option<i64>,
    /// When the booking was created
    pub created_at: DateTimeUtc,
}

/// Table bookings are referenced by id only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
