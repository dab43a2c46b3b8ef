//! Reservation entity - A guest's stay at one property.
//!
//! `total_amount` and `amount_paid` mirror the folio: the folio balance must always
//! equal `total_amount - amount_paid`. Both are whole currency units.

use super::sea_orm_active_enums::{BookingChannel, ReservationStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reservation database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    /// Unique identifier for the reservation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Property the reservation belongs to
    pub property_id: i64,
    /// Guest who made the booking
    pub guest_id: i64,
    /// Requested room type
    pub room_type_id: i64,
    /// Rate plan the price and cancellation terms come from
    pub rate_plan_id: i64,
    /// Room claimed for this stay, None until assigned
    pub assigned_room_id: Option<i64>,
    /// Arrival date
    pub check_in: Date,
    /// Departure date, always after `check_in`
    pub check_out: Date,
    /// Current lifecycle status
    pub status: ReservationStatus,
    /// Sum of all charges on the folio
    pub total_amount: i64,
    /// Sum of all payments net of refunds
    pub amount_paid: i64,
    /// ISO currency code, e.g. `"VND"`
    pub currency: String,
    /// Booking channel
    pub channel: BookingChannel,
    /// Human-readable confirmation code
    #[sea_orm(unique)]
    pub confirmation_code: String,
    /// When the reservation was created
    pub created_at: DateTimeUtc,
    /// When the reservation was last modified
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Amount still owed by the guest according to the reservation totals.
    #[must_use]
    pub const fn balance_due(&self) -> i64 {
        self.total_amount - self.amount_paid
    }
}

/// Defines relationships between Reservation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One reservation has one folio
    #[sea_orm(has_one = "super::folio::Entity")]
    Folio,
    /// One reservation has many payments
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::folio::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Folio.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
