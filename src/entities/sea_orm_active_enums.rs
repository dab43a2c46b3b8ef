//! Status and category enums shared by several entities.
//!
//! Stored as short strings so the same schema works on `SQLite` and `PostgreSQL`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a reservation
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Booked but not yet confirmed
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Confirmed, awaiting arrival
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    /// Guest is in house
    #[sea_orm(string_value = "checked_in")]
    CheckedIn,
    /// Guest has left and the folio is settled
    #[sea_orm(string_value = "checked_out")]
    CheckedOut,
    /// Cancelled before or during the stay
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// Guest never arrived
    #[sea_orm(string_value = "no_show")]
    NoShow,
}

/// Where a booking came from
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum BookingChannel {
    /// Online travel agency
    #[sea_orm(string_value = "ota")]
    Ota,
    /// Direct booking site
    #[sea_orm(string_value = "website")]
    Website,
    /// Walk-in at the front desk
    #[sea_orm(string_value = "walkin")]
    Walkin,
    /// Telephone booking
    #[sea_orm(string_value = "phone")]
    Phone,
}

/// Kind of folio line item
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum LineItemType {
    /// Room or fee charge
    #[sea_orm(string_value = "charge")]
    Charge,
    /// Money received (negative) or returned (positive)
    #[sea_orm(string_value = "payment")]
    Payment,
    /// Property service such as laundry or minibar
    #[sea_orm(string_value = "service")]
    Service,
    /// Tax on a service
    #[sea_orm(string_value = "tax")]
    Tax,
}

/// How a payment was made
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash at the desk
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Credit or debit card
    #[sea_orm(string_value = "card")]
    Card,
    /// Bank transfer
    #[sea_orm(string_value = "bank")]
    Bank,
    /// Mobile wallet
    #[sea_orm(string_value = "ewallet")]
    Ewallet,
}

/// Settlement state of a payment
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Funds reserved, nothing posted to the folio yet
    #[sea_orm(string_value = "authorized")]
    Authorized,
    /// Funds taken and posted to the folio
    #[sea_orm(string_value = "captured")]
    Captured,
    /// Captured funds returned to the guest
    #[sea_orm(string_value = "refunded")]
    Refunded,
    /// Authorization released without capture
    #[sea_orm(string_value = "voided")]
    Voided,
}

/// Whether a room or table is physically usable
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum OperationalStatus {
    /// Free to assign
    #[sea_orm(string_value = "available")]
    Available,
    /// Guest in the room or at the table
    #[sea_orm(string_value = "occupied")]
    Occupied,
    /// Out of order
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
}

/// Cleanliness of a room or table
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum HousekeepingStatus {
    /// Needs cleaning
    #[sea_orm(string_value = "dirty")]
    Dirty,
    /// Cleaned, not yet inspected
    #[sea_orm(string_value = "clean")]
    Clean,
    /// Cleaned and inspected
    #[sea_orm(string_value = "inspected")]
    Inspected,
}

/// Lifecycle of a restaurant table booking
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TableBookingStatus {
    /// Waiting for the party
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Party is at the table
    #[sea_orm(string_value = "seated")]
    Seated,
    /// Party has left
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Booking cancelled
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}
