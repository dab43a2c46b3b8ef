//! Restaurant table entity - An assignable dining table.

use super::sea_orm_active_enums::{HousekeepingStatus, OperationalStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Restaurant table database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "restaurant_tables")]
pub struct Model {
    /// Unique identifier for the table
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Property the restaurant belongs to
    pub property_id: i64,
    /// Table label (e.g., "T12", "Terrace 3")
    pub name: String,
    /// Number of seats
    pub capacity: i32,
    /// Operational status
    pub status: OperationalStatus,
    /// Cleanliness status
    pub housekeeping: HousekeepingStatus,
    /// Booking currently holding the table
    pub held_by_booking_id: Option<i64>,
}

/// Tables are referenced by id only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
