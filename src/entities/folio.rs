//! Folio entity - The running account of one reservation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Folio database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "folios")]
pub struct Model {
    /// Unique identifier for the folio
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning reservation (exactly one folio per reservation)
    #[sea_orm(unique)]
    pub reservation_id: i64,
    /// Once true, no further line items may be posted
    pub locked: bool,
    /// When the folio was locked
    pub locked_at: Option<DateTimeUtc>,
}

/// Defines relationships between Folio and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each folio belongs to one reservation
    #[sea_orm(
        belongs_to = "super::reservation::Entity",
        from = "Column::ReservationId",
        to = "super::reservation::Column::Id"
    )]
    Reservation,
    /// One folio has many line items
    #[sea_orm(has_many = "super::folio_line_item::Entity")]
    LineItems,
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservation.def()
    }
}

impl Related<super::folio_line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
