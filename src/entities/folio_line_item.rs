//! Folio line item entity - One posting on a folio.
//!
//! Line items are append-only: corrections are new postings with the opposite sign.

use super::sea_orm_active_enums::LineItemType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Folio line item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "folio_line_items")]
pub struct Model {
    /// Unique identifier for the line item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Folio this item is posted to
    pub folio_id: i64,
    /// Business date of the posting
    pub posted_on: Date,
    /// Human-readable description
    pub description: String,
    /// Signed amount (positive = charge, negative = payment)
    pub amount: i64,
    /// Kind of posting
    pub item_type: LineItemType,
    /// When the posting was written
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `FolioLineItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line item belongs to one folio
    #[sea_orm(
        belongs_to = "super::folio::Entity",
        from = "Column::FolioId",
        to = "super::folio::Column::Id"
    )]
    Folio,
}

impl Related<super::folio::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Folio.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
