//! Working shift entity - A named shift template (e.g., "Morning 06:00-14:00").

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Working shift database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "working_shifts")]
pub struct Model {
    /// Unique identifier for the shift
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Property the shift belongs to
    pub property_id: i64,
    /// Shift name
    pub name: String,
    /// Scheduled start
    pub start_time: Time,
    /// Scheduled end (may be earlier than start for overnight shifts)
    pub end_time: Time,
}

/// Shifts are referenced by id only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
