//! Property service entity - Chargeable extras (laundry, spa, airport transfer).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Property service database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "property_services")]
pub struct Model {
    /// Unique identifier for the service
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Property offering the service
    pub property_id: i64,
    /// Service name
    pub name: String,
    /// Unit price before tax
    pub price: i64,
    /// Tax rate as a whole percent
    pub tax_rate_percent: i32,
}

/// Services are referenced by id only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
