//! Rate plan entity - Nightly price plus cancellation terms.
//!
//! The four cancellation columns form a `CancellationPolicy` (see `core::policy`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Rate plan database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rate_plans")]
pub struct Model {
    /// Unique identifier for the rate plan
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Property offering the plan
    pub property_id: i64,
    /// Display name (e.g., "Best Available Rate", "Non-refundable")
    pub name: String,
    /// Price per night in whole currency units
    pub nightly_rate: i64,
    /// Hours before arrival up to which cancellation is free
    pub free_until_hours: i32,
    /// Fee percent when cancelling inside the free window
    pub early_fee_percent: i32,
    /// Fee percent when cancelling after the free window closes
    pub late_fee_percent: i32,
    /// Fee percent charged for a no-show
    pub no_show_fee_percent: i32,
    /// When the plan was created
    pub created_at: DateTimeUtc,
}

/// `RatePlan` is referenced by id only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
