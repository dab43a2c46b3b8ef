//! Employee entity - Staff member for attendance and overtime.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Employee database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    /// Unique identifier for the employee
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Property the employee works at
    pub property_id: i64,
    /// Full name
    pub full_name: String,
    /// Default hourly rate used for overtime when none is given
    pub hourly_rate: i64,
}

/// Defines relationships between Employee and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One employee has many attendance records
    #[sea_orm(has_many = "super::attendance::Entity")]
    Attendance,
    /// One employee has many overtime records
    #[sea_orm(has_many = "super::overtime::Entity")]
    Overtime,
}

impl Related<super::attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendance.def()
    }
}

impl Related<super::overtime::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Overtime.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
