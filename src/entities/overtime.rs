//! Overtime entity - Extra hours paid at a rate.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Overtime database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "overtime")]
pub struct Model {
    /// Unique identifier for the record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Employee the overtime belongs to
    pub employee_id: i64,
    /// Business date
    pub work_date: Date,
    /// Overtime hours
    pub number_of_hours: f64,
    /// Rate per hour in whole currency units
    pub rate: i64,
    /// `number_of_hours * rate`, rounded
    pub amount: i64,
}

/// Defines relationships between Overtime and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each record belongs to one employee
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
