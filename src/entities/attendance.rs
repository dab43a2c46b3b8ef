//! Attendance entity - One employee's presence on one work date.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Attendance database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attendance")]
pub struct Model {
    /// Unique identifier for the record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Employee the record belongs to
    pub employee_id: i64,
    /// Shift worked, if scheduled
    pub working_shift_id: Option<i64>,
    /// Business date
    pub work_date: Date,
    /// Clock-in time
    pub check_in_time: DateTime,
    /// Clock-out time, None while still on shift
    pub check_out_time: Option<DateTime>,
    /// Hours between clock-in and clock-out, rounded to two decimals
    pub hours_worked: Option<f64>,
}

/// Defines relationships between Attendance and other entities
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
