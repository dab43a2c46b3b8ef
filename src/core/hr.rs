//! HR helpers - Employees, shifts, attendance and overtime.
//!
//! Attendance has no property column of its own; it is scoped through the employee.

use crate::{
    core::{context::RequestContext, finance},
    entities::{
        Attendance, Employee, Overtime, WorkingShift, attendance, employee, overtime,
        working_shift,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Input for a new employee
#[derive(Debug, Clone, Deserialize)]
pub struct NewEmployee {
    /// Display name
    pub full_name: String,
    /// Pay per hour, also the default overtime rate
    pub hourly_rate: i64,
}

/// Input for a new working shift
#[derive(Debug, Clone, Deserialize)]
pub struct NewWorkingShift {
    /// Shift label, e.g. "Morning"
    pub name: String,
    /// Scheduled start
    pub start_time: NaiveTime,
    /// May be earlier than `start_time` for overnight shifts
    pub end_time: NaiveTime,
}

/// One attendance record to be created
#[derive(Debug, Clone, Deserialize)]
pub struct NewAttendance {
    /// Employee who attended
    pub employee_id: i64,
    /// Shift worked, if any
    #[serde(default)]
    pub working_shift_id: Option<i64>,
    /// Day the attendance counts towards
    pub work_date: NaiveDate,
    /// Arrival time
    pub check_in_time: NaiveDateTime,
    /// Departure time, filled later by `check_out_attendance` when absent
    #[serde(default)]
    pub check_out_time: Option<NaiveDateTime>,
}

/// Input for an overtime entry
#[derive(Debug, Clone, Deserialize)]
pub struct NewOvertime {
    /// Employee who worked the overtime
    pub employee_id: i64,
    /// Day of the overtime
    pub work_date: NaiveDate,
    /// Hours worked beyond the shift
    pub number_of_hours: f64,
    /// Defaults to the employee's hourly rate
    #[serde(default)]
    pub rate: Option<i64>,
}

/// Overtime totals for one employee over a date range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OvertimeSummary {
    /// Employee summarized
    pub employee_id: i64,
    /// First day of the range, inclusive
    pub from: NaiveDate,
    /// Last day of the range, inclusive
    pub to: NaiveDate,
    /// Sum of hours
    pub total_hours: f64,
    /// Sum of amounts
    pub total_amount: i64,
    /// Entries in the range, by date
    pub entries: Vec<overtime::Model>,
}

/// Creates an employee of the context's property.
pub async fn create_employee(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    new_employee: NewEmployee,
) -> Result<employee::Model> {
    let full_name = new_employee.full_name.trim().to_string();
    if full_name.is_empty() {
        return Err(Error::validation("Employee name cannot be empty"));
    }
    if new_employee.hourly_rate < 0 {
        return Err(Error::validation(format!(
            "Hourly rate cannot be negative: {}",
            new_employee.hourly_rate
        )));
    }

    let employee = employee::ActiveModel {
        property_id: Set(ctx.property_id),
        full_name: Set(full_name),
        hourly_rate: Set(new_employee.hourly_rate),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(
        property_id = ctx.property_id,
        employee_id = employee.id,
        "Employee created"
    );
    Ok(employee)
}

/// Creates a working shift. Overnight shifts are allowed.
pub async fn create_working_shift(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    new_shift: NewWorkingShift,
) -> Result<working_shift::Model> {
    let name = new_shift.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::validation("Shift name cannot be empty"));
    }
    if new_shift.start_time == new_shift.end_time {
        return Err(Error::validation(format!(
            "Shift cannot start and end at the same time ({})",
            new_shift.start_time
        )));
    }

    working_shift::ActiveModel {
        property_id: Set(ctx.property_id),
        name: Set(name),
        start_time: Set(new_shift.start_time),
        end_time: Set(new_shift.end_time),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

async fn require_employee<C>(
    conn: &C,
    ctx: &RequestContext,
    employee_id: i64,
) -> Result<employee::Model>
where
    C: ConnectionTrait,
{
    Employee::find_by_id(employee_id)
        .filter(employee::Column::PropertyId.eq(ctx.property_id))
        .one(conn)
        .await?
        .ok_or_else(|| Error::not_found("employee", employee_id))
}

/// Validates and inserts one attendance record on `conn`.
async fn insert_attendance<C>(
    conn: &C,
    ctx: &RequestContext,
    new_attendance: NewAttendance,
) -> Result<attendance::Model>
where
    C: ConnectionTrait,
{
    require_employee(conn, ctx, new_attendance.employee_id).await?;

    if let Some(shift_id) = new_attendance.working_shift_id {
        WorkingShift::find_by_id(shift_id)
            .filter(working_shift::Column::PropertyId.eq(ctx.property_id))
            .one(conn)
            .await?
            .ok_or_else(|| Error::not_found("working shift", shift_id))?;
    }

    let hours_worked = new_attendance
        .check_out_time
        .map(|check_out| finance::hours_worked(new_attendance.check_in_time, check_out))
        .transpose()?;

    let duplicates = Attendance::find()
        .filter(attendance::Column::EmployeeId.eq(new_attendance.employee_id))
        .filter(attendance::Column::WorkDate.eq(new_attendance.work_date))
        .count(conn)
        .await?;
    if duplicates > 0 {
        return Err(Error::validation(format!(
            "Employee {} already has attendance on {}",
            new_attendance.employee_id, new_attendance.work_date
        )));
    }

    attendance::ActiveModel {
        employee_id: Set(new_attendance.employee_id),
        working_shift_id: Set(new_attendance.working_shift_id),
        work_date: Set(new_attendance.work_date),
        check_in_time: Set(new_attendance.check_in_time),
        check_out_time: Set(new_attendance.check_out_time),
        hours_worked: Set(hours_worked),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(Into::into)
}

/// Records one attendance entry. An employee has at most one entry per work date.
pub async fn record_attendance(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    new_attendance: NewAttendance,
) -> Result<attendance::Model> {
    let record = insert_attendance(db, ctx, new_attendance).await?;
    info!(
        employee_id = record.employee_id,
        work_date = %record.work_date,
        "Attendance recorded"
    );
    Ok(record)
}

/// Records a batch of attendance entries; any invalid entry rejects the whole batch.
pub async fn bulk_record_attendance(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    entries: Vec<NewAttendance>,
) -> Result<Vec<attendance::Model>> {
    if entries.is_empty() {
        return Err(Error::validation("Attendance batch cannot be empty"));
    }

    let txn = db.begin().await?;
    let mut records = Vec::with_capacity(entries.len());
    for entry in entries {
        records.push(insert_attendance(&txn, ctx, entry).await?);
    }
    txn.commit().await?;

    info!(
        property_id = ctx.property_id,
        count = records.len(),
        "Attendance batch recorded"
    );
    Ok(records)
}

/// Closes an open attendance entry and derives the hours worked.
pub async fn check_out_attendance(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    attendance_id: i64,
    check_out_time: NaiveDateTime,
) -> Result<attendance::Model> {
    let record = Attendance::find_by_id(attendance_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("attendance", attendance_id))?;
    match require_employee(db, ctx, record.employee_id).await {
        Ok(_) => {}
        Err(Error::NotFound { .. }) => return Err(Error::not_found("attendance", attendance_id)),
        Err(other) => return Err(other),
    }
    if record.check_out_time.is_some() {
        return Err(Error::InvalidTransition {
            from: "checked_out".to_string(),
            event: "check_out".to_string(),
            reason: format!("attendance {attendance_id} is already closed"),
        });
    }

    let hours = finance::hours_worked(record.check_in_time, check_out_time)?;
    let mut record: attendance::ActiveModel = record.into();
    record.check_out_time = Set(Some(check_out_time));
    record.hours_worked = Set(Some(hours));
    let record = record.update(db).await?;
    info!(attendance_id, hours, "Attendance closed");
    Ok(record)
}

/// Records overtime; `amount = round(hours * rate)`.
pub async fn record_overtime(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    new_overtime: NewOvertime,
) -> Result<overtime::Model> {
    let employee = require_employee(db, ctx, new_overtime.employee_id).await?;
    let rate = new_overtime.rate.unwrap_or(employee.hourly_rate);
    let amount = finance::overtime_amount(new_overtime.number_of_hours, rate)?;

    let entry = overtime::ActiveModel {
        employee_id: Set(employee.id),
        work_date: Set(new_overtime.work_date),
        number_of_hours: Set(new_overtime.number_of_hours),
        rate: Set(rate),
        amount: Set(amount),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(
        employee_id = entry.employee_id,
        hours = entry.number_of_hours,
        amount = entry.amount,
        "Overtime recorded"
    );
    Ok(entry)
}

/// Totals an employee's overtime between two dates, inclusive.
pub async fn overtime_summary(
    db: &DatabaseConnection,
    ctx: &RequestContext,
    employee_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<OvertimeSummary> {
    if to < from {
        return Err(Error::validation(format!(
            "Range end ({to}) is before its start ({from})"
        )));
    }
    require_employee(db, ctx, employee_id).await?;

    let entries = Overtime::find()
        .filter(overtime::Column::EmployeeId.eq(employee_id))
        .filter(overtime::Column::WorkDate.between(from, to))
        .order_by_asc(overtime::Column::WorkDate)
        .all(db)
        .await?;
    let total_hours = entries.iter().map(|e| e.number_of_hours).sum::<f64>();
    let total_amount = entries.iter().map(|e| e.amount).sum();

    Ok(OvertimeSummary {
        employee_id,
        from,
        to,
        total_hours: (total_hours * 100.0).round() / 100.0,
        total_amount,
        entries,
    })
}
