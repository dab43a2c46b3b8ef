//! Staff, attendance and overtime endpoints.

use super::{
    AppState,
    extract::{Json, Path, Query},
};
use crate::{
    core::{
        context::RequestContext,
        hr::{self, NewAttendance, NewEmployee, NewOvertime, NewWorkingShift, OvertimeSummary},
    },
    entities::{
        attendance::Model as AttendanceModel, employee::Model as EmployeeModel,
        overtime::Model as OvertimeModel, working_shift::Model as WorkingShiftModel,
    },
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CheckOutRequest {
    check_out_time: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
struct SummaryQuery {
    from: NaiveDate,
    to: NaiveDate,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/employees", post(create_employee))
        .route("/employees/{id}/overtime", get(overtime_summary))
        .route("/shifts", post(create_shift))
        .route("/attendance", post(record_attendance))
        .route("/attendance/bulk", post(bulk_attendance))
        .route("/attendance/{id}/check-out", post(check_out))
        .route("/overtime", post(record_overtime))
}

async fn create_employee(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<NewEmployee>,
) -> Result<(StatusCode, Json<EmployeeModel>)> {
    let employee = hr::create_employee(&*state.db, &ctx, body).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

async fn create_shift(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<NewWorkingShift>,
) -> Result<(StatusCode, Json<WorkingShiftModel>)> {
    let shift = hr::create_working_shift(&*state.db, &ctx, body).await?;
    Ok((StatusCode::CREATED, Json(shift)))
}

async fn record_attendance(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<NewAttendance>,
) -> Result<(StatusCode, Json<AttendanceModel>)> {
    let record = hr::record_attendance(&*state.db, &ctx, body).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn bulk_attendance(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<Vec<NewAttendance>>,
) -> Result<(StatusCode, Json<Vec<AttendanceModel>>)> {
    let records = hr::bulk_record_attendance(&*state.db, &ctx, body).await?;
    Ok((StatusCode::CREATED, Json(records)))
}

async fn check_out(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(body): Json<CheckOutRequest>,
) -> Result<Json<AttendanceModel>> {
    hr::check_out_attendance(&*state.db, &ctx, id, body.check_out_time)
        .await
        .map(Json)
}

async fn record_overtime(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<NewOvertime>,
) -> Result<(StatusCode, Json<OvertimeModel>)> {
    let entry = hr::record_overtime(&*state.db, &ctx, body).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn overtime_summary(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(employee_id): Path<i64>,
    Query(range): Query<SummaryQuery>,
) -> Result<Json<OvertimeSummary>> {
    hr::overtime_summary(&*state.db, &ctx, employee_id, range.from, range.to)
        .await
        .map(Json)
}
