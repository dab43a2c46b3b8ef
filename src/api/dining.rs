//! Restaurant tables and table bookings.

use super::{
    AppState,
    extract::{Json, Path, Query},
};
use crate::{
    core::{
        context::RequestContext,
        dining::{self, NewTable, NewTableBooking, TableAssignment},
    },
    entities::{
        restaurant_table::Model as RestaurantTableModel, table_booking::Model as TableBookingModel,
    },
    errors::{Error, Result},
};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct AssignQuery {
    #[serde(default)]
    override_maintenance: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tables", post(create_table).get(list_tables))
        .route("/table-bookings", post(create_booking))
        .route("/table-bookings/{id}", get(show_booking))
        .route("/table-bookings/{id}/assign-table", post(assign_table))
        .route("/table-bookings/{id}/seat", post(seat))
        .route("/table-bookings/{id}/complete", post(complete))
        .route("/table-bookings/{id}/cancel", post(cancel))
}

async fn create_table(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<NewTable>,
) -> Result<(StatusCode, Json<RestaurantTableModel>)> {
    let table = dining::create_table(&*state.db, &ctx, body).await?;
    Ok((StatusCode::CREATED, Json(table)))
}

async fn list_tables(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<Vec<RestaurantTableModel>>> {
    dining::list_tables(&*state.db, &ctx).await.map(Json)
}

async fn create_booking(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<NewTableBooking>,
) -> Result<(StatusCode, Json<TableBookingModel>)> {
    let booking = dining::create_table_booking(&*state.db, &ctx, &*state.clock, body).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn show_booking(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<Json<TableBookingModel>> {
    dining::get_table_booking(&*state.db, &ctx, id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::not_found("table booking", id))
}

async fn assign_table(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    Query(query): Query<AssignQuery>,
) -> Result<Json<TableAssignment>> {
    dining::assign_table(&*state.db, &ctx, id, query.override_maintenance)
        .await
        .map(Json)
}

async fn seat(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<Json<TableBookingModel>> {
    dining::seat_booking(&*state.db, &ctx, id).await.map(Json)
}

async fn complete(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<Json<TableBookingModel>> {
    dining::complete_booking(&*state.db, &ctx, id).await.map(Json)
}

async fn cancel(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<Json<TableBookingModel>> {
    dining::cancel_booking(&*state.db, &ctx, id).await.map(Json)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::{
        api::test_support::{send, test_app},
        errors::Result,
        test_utils::*,
    };
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_table_booking_flow() -> Result<()> {
        let db = setup_test_db().await?;
        let app = test_app(db);

        for (name, capacity) in [("T6", 6), ("T2", 2), ("T4", 4)] {
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/v1/tables",
                Some(json!({ "name": name, "capacity": capacity })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, booking) = send(
            &app,
            Method::POST,
            "/api/v1/table-bookings",
            Some(json!({
                "guest_name": "Nguyen",
                "party_size": 3,
                "booked_for": "2025-06-01T19:00:00Z",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = booking["id"].as_i64().unwrap();

        let (status, assignment) = send(
            &app,
            Method::POST,
            &format!("/api/v1/table-bookings/{id}/assign-table"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(assignment["table"]["name"], "T4");

        let (status, seated) = send(
            &app,
            Method::POST,
            &format!("/api/v1/table-bookings/{id}/seat"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(seated["status"], "seated");

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/table-bookings/{id}/cancel"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "INVALID_TRANSITION");

        let (status, completed) = send(
            &app,
            Method::POST,
            &format!("/api/v1/table-bookings/{id}/complete"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(completed["status"], "completed");

        let (_, tables) = send(&app, Method::GET, "/api/v1/tables", None).await;
        assert_eq!(tables[1]["name"], "T4");
        assert_eq!(tables[1]["housekeeping"], "dirty");
        assert_eq!(tables[1]["held_by_booking_id"], serde_json::Value::Null);
        Ok(())
    }
}
