//! Room inventory endpoints.

use super::{
    AppState,
    extract::{Json, Path, Query},
};
use crate::{
    core::{
        context::RequestContext,
        page::{Page, PageRequest},
        room::{self, NewRoom},
    },
    entities::{HousekeepingStatus, OperationalStatus, room::Model as RoomModel},
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{post, put},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct HousekeepingUpdate {
    housekeeping: HousekeepingStatus,
}

#[derive(Debug, Deserialize)]
struct StatusUpdate {
    status: OperationalStatus,
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    page: Option<u64>,
    limit: Option<u64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", post(create).get(list))
        .route("/rooms/{id}/housekeeping", put(set_housekeeping))
        .route("/rooms/{id}/status", put(set_status))
}

async fn create(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<NewRoom>,
) -> Result<(StatusCode, Json<RoomModel>)> {
    let created = room::create_room(&*state.db, &ctx, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<RoomModel>>> {
    let defaults = PageRequest::default();
    let request = PageRequest {
        page: query.page.unwrap_or(defaults.page),
        limit: query.limit.unwrap_or(defaults.limit),
    };
    room::list_rooms(&*state.db, &ctx, request).await.map(Json)
}

async fn set_housekeeping(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(body): Json<HousekeepingUpdate>,
) -> Result<Json<RoomModel>> {
    room::set_housekeeping_status(&*state.db, &ctx, id, body.housekeeping)
        .await
        .map(Json)
}

async fn set_status(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<RoomModel>> {
    room::set_room_status(&*state.db, &ctx, id, body.status)
        .await
        .map(Json)
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
    async fn test_room_inventory_over_http() -> Result<()> {
        let db = setup_test_db().await?;
        let app = test_app(db);

        for number in ["102", "101"] {
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/v1/rooms",
                Some(json!({ "room_type_id": TEST_ROOM_TYPE_ID, "number": number })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, page) = send(&app, Method::GET, "/api/v1/rooms", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["total"], 2);
        assert_eq!(page["data"][0]["number"], "101");

        let id = page["data"][0]["id"].as_i64().unwrap();
        let (status, room) = send(
            &app,
            Method::PUT,
            &format!("/api/v1/rooms/{id}/housekeeping"),
            Some(json!({ "housekeeping": "inspected" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(room["housekeeping"], "inspected");

        let (status, room) = send(
            &app,
            Method::PUT,
            &format!("/api/v1/rooms/{id}/status"),
            Some(json!({ "status": "maintenance" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(room["status"], "maintenance");
        Ok(())
    }

    #[tokio::test]
    async fn test_assign_without_rooms_is_conflict() -> Result<()> {
        let (db, _plan, reservation) = setup_with_reservation().await?;
        let app = test_app(db);
        send(
            &app,
            Method::POST,
            &format!("/api/v1/reservations/{}/confirm", reservation.id),
            None,
        )
        .await;

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/reservations/{}/assign-room", reservation.id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "RESOURCE_UNAVAILABLE");
        Ok(())
    }
}
