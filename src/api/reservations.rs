//! Reservation lifecycle and folio endpoints.

use super::{
    AppState,
    extract::{Json, Path, Query},
};
use crate::{
    core::{
        context::RequestContext,
        finance::CancellationAction,
        folio::{self, FolioStatement, ServicePosting},
        page::{Page, PageRequest},
        reservation::{
            self, CancellationOutcome, CancellationPreview, NewReservation, ReservationDetail,
            RoomAssignment,
        },
    },
    entities::{ReservationStatus, reservation::Model as ReservationModel},
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
struct ListQuery {
    status: Option<ReservationStatus>,
    page: Option<u64>,
    limit: Option<u64>,
}

impl ListQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            limit: self.limit.unwrap_or(defaults.limit),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct AssignQuery {
    #[serde(default)]
    override_maintenance: bool,
}

#[derive(Debug, Deserialize)]
struct QuoteQuery {
    #[serde(default = "default_action")]
    action: CancellationAction,
}

const fn default_action() -> CancellationAction {
    CancellationAction::Cancel
}

#[derive(Debug, Deserialize)]
struct ServiceChargeRequest {
    service_id: i64,
    #[serde(default = "default_quantity")]
    quantity: i64,
}

const fn default_quantity() -> i64 {
    1
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reservations", post(create).get(list))
        .route("/reservations/{id}", get(show))
        .route("/reservations/{id}/confirm", post(confirm))
        .route("/reservations/{id}/assign-room", post(assign_room))
        .route("/reservations/{id}/check-in", post(check_in))
        .route("/reservations/{id}/check-out", post(check_out))
        .route("/reservations/{id}/cancel", post(cancel))
        .route("/reservations/{id}/no-show", post(no_show))
        .route("/reservations/{id}/cancellation-quote", get(quote))
        .route("/reservations/{id}/folio", get(folio_statement))
        .route("/reservations/{id}/folio/services", post(post_service))
}

async fn create(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<NewReservation>,
) -> Result<(StatusCode, Json<ReservationModel>)> {
    let created = reservation::create_reservation(
        &*state.db,
        &ctx,
        &*state.clock,
        &state.config.reservations,
        body,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<ReservationModel>>> {
    let page =
        reservation::list_reservations(&*state.db, &ctx, query.status, query.page_request()).await?;
    Ok(Json(page))
}

async fn show(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<Json<ReservationDetail>> {
    reservation::get_reservation(&*state.db, &ctx, id)
        .await?
        .map(|found| Json(ReservationDetail::from(found)))
        .ok_or_else(|| Error::not_found("reservation", id))
}

async fn confirm(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<Json<ReservationModel>> {
    reservation::confirm_reservation(&*state.db, &ctx, &*state.clock, id)
        .await
        .map(Json)
}

async fn assign_room(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    Query(query): Query<AssignQuery>,
) -> Result<Json<RoomAssignment>> {
    reservation::assign_room(
        &*state.db,
        &ctx,
        &*state.clock,
        id,
        query.override_maintenance,
    )
    .await
    .map(Json)
}

async fn check_in(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<Json<ReservationModel>> {
    reservation::check_in_reservation(&*state.db, &ctx, &*state.clock, id)
        .await
        .map(Json)
}

async fn check_out(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<Json<ReservationModel>> {
    reservation::check_out_reservation(&*state.db, &ctx, &*state.clock, id)
        .await
        .map(Json)
}

async fn cancel(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<Json<CancellationOutcome>> {
    reservation::cancel_reservation(&*state.db, &ctx, &*state.clock, &state.config, id)
        .await
        .map(Json)
}

async fn no_show(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<Json<CancellationOutcome>> {
    reservation::mark_no_show(&*state.db, &ctx, &*state.clock, &state.config, id)
        .await
        .map(Json)
}

async fn quote(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<CancellationPreview>> {
    reservation::quote_cancellation(
        &*state.db,
        &ctx,
        &*state.clock,
        &state.config,
        id,
        query.action,
    )
    .await
    .map(Json)
}

async fn folio_statement(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<Json<FolioStatement>> {
    folio::folio_statement(&*state.db, &ctx, id).await.map(Json)
}

async fn post_service(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(body): Json<ServiceChargeRequest>,
) -> Result<(StatusCode, Json<ServicePosting>)> {
    let posting = folio::post_service_charge(
        &*state.db,
        &ctx,
        &*state.clock,
        id,
        body.service_id,
        body.quantity,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(posting)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::{
        api::{
            context::PROPERTY_HEADER,
            test_support::{send, test_app},
        },
        errors::Result,
        test_utils::*,
    };
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn booking(rate_plan_id: i64) -> Value {
        json!({
            "guest_id": 500,
            "room_type_id": TEST_ROOM_TYPE_ID,
            "rate_plan_id": rate_plan_id,
            "check_in": "2025-06-10",
            "check_out": "2025-06-12",
            "channel": "website",
        })
    }

    #[tokio::test]
    async fn test_create_and_fetch_reservation() -> Result<()> {
        let db = setup_test_db().await?;
        let plan = create_test_rate_plan(&db).await?;
        let app = test_app(db);

        let (status, created) =
            send(&app, Method::POST, "/api/v1/reservations", Some(booking(plan.id))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "pending");
        assert_eq!(created["total_amount"], 2 * TEST_NIGHTLY_RATE);
        assert_eq!(created["confirmation_code"], "HD-000001");

        let id = created["id"].as_i64().unwrap();
        let (status, fetched) =
            send(&app, Method::GET, &format!("/api/v1/reservations/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["id"], id);
        assert_eq!(fetched["status"], "pending");
        assert_eq!(fetched["allowed_events"], json!(["confirm"]));

        let (status, body) = send(&app, Method::GET, "/api/v1/reservations/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_property_header_is_bad_request() -> Result<()> {
        let db = setup_test_db().await?;
        let app = test_app(db);

        let request = Request::builder()
            .uri("/api/v1/reservations")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let request = Request::builder()
            .uri("/api/v1/reservations")
            .header(PROPERTY_HEADER, "not-a-number")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_is_paginated_and_filtered() -> Result<()> {
        let db = setup_test_db().await?;
        let plan = create_test_rate_plan(&db).await?;
        let app = test_app(db);
        for _ in 0..3 {
            send(&app, Method::POST, "/api/v1/reservations", Some(booking(plan.id))).await;
        }
        send(&app, Method::POST, "/api/v1/reservations/1/confirm", None).await;

        let (status, page) =
            send(&app, Method::GET, "/api/v1/reservations?page=1&limit=2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["total"], 3);
        assert_eq!(page["totalPages"], 2);
        assert_eq!(page["data"].as_array().unwrap().len(), 2);

        let (_, confirmed) =
            send(&app, Method::GET, "/api/v1/reservations?status=confirmed", None).await;
        assert_eq!(confirmed["total"], 1);
        assert_eq!(confirmed["data"][0]["id"], 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_check_out_with_balance_is_conflict() -> Result<()> {
        let db = setup_test_db().await?;
        let plan = create_test_rate_plan(&db).await?;
        create_test_room(&db, "101", TEST_ROOM_TYPE_ID).await?;
        let app = test_app(db);

        let (_, created) =
            send(&app, Method::POST, "/api/v1/reservations", Some(booking(plan.id))).await;
        let id = created["id"].as_i64().unwrap();
        for step in ["confirm", "assign-room", "check-in"] {
            let (status, _) = send(
                &app,
                Method::POST,
                &format!("/api/v1/reservations/{id}/{step}"),
                None,
            )
            .await;
            assert_eq!(status, StatusCode::OK, "step {step}");
        }

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/reservations/{id}/check-out"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "INVALID_TRANSITION");

        let (status, folio) = send(
            &app,
            Method::GET,
            &format!("/api/v1/reservations/{id}/folio"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(folio["folio"]["locked"], false);
        assert_eq!(folio["balance"]["balance"], 2 * TEST_NIGHTLY_RATE);
        Ok(())
    }

    #[tokio::test]
    async fn test_quote_and_cancel_over_http() -> Result<()> {
        let db = setup_test_db().await?;
        let plan = create_test_rate_plan(&db).await?;
        let app = test_app(db);

        let (_, created) =
            send(&app, Method::POST, "/api/v1/reservations", Some(booking(plan.id))).await;
        let id = created["id"].as_i64().unwrap();
        send(
            &app,
            Method::POST,
            &format!("/api/v1/reservations/{id}/confirm"),
            None,
        )
        .await;

        let (status, preview) = send(
            &app,
            Method::GET,
            &format!("/api/v1/reservations/{id}/cancellation-quote?action=no_show"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(preview["quote"]["fee"], 2 * TEST_NIGHTLY_RATE);

        // The test clock is nine days before arrival, so cancelling is free.
        let (status, outcome) = send(
            &app,
            Method::POST,
            &format!("/api/v1/reservations/{id}/cancel"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(outcome["reservation"]["status"], "cancelled");
        assert_eq!(outcome["quote"]["fee"], 0);

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/reservations/{id}/cancel"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "INVALID_TRANSITION");
        Ok(())
    }

    #[tokio::test]
    async fn test_post_service_to_folio() -> Result<()> {
        let db = setup_test_db().await?;
        let plan = create_test_rate_plan(&db).await?;
        let service = create_test_service(&db, "Laundry", 100_000, 10).await?;
        let app = test_app(db);

        let (_, created) =
            send(&app, Method::POST, "/api/v1/reservations", Some(booking(plan.id))).await;
        let id = created["id"].as_i64().unwrap();

        let (status, posting) = send(
            &app,
            Method::POST,
            &format!("/api/v1/reservations/{id}/folio/services"),
            Some(json!({ "service_id": service.id, "quantity": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(posting["service_item"]["amount"], 200_000);
        assert_eq!(posting["tax_item"]["amount"], 20_000);
        Ok(())
    }
}
