//! Payment endpoints.

use super::{
    AppState,
    extract::{Json, Path},
};
use crate::{
    core::{
        context::RequestContext,
        payment::{self, NewPayment},
    },
    entities::payment::Model as PaymentModel,
    errors::Result,
};
use axum::{Router, extract::State, http::StatusCode, routing::post};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reservations/{id}/payments", post(record).get(list))
        .route("/payments/{id}/capture", post(capture))
        .route("/payments/{id}/void", post(void))
        .route("/payments/{id}/refund", post(refund))
}

async fn record(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(reservation_id): Path<i64>,
    Json(body): Json<NewPayment>,
) -> Result<(StatusCode, Json<PaymentModel>)> {
    let created =
        payment::record_payment(&*state.db, &ctx, &*state.clock, reservation_id, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(reservation_id): Path<i64>,
) -> Result<Json<Vec<PaymentModel>>> {
    payment::list_payments(&*state.db, &ctx, reservation_id)
        .await
        .map(Json)
}

async fn capture(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<Json<PaymentModel>> {
    payment::capture_payment(&*state.db, &ctx, &*state.clock, id)
        .await
        .map(Json)
}

async fn void(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<Json<PaymentModel>> {
    payment::void_payment(&*state.db, &ctx, &*state.clock, id)
        .await
        .map(Json)
}

async fn refund(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<Json<PaymentModel>> {
    payment::refund_payment(&*state.db, &ctx, &*state.clock, id)
        .await
        .map(Json)
}
