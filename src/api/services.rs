//! Property service catalogue endpoints.

use super::{AppState, extract::Json};
use crate::{
    core::{
        context::RequestContext,
        service::{self, NewPropertyService},
    },
    entities::property_service::Model as PropertyServiceModel,
    errors::Result,
};
use axum::{Router, extract::State, http::StatusCode, routing::post};

pub fn routes() -> Router<AppState> {
    Router::new().route("/services", post(create).get(list))
}

async fn create(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<NewPropertyService>,
) -> Result<(StatusCode, Json<PropertyServiceModel>)> {
    let created = service::create_property_service(&*state.db, &ctx, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<Vec<PropertyServiceModel>>> {
    service::list_property_services(&*state.db, &ctx)
        .await
        .map(Json)
}
