//! Rate plan and cancellation policy endpoints.

use super::{
    AppState,
    extract::{Json, Path},
};
use crate::{
    core::{
        context::RequestContext,
        policy::{self, CancellationPolicy, NewRatePlan, ResolvedPolicy},
    },
    entities::rate_plan::Model as RatePlanModel,
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rate-plans", post(create))
        .route("/rate-plans/{id}/policy", get(show_policy).put(update_policy))
}

async fn create(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(body): Json<NewRatePlan>,
) -> Result<(StatusCode, Json<RatePlanModel>)> {
    let plan = policy::create_rate_plan(&*state.db, &ctx, &*state.clock, body).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// Resolves like a cancellation would, so an unknown plan follows the fallback setting.
async fn show_policy(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<Json<ResolvedPolicy>> {
    policy::resolve_policy(&*state.db, &ctx, id, &state.config.cancellation)
        .await
        .map(Json)
}

async fn update_policy(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(body): Json<CancellationPolicy>,
) -> Result<Json<RatePlanModel>> {
    policy::update_rate_plan_policy(&*state.db, &ctx, id, body)
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
    async fn test_create_and_resolve_policy() -> Result<()> {
        let db = setup_test_db().await?;
        let app = test_app(db);

        let (status, plan) = send(
            &app,
            Method::POST,
            "/api/v1/rate-plans",
            Some(json!({
                "name": "Non-refundable",
                "nightly_rate": 900_000,
                "free_until_hours": 0,
                "early_fee_percent": 100,
                "late_fee_percent": 100,
                "no_show_fee_percent": 100,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = plan["id"].as_i64().unwrap();

        let (status, resolved) = send(
            &app,
            Method::GET,
            &format!("/api/v1/rate-plans/{id}/policy"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resolved["policy"]["name"], "Non-refundable");
        assert_eq!(resolved["policy"]["early_fee_percent"], 100);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_percent_is_bad_request() -> Result<()> {
        let db = setup_test_db().await?;
        let app = test_app(db);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/rate-plans",
            Some(json!({
                "name": "Broken",
                "nightly_rate": 900_000,
                "free_until_hours": 24,
                "early_fee_percent": 0,
                "late_fee_percent": 150,
                "no_show_fee_percent": 100,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        Ok(())
    }

    #[tokio::test]
    async fn test_policy_update_refused_while_in_use() -> Result<()> {
        let (db, plan, _reservation) = setup_with_reservation().await?;
        let app = test_app(db);

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/api/v1/rate-plans/{}/policy", plan.id),
            Some(json!({
                "name": "Stricter",
                "free_until_hours": 72,
                "early_fee_percent": 10,
                "late_fee_percent": 100,
                "no_show_fee_percent": 100,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "POLICY_IN_USE");
        Ok(())
    }
}
