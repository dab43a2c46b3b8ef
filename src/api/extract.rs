//! Request extractors whose rejections use the `{ code, message }` error body.
//!
//! They wrap the axum extractors of the same name, so handlers read exactly as with
//! `axum::Json`, `axum::extract::Query` and `axum::extract::Path`. A malformed body,
//! query string or path segment becomes an [`Error::Validation`] (400).

use crate::errors::Error;
use axum::{
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// JSON request body or response
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Query string parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct Query<T>(pub T);

/// Path parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct Path<T>(pub T);

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::{
        api::test_support::{send, test_app},
        errors::Result,
        test_utils::*,
    };
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_bad_path_and_query_use_error_body() -> Result<()> {
        let app = test_app(setup_test_db().await?);

        let (status, body) = send(&app, Method::GET, "/api/v1/reservations/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, body) =
            send(&app, Method::GET, "/api/v1/reservations?page=first", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        Ok(())
    }

    #[tokio::test]
    async fn test_bad_json_uses_error_body() -> Result<()> {
        let app = test_app(setup_test_db().await?);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/rooms",
            Some(json!({ "number": "101" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/services")
            .header("x-property-id", TEST_PROPERTY_ID.to_string())
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        Ok(())
    }
}
