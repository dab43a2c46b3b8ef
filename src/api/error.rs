//! HTTP rendering of [`Error`].
//!
//! Every handler returns [`crate::errors::Result`]; the variant decides the status
//! code and the client sees a `{ "code", "message" }` body. Server-side failures
//! are logged and their details withheld from the response.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// Error response body (JSON)
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// Stable machine-readable code
    code: &'static str,
    /// Human-readable message
    message: String,
}

impl Error {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidTransition { .. }
            | Self::ResourceUnavailable { .. }
            | Self::FolioLocked { .. }
            | Self::PolicyInUse { .. } => StatusCode::CONFLICT,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable code sent to clients.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::ResourceUnavailable { .. } => "RESOURCE_UNAVAILABLE",
            Self::FolioLocked { .. } => "FOLIO_LOCKED",
            Self::PolicyInUse { .. } => "POLICY_IN_USE",
            Self::Config { .. } | Self::Database(_) | Self::Io(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            error!(status = %status, error = %self, "Internal server error");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            code: self.code(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
