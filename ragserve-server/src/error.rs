//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use ragserve_core::RagError;

/// Error body returned to HTTP callers on any failure.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable reason for the failure.
    pub detail: String,
}

/// A request-scoped failure, rendered as a JSON `{detail}` body.
///
/// Validation failures map to 400, everything else to 500. Failures are
/// isolated to the request; nothing here is fatal to the process.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    /// A 400 with the given detail.
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, detail: detail.into() }
    }

    /// A 500 with the given detail.
    pub fn internal(detail: impl Into<String>) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, detail: detail.into() }
    }
}

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        let status = match err {
            RagError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, detail: err.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}
