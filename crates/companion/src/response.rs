//! Error response helpers shared by all handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Body of every non-2xx JSON response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

pub type ErrorReply = (StatusCode, Json<ErrorResponse>);

pub fn error(status: StatusCode, detail: impl Into<String>) -> ErrorReply {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
        }),
    )
}

pub fn unprocessable(detail: impl Into<String>) -> ErrorReply {
    error(StatusCode::UNPROCESSABLE_ENTITY, detail)
}

pub fn internal_error(detail: impl Into<String>) -> ErrorReply {
    error(StatusCode::INTERNAL_SERVER_ERROR, detail)
}

/// Map a body extraction failure to a `detail` response with the same status.
pub fn rejection(rejection: JsonRejection) -> ErrorReply {
    error(rejection.status(), rejection.body_text())
}
