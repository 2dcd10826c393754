//! Chat relay HTTP handler.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::relay::ChatRequest;
use crate::response;
use crate::server::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// POST /chat
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(req) => req,
        Err(rejection) => return response::rejection(rejection).into_response(),
    };

    if req.message.trim().is_empty() {
        return response::unprocessable("message must not be empty").into_response();
    }

    match state.relay.handle_chat(&req).await {
        Ok(text) => (StatusCode::OK, Json(ChatResponse { response: text })).into_response(),
        Err(e) => response::internal_error(e.to_string()).into_response(),
    }
}
