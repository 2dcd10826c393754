use axum::extract::State;
use axum::http::StatusCode;

use crate::server::AppState;

/// GET /livez
pub async fn livez() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// GET /readyz
///
/// Not ready until an upstream API key is configured.
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.upstream_credentials {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "missing upstream api key")
    }
}
