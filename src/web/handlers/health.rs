//! Health check endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::storage::Storage;
use crate::web::state::SharedState;

pub async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let database = Storage::connect(&state.db_path).is_ok_and(|storage| storage.ping().is_ok());

    let body = serde_json::json!({
        "status": if database { "ok" } else { "degraded" },
        "database": database,
    });
    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, axum::Json(body))
}
