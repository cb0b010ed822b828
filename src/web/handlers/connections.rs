//! Connection request handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::connections;
use crate::web::state::SharedState;
use crate::web::utils::{api_error, error_response, json_result, now_secs};

/// Body shared by every transition: `from` asked `to`.
#[derive(Deserialize)]
pub struct PairPayload {
    from: String,
    to: String,
}

#[derive(Deserialize)]
pub struct UsernameQuery {
    username: String,
}

fn check_pair(req: &PairPayload) -> Option<Response> {
    if req.from.trim().is_empty() || req.to.trim().is_empty() {
        return Some(api_error(
            StatusCode::BAD_REQUEST,
            "from and to cannot be empty",
        ));
    }
    None
}

pub async fn status_handler(
    State(state): State<SharedState>,
    Query(q): Query<PairPayload>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    match connections::status_between(&storage, &q.from, &q.to) {
        Ok(status) => {
            let body = serde_json::json!({ "status": status });
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(e) => error_response(e),
    }
}

pub async fn connect_handler(
    State(state): State<SharedState>,
    axum::Json(req): axum::Json<PairPayload>,
) -> Response {
    if let Some(resp) = check_pair(&req) {
        return resp;
    }
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    json_result(connections::request_connection(
        &storage,
        &req.from,
        &req.to,
        now_secs(),
    ))
}

pub async fn accept_handler(
    State(state): State<SharedState>,
    axum::Json(req): axum::Json<PairPayload>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    match connections::accept(&storage, &req.from, &req.to, now_secs()) {
        Ok(()) => {
            let body = serde_json::json!({ "status": "connected" });
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(e) => error_response(e),
    }
}

pub async fn reject_handler(
    State(state): State<SharedState>,
    axum::Json(req): axum::Json<PairPayload>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    match connections::reject(&storage, &req.from, &req.to, now_secs()) {
        Ok(()) => {
            let body = serde_json::json!({ "status": "rejected" });
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(e) => error_response(e),
    }
}

pub async fn disconnect_handler(
    State(state): State<SharedState>,
    axum::Json(req): axum::Json<PairPayload>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    match connections::disconnect(&storage, &req.from, &req.to) {
        Ok(()) => {
            let body = serde_json::json!({ "status": "not_connected" });
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(e) => error_response(e),
    }
}

pub async fn pending_requests_handler(
    State(state): State<SharedState>,
    Query(q): Query<UsernameQuery>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    json_result(connections::pending_requests_for(&storage, &q.username))
}

pub async fn list_connections_handler(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    json_result(connections::connections_of(&storage, &username))
}
