//! Gig listing, interest and completion handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::gigs::{self, CompletionRole, GigUpdate};
use crate::storage::GigDetails;
use crate::web::state::SharedState;
use crate::web::utils::{api_error, error_response, json_result, now_secs};

#[derive(Deserialize)]
pub struct CreateGigPayload {
    username: String,
    #[serde(flatten)]
    details: GigDetails,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Deserialize)]
pub struct UsernameQuery {
    username: String,
}

#[derive(Deserialize)]
pub struct UsernamePayload {
    username: String,
}

#[derive(Deserialize)]
pub struct InterestPayload {
    username: String,
    interested: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum RoleTag {
    Provider,
    Worker,
}

#[derive(Deserialize)]
pub struct ConfirmPayload {
    username: String,
    role: RoleTag,
}

pub async fn list_gigs_handler(State(state): State<SharedState>) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    json_result(gigs::list_gigs(&storage))
}

pub async fn create_gig_handler(
    State(state): State<SharedState>,
    axum::Json(req): axum::Json<CreateGigPayload>,
) -> Response {
    if req.username.trim().is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "username cannot be empty");
    }
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    match gigs::create_gig(&storage, &req.username, &req.details, now_secs()) {
        Ok(gig) => (StatusCode::CREATED, axum::Json(gig)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_gig_handler(
    State(state): State<SharedState>,
    Path(gig_id): Path<i64>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    json_result(gigs::get_gig(&storage, gig_id))
}

pub async fn update_gig_handler(
    State(state): State<SharedState>,
    Path(gig_id): Path<i64>,
    axum::Json(req): axum::Json<GigUpdate>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    json_result(gigs::update_gig(&storage, gig_id, &req))
}

pub async fn delete_gig_handler(
    State(state): State<SharedState>,
    Path(gig_id): Path<i64>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    match gigs::delete_gig(&storage, gig_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn user_gigs_handler(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    json_result(gigs::gigs_by_owner(&storage, &username))
}

pub async fn category_gigs_handler(
    State(state): State<SharedState>,
    Path(category): Path<String>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    json_result(gigs::gigs_by_category(&storage, &category))
}

pub async fn search_gigs_handler(
    State(state): State<SharedState>,
    Query(q): Query<SearchQuery>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    json_result(gigs::search_gigs(&storage, &q.q))
}

pub async fn record_view_handler(
    State(state): State<SharedState>,
    Path(gig_id): Path<i64>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    match gigs::record_view(&storage, gig_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn record_response_handler(
    State(state): State<SharedState>,
    Path(gig_id): Path<i64>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    match gigs::record_response(&storage, gig_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

// ---------------------------------------------------------------------------
// Interests
// ---------------------------------------------------------------------------

pub async fn toggle_interest_handler(
    State(state): State<SharedState>,
    Path(gig_id): Path<i64>,
    axum::Json(req): axum::Json<InterestPayload>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    let interested =
        match gigs::toggle_interest(&storage, gig_id, &req.username, req.interested, now_secs())
        {
            Ok(interested) => interested,
            Err(e) => return error_response(e),
        };
    match gigs::interest_count(&storage, gig_id) {
        Ok(count) => {
            let body = serde_json::json!({
                "interested": interested,
                "interest_count": count,
            });
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(e) => error_response(e),
    }
}

pub async fn interested_users_handler(
    State(state): State<SharedState>,
    Path(gig_id): Path<i64>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    json_result(gigs::interested_users_for_gig(&storage, gig_id))
}

pub async fn user_interests_handler(
    State(state): State<SharedState>,
    Query(q): Query<UsernameQuery>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    json_result(gigs::interested_gig_ids(&storage, &q.username))
}

pub async fn accept_interest_handler(
    State(state): State<SharedState>,
    Path(gig_id): Path<i64>,
    axum::Json(req): axum::Json<UsernamePayload>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    match gigs::accept_interest(&storage, gig_id, &req.username) {
        Ok(()) => {
            let body = serde_json::json!({ "status": "accepted" });
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(e) => error_response(e),
    }
}

pub async fn reject_interest_handler(
    State(state): State<SharedState>,
    Path(gig_id): Path<i64>,
    axum::Json(req): axum::Json<UsernamePayload>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    match gigs::reject_interest(&storage, gig_id, &req.username) {
        Ok(()) => {
            let body = serde_json::json!({ "status": "rejected" });
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(e) => error_response(e),
    }
}

pub async fn accepted_gigs_handler(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    json_result(gigs::accepted_gigs_for(&storage, &username))
}

pub async fn accepted_users_handler(
    State(state): State<SharedState>,
    Path(gig_id): Path<i64>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    json_result(gigs::accepted_usernames_for_gig(&storage, gig_id))
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

pub async fn confirm_completion_handler(
    State(state): State<SharedState>,
    Path(gig_id): Path<i64>,
    axum::Json(req): axum::Json<ConfirmPayload>,
) -> Response {
    let role = match req.role {
        RoleTag::Provider => CompletionRole::Provider(req.username),
        RoleTag::Worker => CompletionRole::Worker(req.username),
    };
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    json_result(gigs::confirm_completion(&storage, gig_id, &role))
}

pub async fn completed_gigs_handler(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    json_result(gigs::completed_gigs_for(&storage, &username))
}
