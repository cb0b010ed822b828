//! Review handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::reviews::{self, NewReview};
use crate::web::state::SharedState;
use crate::web::utils::{error_response, json_result, now_secs};

#[derive(Deserialize)]
pub struct CanReviewQuery {
    gig_id: i64,
    username: String,
}

pub async fn create_review_handler(
    State(state): State<SharedState>,
    Path(gig_id): Path<i64>,
    axum::Json(req): axum::Json<NewReview>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    match reviews::create_review(&storage, gig_id, &req, now_secs()) {
        Ok(review) => (StatusCode::CREATED, axum::Json(review)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn gig_reviews_handler(
    State(state): State<SharedState>,
    Path(gig_id): Path<i64>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    json_result(reviews::reviews_for_gig(&storage, gig_id))
}

pub async fn user_reviews_handler(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    json_result(reviews::reviews_for_user(&storage, &username))
}

pub async fn user_stats_handler(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    json_result(reviews::review_stats(&storage, &username))
}

pub async fn can_review_handler(
    State(state): State<SharedState>,
    Query(q): Query<CanReviewQuery>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    match reviews::can_review(&storage, q.gig_id, &q.username) {
        Ok(allowed) => {
            let body = serde_json::json!({ "can_review": allowed });
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(e) => error_response(e),
    }
}
