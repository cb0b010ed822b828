//! Post, feed, like and comment handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::engagement;
use crate::feed::build_feed;
use crate::posts::{self, NewPost};
use crate::storage::{LikeKind, LikeTarget};
use crate::web::state::SharedState;
use crate::web::utils::{api_error, error_response, json_result, now_secs};

#[derive(Deserialize)]
pub struct CreatePostPayload {
    username: String,
    #[serde(flatten)]
    post: NewPost,
}

#[derive(Deserialize)]
pub struct UsernameQuery {
    username: String,
}

#[derive(Deserialize)]
pub struct LikePayload {
    username: String,
    liked: bool,
}

#[derive(Deserialize)]
pub struct CommentPayload {
    username: String,
    text: String,
}

pub async fn create_post_handler(
    State(state): State<SharedState>,
    axum::Json(req): axum::Json<CreatePostPayload>,
) -> Response {
    if req.username.trim().is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "username cannot be empty");
    }
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    match posts::create_post(&storage, &req.username, req.post, now_secs()) {
        Ok(post) => (StatusCode::CREATED, axum::Json(post)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn feed_handler(
    State(state): State<SharedState>,
    Query(q): Query<UsernameQuery>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    json_result(build_feed(&storage, &q.username))
}

pub async fn user_posts_handler(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    json_result(posts::posts_by_user(&storage, &username))
}

pub async fn delete_post_handler(
    State(state): State<SharedState>,
    Path(post_id): Path<i64>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    match posts::delete_post(&storage, post_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn hashtag_posts_handler(
    State(state): State<SharedState>,
    Path(tag): Path<String>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    json_result(posts::posts_with_hashtag(&storage, &tag))
}

// ---------------------------------------------------------------------------
// Likes
// ---------------------------------------------------------------------------

async fn toggle(state: SharedState, target: LikeTarget, req: LikePayload) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    match engagement::toggle_like(&storage, target, &req.username, req.liked, now_secs()) {
        Ok(count) => {
            let body = serde_json::json!({
                "liked": req.liked,
                "like_count": count,
            });
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(e) => error_response(e),
    }
}

pub async fn like_post_handler(
    State(state): State<SharedState>,
    Path(post_id): Path<i64>,
    axum::Json(req): axum::Json<LikePayload>,
) -> Response {
    toggle(state, LikeTarget::Post(post_id), req).await
}

pub async fn like_comment_handler(
    State(state): State<SharedState>,
    Path(comment_id): Path<i64>,
    axum::Json(req): axum::Json<LikePayload>,
) -> Response {
    toggle(state, LikeTarget::Comment(comment_id), req).await
}

pub async fn user_post_likes_handler(
    State(state): State<SharedState>,
    Query(q): Query<UsernameQuery>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    json_result(engagement::liked_subject_ids(
        &storage,
        LikeKind::Post,
        &q.username,
    ))
}

pub async fn user_comment_likes_handler(
    State(state): State<SharedState>,
    Query(q): Query<UsernameQuery>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    json_result(engagement::liked_subject_ids(
        &storage,
        LikeKind::Comment,
        &q.username,
    ))
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

pub async fn add_comment_handler(
    State(state): State<SharedState>,
    Path(post_id): Path<i64>,
    axum::Json(req): axum::Json<CommentPayload>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    match engagement::add_comment(&storage, post_id, &req.username, &req.text, now_secs()) {
        Ok(comment) => (StatusCode::CREATED, axum::Json(comment)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn add_reply_handler(
    State(state): State<SharedState>,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    axum::Json(req): axum::Json<CommentPayload>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    match engagement::add_reply(
        &storage,
        post_id,
        comment_id,
        &req.username,
        &req.text,
        now_secs(),
    ) {
        Ok(reply) => (StatusCode::CREATED, axum::Json(reply)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn list_comments_handler(
    State(state): State<SharedState>,
    Path(post_id): Path<i64>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    json_result(engagement::comment_tree(&storage, post_id))
}
