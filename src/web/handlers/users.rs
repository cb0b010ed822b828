//! Profile lookup.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::identity::IdentityLookup;
use crate::web::state::SharedState;
use crate::web::utils::{api_error, error_response};

pub async fn get_user_handler(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Response {
    let storage = match state.storage() {
        Ok(storage) => storage,
        Err(resp) => return resp,
    };
    match storage.resolve(&username) {
        Ok(Some(profile)) => {
            let body = serde_json::json!({
                "username": profile.username,
                "name": profile.display_name(),
                "first_name": profile.first_name,
                "last_name": profile.last_name,
                "profile_photo": profile.profile_photo,
                "major": profile.major,
            });
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Ok(None) => api_error(StatusCode::NOT_FOUND, format!("user {username} not found")),
        Err(e) => error_response(e),
    }
}
