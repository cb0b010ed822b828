//! Shared application state.
//!
//! Only the database location is shared. Every request opens its own
//! [`Storage`] handle, so requests run concurrently and races are settled
//! by SQLite's write lock and the schema's unique indexes.

use std::path::PathBuf;
use std::sync::Arc;

use axum::response::Response;
use tracing::warn;

use crate::storage::Storage;
use crate::web::utils::error_response;

pub struct AppState {
    pub db_path: PathBuf,
}

impl AppState {
    /// The schema must already exist at `db_path`.
    pub fn shared(db_path: PathBuf) -> SharedState {
        Arc::new(AppState { db_path })
    }

    /// Open a handle for one request. Failure is already an HTTP response.
    pub fn storage(&self) -> Result<Storage, Response> {
        Storage::connect(&self.db_path).map_err(|e| {
            warn!("storage: cannot open {}: {}", self.db_path.display(), e);
            error_response(e.into())
        })
    }
}

pub type SharedState = Arc<AppState>;
