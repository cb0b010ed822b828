//! Domain error taxonomy shared by every campusnet operation.

use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum Error {
    /// The referenced gig, post, comment, connection or interest is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness rule was violated in a way the caller must hear about.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The operation is not allowed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, Error>;
