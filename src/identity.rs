//! Identity lookup: resolving a handle to the display fields of its owner.
//!
//! Profiles are owned by the external registration system. The core only
//! reads them, and a handle that no longer resolves is never an error for
//! read paths; callers decide how to degrade.

use serde::Serialize;

use crate::error::Result;
use crate::storage::{Storage, UserRow};

/// Placeholder shown for authors whose handle no longer resolves.
pub const UNKNOWN_USER: &str = "Unknown User";

/// Display fields for one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_photo: Option<String>,
    pub major: Option<String>,
}

impl Profile {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

impl From<UserRow> for Profile {
    fn from(row: UserRow) -> Self {
        Self {
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            profile_photo: row.profile_photo,
            major: row.major,
        }
    }
}

/// Handle-to-profile resolution.
pub trait IdentityLookup {
    /// `Ok(None)` when the handle is unknown.
    fn resolve(&self, username: &str) -> Result<Option<Profile>>;
}

impl IdentityLookup for Storage {
    fn resolve(&self, username: &str) -> Result<Option<Profile>> {
        Ok(self.get_user(username)?.map(Profile::from))
    }
}

/// Author block attached to comments and replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorInfo {
    pub username: String,
    pub name: String,
    pub profile_photo: Option<String>,
}

impl AuthorInfo {
    /// Resolve `username`, substituting the placeholder when it is unknown.
    pub fn resolve_or_placeholder(lookup: &impl IdentityLookup, username: &str) -> Result<Self> {
        Ok(match lookup.resolve(username)? {
            Some(profile) => Self {
                username: username.to_string(),
                name: profile.display_name(),
                profile_photo: profile.profile_photo,
            },
            None => Self {
                username: username.to_string(),
                name: UNKNOWN_USER.to_string(),
                profile_photo: None,
            },
        })
    }
}
