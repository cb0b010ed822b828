//! Gig marketplace: listings, candidate interest and dual confirmation.
//!
//! Many candidates may express interest in a gig; the owner accepts exactly
//! one. Accepting rejects every competing interest inside the same storage
//! transaction, and a partial unique index guarantees a single accepted row
//! per gig. A gig becomes Completed only once both the owner (provider) and
//! the accepted worker have confirmed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::identity::IdentityLookup;
use crate::reviews::can_review;
use crate::storage::{
    ConfirmFlag, GigCounter, GigDetails, GigRow, GigStatus, InterestChange, InterestStatus,
    Storage,
};

/// Who is confirming completion, and as which side of the gig.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionRole {
    /// The gig owner.
    Provider(String),
    /// A candidate whose interest was accepted.
    Worker(String),
}

impl CompletionRole {
    pub fn username(&self) -> &str {
        match self {
            CompletionRole::Provider(u) | CompletionRole::Worker(u) => u,
        }
    }
}

/// Changes accepted by [`update_gig`]. `status` may move a gig between
/// Active and Closed only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GigUpdate {
    #[serde(flatten)]
    pub details: GigDetails,
    #[serde(default)]
    pub status: Option<GigStatus>,
}

/// A candidate interested in a gig, with display fields.
#[derive(Debug, Clone, Serialize)]
pub struct InterestedUser {
    pub username: String,
    pub name: String,
    pub profile_photo: Option<String>,
    pub status: InterestStatus,
    pub created_at: u64,
}

/// A completed gig together with whether the viewer may still review it.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedGig {
    #[serde(flatten)]
    pub gig: GigRow,
    pub can_review: bool,
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

fn validate_details(details: &GigDetails) -> Result<()> {
    if details.title.trim().is_empty() {
        return Err(Error::InvalidState("gig title is empty".to_string()));
    }
    if !details.price.is_finite() || details.price < 0.0 {
        return Err(Error::InvalidState(format!(
            "gig price must be non-negative, got {}",
            details.price
        )));
    }
    Ok(())
}

pub fn create_gig(storage: &Storage, owner: &str, details: &GigDetails, now: u64) -> Result<GigRow> {
    validate_details(details)?;
    let id = storage.insert_gig(owner, details, now)?;
    info!("gig-create: {} (gig {})", owner, id);
    get_gig(storage, id)
}

pub fn get_gig(storage: &Storage, gig_id: i64) -> Result<GigRow> {
    storage
        .get_gig(gig_id)?
        .ok_or_else(|| Error::NotFound(format!("gig {gig_id}")))
}

pub fn list_gigs(storage: &Storage) -> Result<Vec<GigRow>> {
    Ok(storage.list_gigs()?)
}

pub fn gigs_by_owner(storage: &Storage, username: &str) -> Result<Vec<GigRow>> {
    Ok(storage.list_gigs_by_owner(username)?)
}

pub fn gigs_by_category(storage: &Storage, category: &str) -> Result<Vec<GigRow>> {
    Ok(storage.list_gigs_by_category(category)?)
}

pub fn search_gigs(storage: &Storage, term: &str) -> Result<Vec<GigRow>> {
    let term = term.trim();
    if term.is_empty() {
        return list_gigs(storage);
    }
    Ok(storage.search_gigs(term)?)
}

pub fn update_gig(storage: &Storage, gig_id: i64, update: &GigUpdate) -> Result<GigRow> {
    let current = get_gig(storage, gig_id)?;
    validate_details(&update.details)?;

    let status = match update.status {
        None => current.status,
        Some(GigStatus::Completed) if current.status != GigStatus::Completed => {
            return Err(Error::InvalidState(
                "a gig is completed only by confirmation from both sides".to_string(),
            ));
        }
        Some(status) if current.status == GigStatus::Completed && status != current.status => {
            return Err(Error::InvalidState(format!(
                "gig {gig_id} is completed and its status cannot change"
            )));
        }
        Some(status) => status,
    };

    storage.update_gig(gig_id, &update.details, status)?;
    info!("gig-update: gig {} ({})", gig_id, status.as_str());
    get_gig(storage, gig_id)
}

/// Delete a gig and its interests.
pub fn delete_gig(storage: &Storage, gig_id: i64) -> Result<()> {
    if !storage.delete_gig(gig_id)? {
        return Err(Error::NotFound(format!("gig {gig_id}")));
    }
    info!("gig-delete: gig {}", gig_id);
    Ok(())
}

pub fn record_view(storage: &Storage, gig_id: i64) -> Result<()> {
    bump(storage, gig_id, GigCounter::Views)
}

pub fn record_response(storage: &Storage, gig_id: i64) -> Result<()> {
    bump(storage, gig_id, GigCounter::Responses)
}

fn bump(storage: &Storage, gig_id: i64, counter: GigCounter) -> Result<()> {
    if !storage.increment_gig_counter(gig_id, counter)? {
        return Err(Error::NotFound(format!("gig {gig_id}")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Interest matching
// ---------------------------------------------------------------------------

/// Express or withdraw interest. Returns the resulting state.
///
/// Withdrawing deletes the row whatever its status, so a later
/// re-expression starts again at pending.
pub fn toggle_interest(
    storage: &Storage,
    gig_id: i64,
    candidate: &str,
    interested: bool,
    now: u64,
) -> Result<bool> {
    get_gig(storage, gig_id)?;

    if interested {
        match storage.insert_interest(gig_id, candidate, now) {
            Ok(()) => info!("interest: {} in gig {}", candidate, gig_id),
            Err(e) if e.is_unique_violation() => {
                debug!("interest: {} already interested in gig {}", candidate, gig_id);
            }
            Err(e) => return Err(e.into()),
        }
    } else if storage.delete_interest(gig_id, candidate)? {
        info!("interest-withdraw: {} from gig {}", candidate, gig_id);
    }
    Ok(interested)
}

/// Accept `candidate` as the worker for a gig and reject every competing
/// non-rejected interest in the same transaction. Switching to a different
/// worker clears the worker's completion confirmation.
pub fn accept_interest(storage: &Storage, gig_id: i64, candidate: &str) -> Result<()> {
    get_gig(storage, gig_id)?;
    let swept = applied(
        storage.accept_interest_exclusive(gig_id, candidate)?,
        gig_id,
        candidate,
    )?;
    info!(
        "interest-accept: {} for gig {} (rejected {} competitor(s))",
        candidate, gig_id, swept
    );
    Ok(())
}

pub fn reject_interest(storage: &Storage, gig_id: i64, candidate: &str) -> Result<()> {
    get_gig(storage, gig_id)?;
    applied(storage.reject_interest(gig_id, candidate)?, gig_id, candidate)?;
    info!("interest-reject: {} for gig {}", candidate, gig_id);
    Ok(())
}

fn applied(change: InterestChange, gig_id: i64, candidate: &str) -> Result<usize> {
    match change {
        InterestChange::Applied { swept } => Ok(swept),
        InterestChange::Missing => Err(Error::NotFound(format!(
            "no interest from {candidate} in gig {gig_id}"
        ))),
        InterestChange::GigCompleted => Err(Error::InvalidState(format!(
            "gig {gig_id} is already completed"
        ))),
    }
}

/// Candidates for a gig, oldest first. Unresolvable handles are skipped.
pub fn interested_users_for_gig(storage: &Storage, gig_id: i64) -> Result<Vec<InterestedUser>> {
    let mut users = Vec::new();
    for row in storage.list_interests_for_gig(gig_id)? {
        let Some(profile) = storage.resolve(&row.username)? else {
            debug!("interest: skipping unresolvable {}", row.username);
            continue;
        };
        users.push(InterestedUser {
            name: profile.display_name(),
            profile_photo: profile.profile_photo,
            username: row.username,
            status: row.status,
            created_at: row.created_at,
        });
    }
    Ok(users)
}

pub fn interested_gig_ids(storage: &Storage, username: &str) -> Result<Vec<i64>> {
    Ok(storage.list_interested_gig_ids(username)?)
}

pub fn interest_count(storage: &Storage, gig_id: i64) -> Result<u32> {
    Ok(storage.count_interests(gig_id)?)
}

/// Handles allowed to act as the worker on a gig.
pub fn accepted_usernames_for_gig(storage: &Storage, gig_id: i64) -> Result<Vec<String>> {
    Ok(storage.list_accepted_usernames(gig_id)?)
}

/// Gigs on which `username` is the accepted worker, newest first.
pub fn accepted_gigs_for(storage: &Storage, username: &str) -> Result<Vec<GigRow>> {
    let ids = storage.list_accepted_gig_ids(username)?;
    Ok(storage.list_gigs_by_ids(&ids)?)
}

// ---------------------------------------------------------------------------
// Dual confirmation
// ---------------------------------------------------------------------------

/// Record one side's confirmation that the gig is done. The role is
/// checked before anything is written; confirming twice is harmless.
pub fn confirm_completion(storage: &Storage, gig_id: i64, role: &CompletionRole) -> Result<GigRow> {
    let gig = get_gig(storage, gig_id)?;

    let flag = match role {
        CompletionRole::Provider(username) => {
            if *username != gig.username {
                return Err(Error::InvalidState(format!(
                    "{username} does not own gig {gig_id}"
                )));
            }
            ConfirmFlag::Provider
        }
        CompletionRole::Worker(username) => {
            if !storage
                .list_accepted_usernames(gig_id)?
                .iter()
                .any(|u| u == username)
            {
                return Err(Error::InvalidState(format!(
                    "{username} is not the accepted worker for gig {gig_id}"
                )));
            }
            ConfirmFlag::Worker
        }
    };

    storage.confirm_gig_completion(gig_id, flag)?;
    let updated = get_gig(storage, gig_id)?;
    info!(
        "gig-confirm: {} as {:?} on gig {} (status {})",
        role.username(),
        flag,
        gig_id,
        updated.status.as_str()
    );
    Ok(updated)
}

/// Completed gigs that `username` owned or worked on, newest first, each
/// annotated with whether `username` may still review it.
pub fn completed_gigs_for(storage: &Storage, username: &str) -> Result<Vec<CompletedGig>> {
    let mut by_id: BTreeMap<i64, GigRow> = BTreeMap::new();
    for gig in storage.list_gigs_by_owner(username)? {
        by_id.insert(gig.id, gig);
    }
    for gig in accepted_gigs_for(storage, username)? {
        by_id.insert(gig.id, gig);
    }

    let mut gigs: Vec<GigRow> = by_id
        .into_values()
        .filter(|g| g.status == GigStatus::Completed)
        .collect();
    gigs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    let mut result = Vec::with_capacity(gigs.len());
    for gig in gigs {
        let can_review = can_review(storage, gig.id, username)?;
        result.push(CompletedGig { gig, can_review });
    }
    Ok(result)
}
