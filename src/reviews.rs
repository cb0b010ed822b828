//! Review gate and review persistence.
//!
//! Only the two parties of a Completed gig may review each other, each at most
//! once. A stored review recomputes the reviewee's average rating and
//! writes it onto every gig the reviewee owns.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::storage::{GigStatus, ReviewRow, Storage};

const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// Review as submitted by the reviewer.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub reviewer_username: String,
    pub reviewee_username: String,
    pub rating: u8,
    pub communication_rating: u8,
    pub quality_rating: u8,
    pub value_rating: u8,
    pub reliability_rating: u8,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReviewStats {
    pub avg_rating: f64,
    pub review_count: u32,
}

/// Whether `username` may review the gig right now.
pub fn can_review(storage: &Storage, gig_id: i64, username: &str) -> Result<bool> {
    let Some(gig) = storage.get_gig(gig_id)? else {
        return Ok(false);
    };
    if gig.status != GigStatus::Completed {
        return Ok(false);
    }
    if !is_party(storage, gig_id, &gig.username, username)? {
        return Ok(false);
    }
    Ok(!storage.has_review(gig_id, username)?)
}

fn is_party(storage: &Storage, gig_id: i64, owner: &str, username: &str) -> Result<bool> {
    if owner == username {
        return Ok(true);
    }
    Ok(storage
        .list_accepted_usernames(gig_id)?
        .iter()
        .any(|u| u == username))
}

/// The owner reviews the accepted worker; the worker reviews the owner.
fn is_counterparty(
    storage: &Storage,
    gig_id: i64,
    owner: &str,
    reviewer: &str,
    reviewee: &str,
) -> Result<bool> {
    if reviewer != owner {
        return Ok(reviewee == owner);
    }
    Ok(storage
        .list_accepted_usernames(gig_id)?
        .iter()
        .any(|u| u == reviewee))
}

pub fn create_review(
    storage: &Storage,
    gig_id: i64,
    review: &NewReview,
    now: u64,
) -> Result<ReviewRow> {
    let gig = storage
        .get_gig(gig_id)?
        .ok_or_else(|| Error::NotFound(format!("gig {gig_id}")))?;
    if gig.status != GigStatus::Completed {
        return Err(Error::InvalidState(format!("gig {gig_id} is not completed")));
    }

    let reviewer = review.reviewer_username.as_str();
    if !is_party(storage, gig_id, &gig.username, reviewer)? {
        return Err(Error::InvalidState(format!(
            "{reviewer} took no part in gig {gig_id}"
        )));
    }
    let reviewee = review.reviewee_username.as_str();
    if reviewee == reviewer {
        return Err(Error::InvalidState(format!("{reviewer} cannot review themselves")));
    }
    if !is_counterparty(storage, gig_id, &gig.username, reviewer, reviewee)? {
        return Err(Error::InvalidState(format!(
            "{reviewee} is not {reviewer}'s counterparty on gig {gig_id}"
        )));
    }
    for (name, value) in [
        ("rating", review.rating),
        ("communication_rating", review.communication_rating),
        ("quality_rating", review.quality_rating),
        ("value_rating", review.value_rating),
        ("reliability_rating", review.reliability_rating),
    ] {
        if !RATING_RANGE.contains(&value) {
            return Err(Error::InvalidState(format!(
                "{name} must be between 1 and 5, got {value}"
            )));
        }
    }
    if storage.has_review(gig_id, reviewer)? {
        return Err(duplicate(gig_id, reviewer));
    }

    let row = ReviewRow {
        id: 0,
        gig_id,
        reviewer_username: reviewer.to_string(),
        reviewee_username: review.reviewee_username.clone(),
        rating: review.rating,
        communication_rating: review.communication_rating,
        quality_rating: review.quality_rating,
        value_rating: review.value_rating,
        reliability_rating: review.reliability_rating,
        comment: review.comment.trim().to_string(),
        is_worker_review: reviewer != gig.username,
        created_at: now,
    };
    let stored = match storage.insert_review_and_rerate(&row) {
        Ok(stored) => stored,
        Err(e) if e.is_unique_violation() => return Err(duplicate(gig_id, reviewer)),
        Err(e) => return Err(e.into()),
    };
    info!(
        "review-create: {} -> {} on gig {} ({} stars)",
        reviewer, stored.reviewee_username, gig_id, stored.rating
    );
    Ok(stored)
}

fn duplicate(gig_id: i64, reviewer: &str) -> Error {
    Error::Conflict(format!("{reviewer} already reviewed gig {gig_id}"))
}

/// Reviews received by `username`, newest first.
pub fn reviews_for_user(storage: &Storage, username: &str) -> Result<Vec<ReviewRow>> {
    Ok(storage.list_reviews_for_reviewee(username)?)
}

pub fn reviews_for_gig(storage: &Storage, gig_id: i64) -> Result<Vec<ReviewRow>> {
    Ok(storage.list_reviews_for_gig(gig_id)?)
}

/// Average received rating, 0.0 when there are none.
pub fn review_stats(storage: &Storage, username: &str) -> Result<ReviewStats> {
    let (average, count) = storage.review_stats(username)?;
    Ok(ReviewStats {
        avg_rating: average.unwrap_or(0.0),
        review_count: count,
    })
}
