//! Likes on posts and comments, and the one-level comment tree of a post.
//!
//! A like is a fact keyed by (subject, actor). Toggling writes or removes
//! that fact and always answers with a freshly counted total. Duplicate
//! inserts from racing requests hit the primary key and are treated as
//! "already liked".

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::identity::AuthorInfo;
use crate::storage::{CommentRow, LikeKind, LikeTarget, Storage};

/// A comment with its live like count, author block and replies.
///
/// Replies carry an empty `replies` list; the tree is never deeper.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: i64,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub author: AuthorInfo,
    pub text: String,
    pub created_at: u64,
    pub like_count: u32,
    pub replies: Vec<CommentView>,
}

/// Bring the like state of `actor` on `target` to `want_liked` and return
/// the subject's like count afterwards.
pub fn toggle_like(
    storage: &Storage,
    target: LikeTarget,
    actor: &str,
    want_liked: bool,
    now: u64,
) -> Result<u32> {
    ensure_subject_exists(storage, target)?;

    if want_liked {
        match storage.insert_like(target, actor, now) {
            Ok(()) => {}
            Err(e) if e.is_unique_violation() => {
                debug!("like: {} already likes {:?}", actor, target);
            }
            Err(e) => return Err(e.into()),
        }
    } else {
        storage.delete_like(target, actor)?;
    }

    let count = storage.count_likes(target)?;
    debug!(
        "like: {} set {:?} to {} (count {})",
        actor, target, want_liked, count
    );
    Ok(count)
}

fn ensure_subject_exists(storage: &Storage, target: LikeTarget) -> Result<()> {
    let exists = match target {
        LikeTarget::Post(id) => storage.post_exists(id)?,
        LikeTarget::Comment(id) => storage.get_comment(id)?.is_some(),
    };
    if !exists {
        return Err(match target {
            LikeTarget::Post(id) => Error::NotFound(format!("post {id}")),
            LikeTarget::Comment(id) => Error::NotFound(format!("comment {id}")),
        });
    }
    Ok(())
}

/// Ids of every subject of `kind` that `actor` has liked.
pub fn liked_subject_ids(storage: &Storage, kind: LikeKind, actor: &str) -> Result<Vec<i64>> {
    Ok(storage.list_liked_ids(kind, actor)?)
}

/// Add a top-level comment to a post.
pub fn add_comment(
    storage: &Storage,
    post_id: i64,
    author: &str,
    text: &str,
    now: u64,
) -> Result<CommentRow> {
    if !storage.post_exists(post_id)? {
        return Err(Error::NotFound(format!("post {post_id}")));
    }
    let text = non_blank(text)?;
    let row = storage.insert_comment(post_id, author, text, None, now)?;
    info!("comment: {} on post {} (comment {})", author, post_id, row.id);
    Ok(row)
}

/// Reply to a top-level comment on the same post.
pub fn add_reply(
    storage: &Storage,
    post_id: i64,
    parent_id: i64,
    author: &str,
    text: &str,
    now: u64,
) -> Result<CommentRow> {
    let parent = storage
        .get_comment(parent_id)?
        .ok_or_else(|| Error::NotFound(format!("comment {parent_id}")))?;
    if parent.post_id != post_id {
        return Err(Error::InvalidState(format!(
            "comment {parent_id} belongs to post {}, not {post_id}",
            parent.post_id
        )));
    }
    if parent.parent_id.is_some() {
        return Err(Error::InvalidState(format!(
            "comment {parent_id} is a reply and cannot be replied to"
        )));
    }
    let text = non_blank(text)?;
    let row = storage.insert_comment(post_id, author, text, Some(parent_id), now)?;
    info!(
        "reply: {} on comment {} of post {} (comment {})",
        author, parent_id, post_id, row.id
    );
    Ok(row)
}

fn non_blank(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidState("comment text is empty".to_string()));
    }
    Ok(trimmed)
}

/// Top-level comments oldest first, each with its replies oldest first.
/// Replies whose parent is gone or is itself a reply are left out.
pub fn comment_tree(storage: &Storage, post_id: i64) -> Result<Vec<CommentView>> {
    let rows = storage.list_comments(post_id)?;

    let mut top_level = Vec::new();
    let mut replies: HashMap<i64, Vec<CommentView>> = HashMap::new();
    for row in rows {
        let parent = row.parent_id;
        let view = comment_view(storage, row)?;
        match parent {
            None => top_level.push(view),
            Some(parent_id) => replies.entry(parent_id).or_default().push(view),
        }
    }

    for comment in &mut top_level {
        if let Some(children) = replies.remove(&comment.id) {
            comment.replies = children;
        }
    }
    if !replies.is_empty() {
        debug!(
            "comment-tree: post {} has {} orphaned reply group(s)",
            post_id,
            replies.len()
        );
    }
    Ok(top_level)
}

fn comment_view(storage: &Storage, row: CommentRow) -> Result<CommentView> {
    Ok(CommentView {
        like_count: storage.count_likes(LikeTarget::Comment(row.id))?,
        author: AuthorInfo::resolve_or_placeholder(storage, &row.username)?,
        id: row.id,
        post_id: row.post_id,
        parent_id: row.parent_id,
        text: row.text,
        created_at: row.created_at,
        replies: Vec::new(),
    })
}

/// Remove every comment (and comment like) on a post.
pub fn delete_all_for_post(storage: &Storage, post_id: i64) -> Result<usize> {
    let removed = storage.delete_comments_for_post(post_id)?;
    info!("comment-cleanup: removed {} comment(s) from post {}", removed, post_id);
    Ok(removed)
}
