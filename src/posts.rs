//! Post authoring, hashtag association and deletion.

use tracing::info;

use crate::error::{Error, Result};
use crate::feed::{enrich_post, FeedPost};
use crate::identity::IdentityLookup;
use crate::storage::{NewPostRow, PostRow, Storage};

/// Fields supplied by the author. Media references are opaque strings
/// produced by the blob store.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct NewPost {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub video_urls: Vec<String>,
}

/// Canonical hashtag form: trimmed, leading `#` stripped, lowercase.
/// Returns `None` for tags that are empty after normalising.
pub fn normalize_hashtag(raw: &str) -> Option<String> {
    let tag = raw.trim().trim_start_matches('#').trim().to_lowercase();
    if tag.is_empty() {
        None
    } else {
        Some(tag)
    }
}

pub fn create_post(storage: &Storage, author: &str, post: NewPost, now: u64) -> Result<PostRow> {
    if storage.resolve(author)?.is_none() {
        return Err(Error::NotFound(format!("user {author}")));
    }
    let text = post.text.trim().to_string();
    if text.is_empty() && post.image_urls.is_empty() && post.video_urls.is_empty() {
        return Err(Error::InvalidState(
            "a post needs text or at least one media reference".to_string(),
        ));
    }

    let mut hashtags: Vec<String> = Vec::new();
    for raw in &post.hashtags {
        if let Some(tag) = normalize_hashtag(raw) {
            if !hashtags.contains(&tag) {
                hashtags.push(tag);
            }
        }
    }

    let id = storage.insert_post(&NewPostRow {
        username: author.to_string(),
        text,
        created_at: now,
        hashtags,
        image_urls: post.image_urls,
        video_urls: post.video_urls,
    })?;
    info!("post-create: {} (post {})", author, id);

    storage
        .get_post(id)?
        .ok_or_else(|| Error::NotFound(format!("post {id}")))
}

/// The author's posts newest first, enriched like feed entries.
pub fn posts_by_user(storage: &Storage, username: &str) -> Result<Vec<FeedPost>> {
    let mut result = Vec::new();
    for post in storage.list_posts_by_authors(&[username.to_string()])? {
        result.push(enrich_post(storage, post)?);
    }
    Ok(result)
}

/// Delete a post with its comments, likes, media and hashtag links.
pub fn delete_post(storage: &Storage, post_id: i64) -> Result<()> {
    if !storage.delete_post(post_id)? {
        return Err(Error::NotFound(format!("post {post_id}")));
    }
    info!("post-delete: post {}", post_id);
    Ok(())
}

/// Ids of posts carrying `tag`, newest first.
pub fn posts_with_hashtag(storage: &Storage, tag: &str) -> Result<Vec<i64>> {
    match normalize_hashtag(tag) {
        Some(tag) => Ok(storage.list_post_ids_with_hashtag(&tag)?),
        None => Ok(Vec::new()),
    }
}
