//! Home feed: the viewer's posts merged with their connections' posts,
//! newest first, each enriched with engagement and author fields.
//!
//! The feed is a pure read. Counts and comment trees are queried fresh on
//! every build.

use serde::Serialize;
use tracing::debug;

use crate::connections::connected_usernames;
use crate::engagement::{comment_tree, CommentView};
use crate::error::Result;
use crate::identity::IdentityLookup;
use crate::storage::{LikeTarget, PostRow, Storage};

#[derive(Debug, Clone, Serialize)]
pub struct FeedPost {
    pub id: i64,
    pub username: String,
    pub text: String,
    pub created_at: u64,
    pub hashtags: Vec<String>,
    pub image_urls: Vec<String>,
    pub video_urls: Vec<String>,
    pub like_count: u32,
    /// `None` when the author no longer resolves.
    pub author_name: Option<String>,
    pub author_profile_photo: Option<String>,
    pub author_major: Option<String>,
    pub comments: Vec<CommentView>,
}

/// Build the feed for `viewer`.
pub fn build_feed(storage: &Storage, viewer: &str) -> Result<Vec<FeedPost>> {
    let mut posts = storage.list_posts_by_authors(&[viewer.to_string()])?;
    let connections = connected_usernames(storage, viewer)?;
    posts.extend(storage.list_posts_by_authors(&connections)?);

    // Stable: equal timestamps keep own-then-connections, newest id first.
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    debug!(
        "feed: {} post(s) for {} from {} connection(s)",
        posts.len(),
        viewer,
        connections.len()
    );

    let mut feed = Vec::with_capacity(posts.len());
    for post in posts {
        feed.push(enrich_post(storage, post)?);
    }
    Ok(feed)
}

/// Attach like count, author display fields and the comment tree.
pub fn enrich_post(storage: &Storage, post: PostRow) -> Result<FeedPost> {
    let like_count = storage.count_likes(LikeTarget::Post(post.id))?;
    let comments = comment_tree(storage, post.id)?;
    let (author_name, author_profile_photo, author_major) = match storage.resolve(&post.username)?
    {
        Some(profile) => (
            Some(profile.display_name()),
            profile.profile_photo,
            profile.major,
        ),
        None => (None, None, None),
    };

    Ok(FeedPost {
        id: post.id,
        username: post.username,
        text: post.text,
        created_at: post.created_at,
        hashtags: post.hashtags,
        image_urls: post.image_urls,
        video_urls: post.video_urls,
        like_count,
        author_name,
        author_profile_photo,
        author_major,
        comments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connections::{accept, disconnect, request_connection};
    use crate::engagement::{add_comment, toggle_like};
    use crate::storage::{NewPostRow, UserRow};

    fn test_storage() -> Storage {
        let storage = Storage::open_in_memory().unwrap();
        for name in ["alice", "bob", "carol"] {
            storage
                .upsert_user(&UserRow {
                    username: name.to_string(),
                    first_name: name.to_string(),
                    last_name: "Lastname".to_string(),
                    profile_photo: Some(format!("photos/{name}.png")),
                    major: Some("Biology".to_string()),
                })
                .unwrap();
        }
        storage
    }

    fn post(storage: &Storage, author: &str, text: &str, created_at: u64) -> i64 {
        storage
            .insert_post(&NewPostRow {
                username: author.to_string(),
                text: text.to_string(),
                created_at,
                ..Default::default()
            })
            .unwrap()
    }

    fn connect(storage: &Storage, a: &str, b: &str) {
        request_connection(storage, a, b, 1).unwrap();
        accept(storage, a, b, 2).unwrap();
    }

    fn texts(feed: &[FeedPost]) -> Vec<&str> {
        feed.iter().map(|p| p.text.as_str()).collect()
    }

    #[test]
    fn test_feed_without_connections_is_own_posts() {
        let storage = test_storage();
        post(&storage, "alice", "mine", 10);
        post(&storage, "bob", "stranger", 20);

        let feed = build_feed(&storage, "alice").unwrap();
        assert_eq!(texts(&feed), vec!["mine"]);
    }

    #[test]
    fn test_feed_merges_and_sorts_by_time() {
        let storage = test_storage();
        connect(&storage, "alice", "bob");
        connect(&storage, "carol", "alice");
        post(&storage, "alice", "a10", 10);
        post(&storage, "bob", "b30", 30);
        post(&storage, "carol", "c20", 20);
        post(&storage, "alice", "a40", 40);
        post(&storage, "bob", "b5", 5);

        let feed = build_feed(&storage, "alice").unwrap();
        assert_eq!(texts(&feed), vec!["a40", "b30", "c20", "a10", "b5"]);
        for pair in feed.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[test]
    fn test_equal_timestamps_keep_own_posts_first() {
        let storage = test_storage();
        connect(&storage, "alice", "bob");
        post(&storage, "bob", "bob-same", 10);
        post(&storage, "alice", "alice-same", 10);

        let feed = build_feed(&storage, "alice").unwrap();
        assert_eq!(texts(&feed), vec!["alice-same", "bob-same"]);
    }

    #[test]
    fn test_disconnect_hides_posts_on_next_build() {
        let storage = test_storage();
        connect(&storage, "alice", "bob");
        post(&storage, "bob", "bob-post", 10);
        assert_eq!(build_feed(&storage, "alice").unwrap().len(), 1);

        disconnect(&storage, "alice", "bob").unwrap();
        assert!(build_feed(&storage, "alice").unwrap().is_empty());
    }

    #[test]
    fn test_pending_requests_do_not_share_posts() {
        let storage = test_storage();
        request_connection(&storage, "alice", "bob", 1).unwrap();
        post(&storage, "bob", "bob-post", 10);
        assert!(build_feed(&storage, "alice").unwrap().is_empty());
    }

    #[test]
    fn test_enrichment_and_unresolvable_author() {
        let storage = test_storage();
        request_connection(&storage, "alice", "ghost", 1).unwrap();
        accept(&storage, "alice", "ghost", 2).unwrap();
        let own = post(&storage, "alice", "mine", 10);
        post(&storage, "ghost", "boo", 20);
        toggle_like(&storage, LikeTarget::Post(own), "bob", true, 30).unwrap();
        add_comment(&storage, own, "bob", "nice", 31).unwrap();

        let feed = build_feed(&storage, "alice").unwrap();
        assert_eq!(feed.len(), 2);

        let ghost = &feed[0];
        assert_eq!(ghost.username, "ghost");
        assert!(ghost.author_name.is_none());
        assert!(ghost.author_profile_photo.is_none());

        let mine = &feed[1];
        assert_eq!(mine.author_name.as_deref(), Some("alice Lastname"));
        assert_eq!(mine.author_profile_photo.as_deref(), Some("photos/alice.png"));
        assert_eq!(mine.author_major.as_deref(), Some("Biology"));
        assert_eq!(mine.like_count, 1);
        assert_eq!(mine.comments.len(), 1);
        assert_eq!(mine.comments[0].author.name, "bob Lastname");
    }

    #[test]
    fn test_feed_reflects_latest_state() {
        let storage = test_storage();
        let own = post(&storage, "alice", "mine", 10);
        assert_eq!(build_feed(&storage, "alice").unwrap()[0].like_count, 0);
        toggle_like(&storage, LikeTarget::Post(own), "bob", true, 11).unwrap();
        assert_eq!(build_feed(&storage, "alice").unwrap()[0].like_count, 1);
    }
}
