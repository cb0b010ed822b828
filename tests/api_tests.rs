//! End-to-end tests for the campusnet-web REST API.
//!
//! Each test seeds a fresh database in a temp directory, serves the router
//! on an ephemeral port and drives it with blocking HTTP calls.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Barrier};
use std::thread;

use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::oneshot;

use campusnet::storage::{db_path, Storage, UserRow};
use campusnet::web::router::build_router;
use campusnet::web::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn seed_database(path: &Path) {
    let storage = Storage::open(path).expect("open storage");
    for (username, first, last) in [
        ("alice", "Alice", "Smith"),
        ("bob", "Bob", "Jones"),
        ("carol", "Carol", "White"),
    ] {
        storage
            .upsert_user(&UserRow {
                username: username.to_string(),
                first_name: first.to_string(),
                last_name: last.to_string(),
                profile_photo: Some(format!("photos/{username}.png")),
                major: Some("Engineering".to_string()),
            })
            .expect("seed user");
    }
}

/// The returned directory holds the database; keep it alive for the test.
async fn start_server() -> (String, oneshot::Sender<()>, TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = db_path(dir.path());
    seed_database(&path);
    let router = build_router(AppState::shared(path));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind server");
    let addr: SocketAddr = listener.local_addr().expect("local addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .ok();
    });
    (format!("http://{addr}"), shutdown_tx, dir)
}

fn read_body(resp: ureq::Response) -> Value {
    let text = resp.into_string().unwrap_or_default();
    if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::Null)
    }
}

fn get(base_url: &str, path: &str) -> (u16, Value) {
    match ureq::get(&format!("{base_url}{path}")).call() {
        Ok(r) => (r.status(), read_body(r)),
        Err(ureq::Error::Status(code, r)) => (code, read_body(r)),
        Err(e) => panic!("request failed: {e}"),
    }
}

fn send(method: &str, base_url: &str, path: &str, body: Value) -> (u16, Value) {
    match ureq::request(method, &format!("{base_url}{path}"))
        .set("Content-Type", "application/json")
        .send_string(&body.to_string())
    {
        Ok(r) => (r.status(), read_body(r)),
        Err(ureq::Error::Status(code, r)) => (code, read_body(r)),
        Err(e) => panic!("request failed: {e}"),
    }
}

fn post(base_url: &str, path: &str, body: Value) -> (u16, Value) {
    send("POST", base_url, path, body)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_database() {
    let (base_url, shutdown_tx, _dir) = start_server().await;

    let (status, body) = tokio::task::spawn_blocking(move || get(&base_url, "/api/health"))
        .await
        .unwrap();
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);

    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn user_lookup() {
    let (base_url, shutdown_tx, _dir) = start_server().await;

    tokio::task::spawn_blocking(move || {
        let (status, body) = get(&base_url, "/api/users/alice");
        assert_eq!(status, 200);
        assert_eq!(body["name"], "Alice Smith");

        let (status, body) = get(&base_url, "/api/users/nobody");
        assert_eq!(status, 404);
        assert!(body["error"].is_string());
    })
    .await
    .unwrap();

    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn connection_lifecycle_and_feed() {
    let (base_url, shutdown_tx, _dir) = start_server().await;

    tokio::task::spawn_blocking(move || {
        let pair = json!({ "from": "alice", "to": "bob" });

        let (status, _) = post(&base_url, "/api/connections/connect", pair.clone());
        assert_eq!(status, 200);
        let (_, body) = get(&base_url, "/api/connections/status?from=bob&to=alice");
        assert_eq!(body["status"], "received_request");

        let (_, requests) = get(&base_url, "/api/connections/requests?username=bob");
        assert_eq!(requests[0]["from_username"], "alice");
        assert_eq!(requests[0]["name"], "Alice Smith");

        // Accepting in the wrong direction finds nothing.
        let (status, _) = post(
            &base_url,
            "/api/connections/accept",
            json!({ "from": "bob", "to": "alice" }),
        );
        assert_eq!(status, 404);

        let (status, _) = post(&base_url, "/api/connections/accept", pair.clone());
        assert_eq!(status, 200);
        let (_, body) = get(&base_url, "/api/connections/status?from=alice&to=bob");
        assert_eq!(body["status"], "connected");
        let (_, connections) = get(&base_url, "/api/connections/user/bob");
        assert_eq!(connections[0]["username"], "alice");

        let (status, created) = post(
            &base_url,
            "/api/posts",
            json!({ "username": "bob", "text": "Study group tonight", "hashtags": ["#Exams"] }),
        );
        assert_eq!(status, 201);
        assert_eq!(created["hashtags"], json!(["exams"]));
        post(
            &base_url,
            "/api/posts",
            json!({ "username": "alice", "text": "Hello campus" }),
        );

        let (status, feed) = get(&base_url, "/api/posts/feed?username=alice");
        assert_eq!(status, 200);
        let authors: Vec<&str> = feed
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["username"].as_str().unwrap())
            .collect();
        assert_eq!(authors.len(), 2);
        assert!(authors.contains(&"bob"));

        let post_id = created["id"].as_i64().unwrap();
        let (_, tagged) = get(&base_url, "/api/posts/hashtag/EXAMS");
        assert_eq!(tagged, json!([post_id]));

        let (status, _) = post(&base_url, "/api/connections/disconnect", pair.clone());
        assert_eq!(status, 200);
        let (_, feed) = get(&base_url, "/api/posts/feed?username=alice");
        assert_eq!(feed.as_array().unwrap().len(), 1);
        assert_eq!(feed[0]["username"], "alice");
    })
    .await
    .unwrap();

    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn likes_and_comment_tree() {
    let (base_url, shutdown_tx, _dir) = start_server().await;

    tokio::task::spawn_blocking(move || {
        let (_, created) = post(
            &base_url,
            "/api/posts",
            json!({ "username": "alice", "text": "Rate my poster" }),
        );
        let post_id = created["id"].as_i64().unwrap();

        let like = json!({ "username": "bob", "liked": true });
        let (_, body) = post(&base_url, &format!("/api/posts/{post_id}/like"), like.clone());
        assert_eq!(body["like_count"], 1);
        let (_, body) = post(&base_url, &format!("/api/posts/{post_id}/like"), like);
        assert_eq!(body["like_count"], 1);
        let (_, liked) = get(&base_url, "/api/posts/user-likes?username=bob");
        assert_eq!(liked, json!([post_id]));

        let (status, comment) = post(
            &base_url,
            &format!("/api/posts/{post_id}/comments"),
            json!({ "username": "bob", "text": "Love it" }),
        );
        assert_eq!(status, 201);
        let comment_id = comment["id"].as_i64().unwrap();

        let (status, reply) = post(
            &base_url,
            &format!("/api/posts/{post_id}/comments/{comment_id}/replies"),
            json!({ "username": "alice", "text": "Thanks!" }),
        );
        assert_eq!(status, 201);
        let reply_id = reply["id"].as_i64().unwrap();

        let (status, _) = post(
            &base_url,
            &format!("/api/posts/{post_id}/comments/{reply_id}/replies"),
            json!({ "username": "bob", "text": "Too deep" }),
        );
        assert_eq!(status, 400);

        let (_, body) = post(
            &base_url,
            &format!("/api/posts/comments/{comment_id}/like"),
            json!({ "username": "carol", "liked": true }),
        );
        assert_eq!(body["like_count"], 1);

        let (_, tree) = get(&base_url, &format!("/api/posts/{post_id}/comments"));
        assert_eq!(tree.as_array().unwrap().len(), 1);
        assert_eq!(tree[0]["like_count"], 1);
        assert_eq!(tree[0]["author"]["name"], "Bob Jones");
        assert_eq!(tree[0]["replies"][0]["text"], "Thanks!");

        let (status, _) = post(
            &base_url,
            "/api/posts/999/like",
            json!({ "username": "bob", "liked": true }),
        );
        assert_eq!(status, 404);

        let (status, _) = send("DELETE", &base_url, &format!("/api/posts/{post_id}"), json!({}));
        assert_eq!(status, 204);
        let (_, liked) = get(&base_url, "/api/posts/user-comment-likes?username=carol");
        assert_eq!(liked, json!([]));
    })
    .await
    .unwrap();

    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn gig_to_review_flow() {
    let (base_url, shutdown_tx, _dir) = start_server().await;

    tokio::task::spawn_blocking(move || {
        let (status, gig) = post(
            &base_url,
            "/api/marketplace",
            json!({
                "username": "alice",
                "title": "Move a sofa",
                "description": "Third floor, no lift",
                "category": "Moving",
                "price": 40.0,
                "location": "North dorms",
                "duration": "1h"
            }),
        );
        assert_eq!(status, 201);
        assert_eq!(gig["status"], "Active");
        let gig_id = gig["id"].as_i64().unwrap();

        for user in ["bob", "carol"] {
            let (_, body) = post(
                &base_url,
                &format!("/api/marketplace/{gig_id}/interest"),
                json!({ "username": user, "interested": true }),
            );
            assert_eq!(body["interested"], true);
        }
        let (_, ids) = get(&base_url, "/api/marketplace/user-interests?username=bob");
        assert_eq!(ids, json!([gig_id]));

        let (status, _) = post(
            &base_url,
            &format!("/api/marketplace/{gig_id}/accept-interest"),
            json!({ "username": "bob" }),
        );
        assert_eq!(status, 200);
        let (_, users) = get(&base_url, &format!("/api/marketplace/{gig_id}/interested-users"));
        assert_eq!(users[0]["status"], "accepted");
        assert_eq!(users[1]["status"], "rejected");
        let (_, accepted) = get(&base_url, &format!("/api/marketplace/{gig_id}/accepted-users"));
        assert_eq!(accepted, json!(["bob"]));

        // carol was not accepted and cannot confirm as the worker.
        let confirm = format!("/api/marketplace/{gig_id}/confirm-completion");
        let (status, _) = post(&base_url, &confirm, json!({ "username": "carol", "role": "worker" }));
        assert_eq!(status, 400);

        let (_, body) = post(&base_url, &confirm, json!({ "username": "alice", "role": "provider" }));
        assert_eq!(body["status"], "Active");
        let (_, body) = get(&base_url, &format!("/api/reviews/can-review?gig_id={gig_id}&username=bob"));
        assert_eq!(body["can_review"], false);

        let (_, body) = post(&base_url, &confirm, json!({ "username": "bob", "role": "worker" }));
        assert_eq!(body["status"], "Completed");

        let (_, body) = get(&base_url, &format!("/api/reviews/can-review?gig_id={gig_id}&username=bob"));
        assert_eq!(body["can_review"], true);

        let review = json!({
            "reviewer_username": "bob",
            "reviewee_username": "alice",
            "rating": 5,
            "communication_rating": 5,
            "quality_rating": 4,
            "value_rating": 5,
            "reliability_rating": 5,
            "comment": "Clear instructions"
        });
        let (status, stored) = post(&base_url, &format!("/api/reviews/gig/{gig_id}"), review.clone());
        assert_eq!(status, 201);
        assert_eq!(stored["is_worker_review"], true);

        let (status, _) = post(&base_url, &format!("/api/reviews/gig/{gig_id}"), review);
        assert_eq!(status, 409);

        let (_, body) = get(&base_url, &format!("/api/reviews/can-review?gig_id={gig_id}&username=bob"));
        assert_eq!(body["can_review"], false);

        let (_, stats) = get(&base_url, "/api/reviews/user/alice/stats");
        assert_eq!(stats["review_count"], 1);
        assert_eq!(stats["avg_rating"], 5.0);

        let (_, gig) = get(&base_url, &format!("/api/marketplace/{gig_id}"));
        assert_eq!(gig["rating"], 5.0);

        let (_, completed) = get(&base_url, "/api/marketplace/user/alice/completed");
        assert_eq!(completed[0]["id"], gig_id);
        assert_eq!(completed[0]["can_review"], true);

        // The worker of a completed gig is fixed.
        let (status, _) = post(
            &base_url,
            &format!("/api/marketplace/{gig_id}/accept-interest"),
            json!({ "username": "carol" }),
        );
        assert_eq!(status, 400);
        let (_, accepted) = get(&base_url, &format!("/api/marketplace/{gig_id}/accepted-users"));
        assert_eq!(accepted, json!(["bob"]));

        // Completed gigs cannot be reopened by an update.
        let (status, _) = send(
            "PUT",
            &base_url,
            &format!("/api/marketplace/{gig_id}"),
            json!({ "title": "Move a sofa", "status": "Active" }),
        );
        assert_eq!(status, 400);
    })
    .await
    .unwrap();

    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn missing_gig_is_not_found() {
    let (base_url, shutdown_tx, _dir) = start_server().await;

    tokio::task::spawn_blocking(move || {
        let (status, _) = get(&base_url, "/api/marketplace/4242");
        assert_eq!(status, 404);
        let (status, _) = post(
            &base_url,
            "/api/marketplace/4242/interest",
            json!({ "username": "bob", "interested": true }),
        );
        assert_eq!(status, 404);
        let (status, _) = post(
            &base_url,
            "/api/marketplace/4242/accept-interest",
            json!({ "username": "bob" }),
        );
        assert_eq!(status, 404);
    })
    .await
    .unwrap();

    shutdown_tx.send(()).ok();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_likes_are_counted_once() {
    let (base_url, shutdown_tx, _dir) = start_server().await;

    tokio::task::spawn_blocking(move || {
        let (_, created) = post(
            &base_url,
            "/api/posts",
            json!({ "username": "alice", "text": "Race me" }),
        );
        let post_id = created["id"].as_i64().unwrap();
        let path = format!("/api/posts/{post_id}/like");

        let barrier = Arc::new(Barrier::new(6));
        let handles: Vec<_> = (0..6)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                let base_url = base_url.clone();
                let path = path.clone();
                thread::spawn(move || {
                    barrier.wait();
                    post(&base_url, &path, json!({ "username": "bob", "liked": true })).0
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 200);
        }

        let (_, body) = post(&base_url, &path, json!({ "username": "carol", "liked": true }));
        assert_eq!(body["like_count"], 2);
    })
    .await
    .unwrap();

    shutdown_tx.send(()).ok();
}
