//! Axum router construction.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::web::handlers;
use crate::web::state::SharedState;

/// Build the complete Axum router with all API routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        // Health
        .route("/api/health", get(handlers::health::health_handler))
        // Users API
        .route(
            "/api/users/:username",
            get(handlers::users::get_user_handler),
        )
        // Connections API
        .route(
            "/api/connections/status",
            get(handlers::connections::status_handler),
        )
        .route(
            "/api/connections/connect",
            post(handlers::connections::connect_handler),
        )
        .route(
            "/api/connections/accept",
            post(handlers::connections::accept_handler),
        )
        .route(
            "/api/connections/reject",
            post(handlers::connections::reject_handler),
        )
        .route(
            "/api/connections/disconnect",
            post(handlers::connections::disconnect_handler),
        )
        .route(
            "/api/connections/requests",
            get(handlers::connections::pending_requests_handler),
        )
        .route(
            "/api/connections/user/:username",
            get(handlers::connections::list_connections_handler),
        )
        // Posts API
        .route("/api/posts", post(handlers::posts::create_post_handler))
        .route("/api/posts/feed", get(handlers::posts::feed_handler))
        .route(
            "/api/posts/user/:username",
            get(handlers::posts::user_posts_handler),
        )
        .route(
            "/api/posts/hashtag/:tag",
            get(handlers::posts::hashtag_posts_handler),
        )
        .route(
            "/api/posts/user-likes",
            get(handlers::posts::user_post_likes_handler),
        )
        .route(
            "/api/posts/user-comment-likes",
            get(handlers::posts::user_comment_likes_handler),
        )
        .route(
            "/api/posts/:post_id",
            delete(handlers::posts::delete_post_handler),
        )
        .route(
            "/api/posts/:post_id/like",
            post(handlers::posts::like_post_handler),
        )
        .route(
            "/api/posts/:post_id/comments",
            get(handlers::posts::list_comments_handler).post(handlers::posts::add_comment_handler),
        )
        .route(
            "/api/posts/:post_id/comments/:comment_id/replies",
            post(handlers::posts::add_reply_handler),
        )
        .route(
            "/api/posts/comments/:comment_id/like",
            post(handlers::posts::like_comment_handler),
        )
        // Marketplace API
        .route(
            "/api/marketplace",
            get(handlers::marketplace::list_gigs_handler)
                .post(handlers::marketplace::create_gig_handler),
        )
        .route(
            "/api/marketplace/search",
            get(handlers::marketplace::search_gigs_handler),
        )
        .route(
            "/api/marketplace/user-interests",
            get(handlers::marketplace::user_interests_handler),
        )
        .route(
            "/api/marketplace/user/:username",
            get(handlers::marketplace::user_gigs_handler),
        )
        .route(
            "/api/marketplace/user/:username/completed",
            get(handlers::marketplace::completed_gigs_handler),
        )
        .route(
            "/api/marketplace/category/:category",
            get(handlers::marketplace::category_gigs_handler),
        )
        .route(
            "/api/marketplace/accepted/:username",
            get(handlers::marketplace::accepted_gigs_handler),
        )
        .route(
            "/api/marketplace/:gig_id",
            get(handlers::marketplace::get_gig_handler)
                .put(handlers::marketplace::update_gig_handler)
                .delete(handlers::marketplace::delete_gig_handler),
        )
        .route(
            "/api/marketplace/:gig_id/view",
            post(handlers::marketplace::record_view_handler),
        )
        .route(
            "/api/marketplace/:gig_id/respond",
            post(handlers::marketplace::record_response_handler),
        )
        .route(
            "/api/marketplace/:gig_id/interest",
            post(handlers::marketplace::toggle_interest_handler),
        )
        .route(
            "/api/marketplace/:gig_id/interested-users",
            get(handlers::marketplace::interested_users_handler),
        )
        .route(
            "/api/marketplace/:gig_id/accept-interest",
            post(handlers::marketplace::accept_interest_handler),
        )
        .route(
            "/api/marketplace/:gig_id/reject-interest",
            post(handlers::marketplace::reject_interest_handler),
        )
        .route(
            "/api/marketplace/:gig_id/accepted-users",
            get(handlers::marketplace::accepted_users_handler),
        )
        .route(
            "/api/marketplace/:gig_id/confirm-completion",
            post(handlers::marketplace::confirm_completion_handler),
        )
        // Reviews API
        .route(
            "/api/reviews/gig/:gig_id",
            get(handlers::reviews::gig_reviews_handler)
                .post(handlers::reviews::create_review_handler),
        )
        .route(
            "/api/reviews/user/:username",
            get(handlers::reviews::user_reviews_handler),
        )
        .route(
            "/api/reviews/user/:username/stats",
            get(handlers::reviews::user_stats_handler),
        )
        .route(
            "/api/reviews/can-review",
            get(handlers::reviews::can_review_handler),
        )
        .with_state(state)
}
