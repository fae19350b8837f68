//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                  - Liveness
//! GET  /health/ready                            - Database ping
//!
//! # Auth (strict rate limit)
//! POST /auth/register | /auth/login | /auth/logout
//!
//! # Directory
//! GET  /api/shops?q=&lat=&lng=                  - Listing
//! GET  /api/shops/{id}                          - Detail
//! GET  /api/shops/{id}/reviews                  - Reviews with replies
//! POST /api/shops/{id}/reviews                  - Submit review
//! GET  /api/shops/{id}/reviews/mine             - Caller's review
//! GET|PUT|DELETE /api/shops/{id}/favorite       - Favorite state
//! GET|POST /api/shops/{id}/claim                - Claim status / submit
//! DELETE /api/claims/{id}                       - Delete own rejected claim
//! GET  /api/shops/{id}/update-requests/pending  - Pending diff
//! POST /api/shops/{id}/update-requests          - Submit edit
//! POST|DELETE /api/location                     - Report / clear position
//!
//! # Account, owner and admin
//! GET  /api/me | /api/me/reviews | /api/me/favorites
//! PATCH /api/me/reviews/{id}
//! GET  /api/owner/shops | /api/owner/shops/{id}/reviews
//! POST /api/owner/reviews/{id}/reply
//! PUT  /api/owner/replies/{id}
//! GET  /api/admin/summary | /api/admin/claims | /api/admin/update-requests
//! POST /api/admin/claims/{id}/approve|reject
//! POST /api/admin/update-requests/{id}/approve|reject
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod claims;
pub mod location;
pub mod owner;
pub mod shops;

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::from_fn,
    routing::{get, patch, post, put},
};
use tower_http::trace::TraceLayer;

use crate::middleware::{
    auth_rate_limiter, create_session_layer, request_id_middleware, security_headers_middleware,
    write_rate_limiter,
};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the shop directory routes router.
pub fn shop_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(shops::index))
        .route("/{id}", get(shops::show))
        .route("/{id}/reviews", get(shops::reviews).post(shops::create_review))
        .route("/{id}/reviews/mine", get(shops::my_review))
        .route(
            "/{id}/favorite",
            get(shops::favorite_state)
                .put(shops::add_favorite)
                .delete(shops::remove_favorite),
        )
        .route(
            "/{id}/claim",
            get(shops::claim_status).post(shops::submit_claim),
        )
        .route("/{id}/update-requests", post(shops::submit_update))
        .route("/{id}/update-requests/pending", get(shops::pending_update))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::profile))
        .route("/reviews", get(account::reviews))
        .route("/reviews/{id}", patch(account::edit_review))
        .route("/favorites", get(account::favorites))
}

/// Create the owner dashboard routes router.
pub fn owner_routes() -> Router<AppState> {
    Router::new()
        .route("/shops", get(owner::shops))
        .route("/shops/{id}/reviews", get(owner::shop_reviews))
        .route("/reviews/{id}/reply", post(owner::create_reply))
        .route("/replies/{id}", put(owner::update_reply))
}

/// Create the moderation dashboard routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/summary", get(admin::summary))
        .route("/claims", get(admin::claims))
        .route("/claims/{id}/approve", post(admin::approve_claim))
        .route("/claims/{id}/reject", post(admin::reject_claim))
        .route("/update-requests", get(admin::update_requests))
        .route("/update-requests/{id}/approve", post(admin::approve_update))
        .route("/update-requests/{id}/reject", post(admin::reject_update))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/shops", shop_routes())
        .route("/claims/{id}", axum::routing::delete(claims::delete_rejected))
        .route("/location", post(location::report).delete(location::clear))
        .nest("/me", account_routes())
        .nest("/owner", owner_routes())
        .nest("/admin", admin_routes())
}

/// Build the full application with its middleware stack.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.pool(), state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/auth", auth_routes().layer(auth_rate_limiter()))
        .nest("/api", api_routes().layer(write_rate_limiter()))
        .layer(from_fn(security_headers_middleware))
        .layer(session_layer)
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!("Readiness check failed: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
