//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{check_ins, grants, health, history, provisioning, redemptions};
use crate::state::AppState;

/// Maximum concurrent requests for ledger mutations.
/// Each one may hold a blocking thread while it waits on a row lock.
const LEDGER_MAX_CONCURRENT_REQUESTS: usize = 64;

/// Maximum concurrent requests for general API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Ledger (JWT auth, rate-limited)
/// - `POST /v1/grants` - Grant points from the caller's pool
/// - `PUT /v1/users/:id/balance` - Overwrite a balance (admin)
/// - `POST /v1/redemptions` - Spend the caller's points (user)
/// - `POST /v1/check-ins` - Check a scanned user into an event
///
/// ## Queries (JWT auth)
/// - `GET /v1/users/:id/transactions` - Transaction history
/// - `GET /v1/users/:id/audit` - Balance vs. ledger audit (admin)
/// - `GET /v1/grant-pools` - All grant pools (admin)
/// - `GET /v1/me/grant-pool` - The caller's grant pool
///
/// ## Provisioning (Service API Key auth)
/// - `POST /v1/admin/admins|facilitators|users|events` - Create records
/// - `DELETE /v1/admin/users/:id`, `DELETE /v1/admin/events/:id` - Soft-delete
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    // Build CORS layer
    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let ledger_routes = Router::new()
        .route("/grants", post(grants::grant))
        .route("/users/:id/balance", put(grants::set_balance))
        .route("/redemptions", post(redemptions::redeem))
        .route("/check-ins", post(check_ins::check_in))
        .layer(ConcurrencyLimitLayer::new(LEDGER_MAX_CONCURRENT_REQUESTS));

    let query_routes = Router::new()
        .route("/users/:id/transactions", get(history::list_transactions))
        .route("/users/:id/audit", get(history::audit_user))
        .route("/grant-pools", get(history::list_grant_pools))
        .route("/me/grant-pool", get(history::my_grant_pool))
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    let admin_routes = Router::new()
        .route("/admins", post(provisioning::create_admin))
        .route("/facilitators", post(provisioning::create_facilitator))
        .route("/users", post(provisioning::create_user))
        .route("/users/:id", delete(provisioning::delete_user))
        .route("/events", post(provisioning::create_event))
        .route("/events/:id", delete(provisioning::delete_event));

    let api_routes = Router::new()
        .merge(ledger_routes)
        .merge(query_routes)
        .nest("/admin", admin_routes);

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        .nest("/v1", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
