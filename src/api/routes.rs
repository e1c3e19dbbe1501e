//! API route definitions

use axum::routing::get;
use axum::Router;

use super::handlers;
use super::handlers::AppState;
use crate::resolver::Fetch;

/// Create RESTful API router
pub fn api_routes<F: Fetch + 'static>(state: AppState<F>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Username resolution
        .route(
            "/userid",
            get(handlers::get_user_id::<F>).options(handlers::preflight),
        )
        .with_state(state)
}
