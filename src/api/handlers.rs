/// API request handlers
use std::sync::Arc;

use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use tracing::error;
use tracing::info;

use crate::api::types::ErrorResponse;
use crate::api::types::HealthResponse;
use crate::api::types::UserIdQuery;
use crate::models::Username;
use crate::resolver::Fetch;
use crate::resolver::Resolver;
use crate::TikidError;

/// Shared application state
pub struct AppState<F> {
    pub resolver: Arc<Resolver<F>>,
}

impl<F> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<F: Fetch> AppState<F> {
    pub fn new(resolver: Resolver<F>) -> Self {
        Self {
            resolver: Arc::new(resolver),
        }
    }
}

/// Health check handler
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Resolve a username (GET /api/userid?username=...)
///
/// 200 with both ids, 400 for a missing username, 404 when every strategy
/// is exhausted, 500 when the resolution task itself fails.
pub async fn get_user_id<F: Fetch + 'static>(
    State(state): State<AppState<F>>,
    Query(params): Query<UserIdQuery>,
) -> Response {
    info!("GET /api/userid?username={:?}", params.username);

    let raw = params.username.unwrap_or_default();
    let username = match Username::parse(&raw) {
        Ok(username) => username,
        Err(e) => return error_response(&e),
    };

    let resolver = Arc::clone(&state.resolver);
    let task = tokio::spawn(async move { resolver.resolve_username(&username).await });

    match task.await {
        Ok(resolution) => match resolution.into_identity() {
            Ok(identity) => (StatusCode::OK, Json(identity)).into_response(),
            Err(e) => error_response(&e),
        },
        Err(e) => error_response(&TikidError::Internal(format!("resolution task failed: {e}"))),
    }
}

/// CORS preflight for /api/userid
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

fn error_response(err: &TikidError) -> Response {
    if err.is_expected() {
        info!("{}", err);
    } else {
        error!("{}", err);
    }
    (err.status_code(), Json(ErrorResponse::new(err.to_string()))).into_response()
}
