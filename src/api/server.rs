//! HTTP server implementation

use axum::http::header::ACCESS_CONTROL_ALLOW_HEADERS;
use axum::http::header::ACCESS_CONTROL_ALLOW_METHODS;
use axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN;
use axum::http::HeaderValue;
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::resolver::Fetch;
use crate::resolver::HttpFetcher;
use crate::resolver::Resolver;
use crate::Result;

/// Assemble the application router
///
/// CORS headers are set on every response, including the 204 preflight, so
/// browsers on any origin can call the endpoint.
pub fn build_app<F: Fetch + 'static>(state: AppState<F>, enable_cors: bool) -> Router {
    let mut app = Router::new()
        .nest("/api", routes::api_routes(state))
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        app = app
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("GET, OPTIONS"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("Content-Type"),
            ));
    }

    app
}

/// Start the API server
pub async fn serve_api(config: &AppConfig, host: String, port: u16, enable_cors: bool) -> Result<()> {
    info!("🚀 Starting tikid API server...");

    let fetcher = HttpFetcher::new(config.fetch.clone())?;
    let state = AppState::new(Resolver::new(config, fetcher));
    let app = build_app(state, enable_cors);

    if enable_cors {
        info!("✅ CORS enabled");
    }

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 API server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET     /api/health              - Health check");
    info!("  GET     /api/userid?username=... - Resolve userId/secUid");
    info!("  OPTIONS /api/userid              - CORS preflight");

    axum::serve(listener, app).await?;

    Ok(())
}
