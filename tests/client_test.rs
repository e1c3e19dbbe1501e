mod common;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use common::closed_addr;
use common::endpoints;
use common::sigi_page;
use common::spawn_server;
use common::ScriptedFetcher;
use tikid::api::build_app;
use tikid::api::handlers::AppState;
use tikid::client::BackendClient;
use tikid::client::LookupSource;
use tikid::resolver::FetchError;
use tikid::AppConfig;
use tikid::IdentityResult;
use tikid::Resolver;
use tikid::TikidError;

fn client(
    backend: std::net::SocketAddr,
    fallback: &Arc<ScriptedFetcher>,
) -> BackendClient<Arc<ScriptedFetcher>> {
    BackendClient::new(&AppConfig::default(), Arc::clone(fallback))
        .unwrap()
        .with_backend_url(format!("http://{backend}/"))
}

#[tokio::test]
async fn test_backend_answers() {
    let urls = endpoints("johndoe");
    let backend_fetcher = ScriptedFetcher::new().respond(
        &urls.structured_api[0],
        r#"{"user":{"id":"555","secUid":"MS4w"}}"#,
    );
    let state = AppState::new(Resolver::new(&AppConfig::default(), backend_fetcher));
    let addr = spawn_server(build_app(state, true)).await;
    let fallback = Arc::new(ScriptedFetcher::new());

    let lookup = client(addr, &fallback).lookup("@johndoe").await.unwrap();

    assert_eq!(lookup.source, LookupSource::Backend);
    assert_eq!(
        lookup.identity,
        IdentityResult::new(Some("555".into()), Some("MS4w".into()))
    );
    assert!(fallback.calls().is_empty());
}

#[tokio::test]
async fn test_unreachable_backend_uses_degraded_path() {
    let urls = endpoints("jane.doe");
    let fallback = Arc::new(
        ScriptedFetcher::new()
            .fail(&urls.degraded[0], FetchError::Timeout)
            .respond(
                &urls.degraded[1],
                sigi_page(r#"{"x":{"id":"777","uniqueId":"jane.doe","secUid":"S-777"}}"#),
            ),
    );

    let lookup = client(closed_addr().await, &fallback)
        .lookup("https://www.tiktok.com/@jane.doe")
        .await
        .unwrap();

    assert_eq!(lookup.source, LookupSource::Degraded);
    // The degraded path only reports userId
    assert_eq!(lookup.identity, IdentityResult::with_user_id("777"));
    assert_eq!(fallback.calls(), urls.degraded);
}

#[tokio::test]
async fn test_backend_not_found_then_degraded_fails() {
    let state = AppState::new(Resolver::new(&AppConfig::default(), ScriptedFetcher::new()));
    let addr = spawn_server(build_app(state, true)).await;
    let urls = endpoints("ghost");
    // secUid alone is not enough for the degraded path
    let fallback = Arc::new(ScriptedFetcher::new().respond(&urls.degraded[0], r#""secUid":"S""#));

    let err = client(addr, &fallback).lookup("ghost").await.unwrap_err();

    assert!(matches!(err, TikidError::NotFound(_)));
    assert_eq!(fallback.calls(), urls.degraded);
}

#[tokio::test]
async fn test_query_backend_reports_not_found() {
    let state = AppState::new(Resolver::new(&AppConfig::default(), ScriptedFetcher::new()));
    let addr = spawn_server(build_app(state, true)).await;
    let fallback = Arc::new(ScriptedFetcher::new());
    let username = tikid::Username::parse("ghost").unwrap();

    let err = client(addr, &fallback)
        .query_backend(&username)
        .await
        .unwrap_err();

    assert!(matches!(err, TikidError::NotFound(ref message) if message.contains("ghost")));
}

#[tokio::test]
async fn test_empty_input_contacts_nothing() {
    let fallback = Arc::new(ScriptedFetcher::new());

    let err = client(closed_addr().await, &fallback)
        .lookup("")
        .await
        .unwrap_err();

    assert!(matches!(err, TikidError::Validation(_)));
    assert!(fallback.calls().is_empty());
}

#[tokio::test]
async fn test_backend_empty_ids_uses_degraded_path() {
    let backend = Router::new().route(
        "/api/userid",
        get(|| async { r#"{"userId":"","secUid":""}"# }),
    );
    let addr = spawn_server(backend).await;
    let urls = endpoints("blank");
    let fallback = Arc::new(ScriptedFetcher::new().respond(&urls.degraded[0], r#""userId":"314159""#));

    let lookup = client(addr, &fallback).lookup("blank").await.unwrap();

    assert_eq!(lookup.source, LookupSource::Degraded);
    assert_eq!(lookup.identity, IdentityResult::with_user_id("314159"));
}
