mod common;

use std::collections::BTreeMap;
use std::time::Duration;

use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Json;
use axum::Router;
use common::closed_addr;
use common::spawn_server;
use tikid::config::FetchConfig;
use tikid::resolver::Fetch;
use tikid::resolver::FetchError;
use tikid::resolver::HttpFetcher;
use tikid::resolver::RequestProfile;

async fn echo_headers(headers: HeaderMap) -> Json<BTreeMap<String, String>> {
    Json(
        headers
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect(),
    )
}

async fn upstream() -> std::net::SocketAddr {
    let app = Router::new()
        .route("/echo", get(echo_headers))
        .route("/gone", get(|| async { StatusCode::GONE }))
        .route("/moved", get(|| async { (StatusCode::NOT_MODIFIED, "") }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                "late"
            }),
        );
    spawn_server(app).await
}

fn fetcher(timeout_secs: u64) -> HttpFetcher {
    HttpFetcher::new(FetchConfig {
        timeout_secs,
        ..FetchConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_sends_request_profile() {
    let addr = upstream().await;
    let profile = RequestProfile::json("https://www.tiktok.com/@someone")
        .with_header("x-requested-with", "XMLHttpRequest");

    let payload = fetcher(15)
        .fetch(&format!("http://{addr}/echo"), &profile)
        .await
        .unwrap();

    assert_eq!(payload.status, 200);
    let headers: BTreeMap<String, String> = serde_json::from_str(&payload.body).unwrap();
    assert!(headers["user-agent"].starts_with("Mozilla/5.0"));
    assert_eq!(headers["accept"], "application/json, text/plain, */*");
    assert_eq!(headers["referer"], "https://www.tiktok.com/@someone");
    assert_eq!(headers["x-requested-with"], "XMLHttpRequest");
    assert!(headers["cookie"].starts_with("tt_webid_v2="));
}

#[tokio::test]
async fn test_cookie_differs_between_requests() {
    let addr = upstream().await;
    let fetcher = fetcher(15);
    let profile = RequestProfile::html("https://www.tiktok.com/");
    let url = format!("http://{addr}/echo");

    let first = fetcher.fetch(&url, &profile).await.unwrap().body;
    let second = fetcher.fetch(&url, &profile).await.unwrap().body;
    let cookie = |body: &str| -> String {
        let headers: BTreeMap<String, String> = serde_json::from_str(body).unwrap();
        headers["cookie"].clone()
    };

    assert_ne!(cookie(&first), cookie(&second));
}

#[tokio::test]
async fn test_error_status_is_failure() {
    let addr = upstream().await;
    let outcome = fetcher(15)
        .fetch(&format!("http://{addr}/gone"), &RequestProfile::html("https://www.tiktok.com/"))
        .await;

    assert_eq!(outcome, Err(FetchError::Status(410)));
}

#[tokio::test]
async fn test_3xx_is_left_to_caller() {
    let addr = upstream().await;
    let payload = fetcher(15)
        .fetch(&format!("http://{addr}/moved"), &RequestProfile::html("https://www.tiktok.com/"))
        .await
        .unwrap();

    assert_eq!(payload.status, 304);
    assert!(payload.body.is_empty());
}

#[tokio::test]
async fn test_timeout() {
    let addr = upstream().await;
    let outcome = fetcher(1)
        .fetch(&format!("http://{addr}/slow"), &RequestProfile::html("https://www.tiktok.com/"))
        .await;

    assert_eq!(outcome, Err(FetchError::Timeout));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let addr = closed_addr().await;
    let outcome = fetcher(15)
        .fetch(&format!("http://{addr}/echo"), &RequestProfile::html("https://www.tiktok.com/"))
        .await;

    assert!(matches!(outcome, Err(FetchError::Network(_))));
}
