#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;

use axum::Router;
use tikid::models::render_template;
use tikid::resolver::fetcher::FetchOutcome;
use tikid::resolver::fetcher::FetchedPayload;
use tikid::resolver::Fetch;
use tikid::resolver::FetchError;
use tikid::resolver::RequestProfile;
use tikid::AppConfig;

/// In-memory transport: scripted responses per URL, 404 for anything else
#[derive(Default)]
pub struct ScriptedFetcher {
    responses: HashMap<String, FetchOutcome>,
    calls: Mutex<Vec<(String, RequestProfile)>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses.insert(
            url.into(),
            Ok(FetchedPayload {
                status: 200,
                body: body.into(),
            }),
        );
        self
    }

    pub fn fail(mut self, url: impl Into<String>, error: FetchError) -> Self {
        self.responses.insert(url.into(), Err(error));
        self
    }

    /// URLs requested so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    pub fn profile_for(&self, url: &str) -> Option<RequestProfile> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(called, _)| called == url)
            .map(|(_, profile)| profile.clone())
    }
}

impl Fetch for ScriptedFetcher {
    async fn fetch(&self, url: &str, profile: &RequestProfile) -> FetchOutcome {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), profile.clone()));
        self.responses
            .get(url)
            .cloned()
            .unwrap_or(Err(FetchError::Status(404)))
    }
}

/// Transport that fails in a way no strategy anticipates
pub struct PanickingFetcher;

impl Fetch for PanickingFetcher {
    async fn fetch(&self, _url: &str, _profile: &RequestProfile) -> FetchOutcome {
        panic!("transport bug");
    }
}

/// Default endpoint URLs for `username`, per strategy
pub struct Endpoints {
    pub structured_api: Vec<String>,
    pub share: Vec<String>,
    pub raw_html: Vec<String>,
    pub degraded: Vec<String>,
}

pub fn endpoints(username: &str) -> Endpoints {
    let config = AppConfig::default();
    let render = |templates: &[String]| -> Vec<String> {
        templates
            .iter()
            .map(|t| render_template(t, username))
            .collect()
    };
    Endpoints {
        structured_api: render(&config.endpoints.structured_api),
        share: render(&config.endpoints.share),
        raw_html: render(&config.endpoints.raw_html),
        degraded: render(&config.endpoints.degraded),
    }
}

/// Profile page with a `SIGI_STATE` blob holding the given users mapping
pub fn sigi_page(users_json: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><script id="SIGI_STATE" type="application/json">{{"UserModule":{{"users":{users_json}}}}}</script></head><body></body></html>"#
    )
}

/// Serve `app` on an ephemeral local port
pub async fn spawn_server(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// An address nothing is listening on
pub async fn closed_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
