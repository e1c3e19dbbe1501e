//! Single outbound fetch with a browser-like request profile

use std::future::Future;
use std::sync::Arc;

use rand::Rng;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use reqwest::header::ACCEPT;
use reqwest::header::ACCEPT_LANGUAGE;
use reqwest::header::COOKIE;
use reqwest::header::REFERER;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;
use tracing::warn;

use crate::config::FetchConfig;
use crate::errors::Result;
use crate::errors::TikidError;

/// Upper bound (exclusive) of the random tracking cookie value
const TRACKING_COOKIE_MAX: u64 = 10_000_000_000_000_000;

/// Payload an endpoint is expected to return; selects the `Accept` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Html,
    Json,
}

/// Per-strategy request shape layered on top of [`FetchConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestProfile {
    pub kind: PayloadKind,
    pub referer: String,
    pub extra_headers: Vec<(&'static str, String)>,
}

impl RequestProfile {
    pub fn html(referer: impl Into<String>) -> Self {
        Self {
            kind: PayloadKind::Html,
            referer: referer.into(),
            extra_headers: Vec::new(),
        }
    }

    pub fn json(referer: impl Into<String>) -> Self {
        Self {
            kind: PayloadKind::Json,
            referer: referer.into(),
            extra_headers: Vec::new(),
        }
    }

    /// Add a header; `name` must be lowercase
    #[must_use]
    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.extra_headers.push((name, value.into()));
        self
    }
}

/// Body of a response with status below 400
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPayload {
    pub status: u16,
    pub body: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("upstream returned status {0}")]
    Status(u16),
    #[error("network error: {0}")]
    Network(String),
}

pub type FetchOutcome = std::result::Result<FetchedPayload, FetchError>;

/// Transport used by the resolution strategies
pub trait Fetch: Send + Sync {
    /// Perform one GET; statuses >= 400 are failures
    fn fetch(
        &self,
        url: &str,
        profile: &RequestProfile,
    ) -> impl Future<Output = FetchOutcome> + Send;
}

impl<T: Fetch> Fetch for Arc<T> {
    fn fetch(
        &self,
        url: &str,
        profile: &RequestProfile,
    ) -> impl Future<Output = FetchOutcome> + Send {
        (**self).fetch(url, profile)
    }
}

/// Produces the `Cookie` header value from the configured cookie name
pub type CookieGenerator = fn(&str) -> String;

/// A fresh random tracking cookie so requests do not share a session
pub fn random_tracking_cookie(name: &str) -> String {
    let value = rand::rng().random_range(0..TRACKING_COOKIE_MAX);
    format!("{name}={value};")
}

/// `reqwest`-backed fetcher
pub struct HttpFetcher {
    client: Client,
    config: FetchConfig,
    cookie: CookieGenerator,
}

impl HttpFetcher {
    /// Create a fetcher with the configured timeout
    ///
    /// # Errors
    /// - HTTP client build errors (invalid TLS backend configuration)
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TikidError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            config,
            cookie: random_tracking_cookie,
        })
    }

    /// Replace the cookie generator (deterministic values in tests)
    #[must_use]
    pub fn with_cookie_generator(mut self, cookie: CookieGenerator) -> Self {
        self.cookie = cookie;
        self
    }

    /// Headers sent for `profile`
    pub fn headers_for(&self, profile: &RequestProfile) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let accept = match profile.kind {
            PayloadKind::Html => &self.config.html_accept,
            PayloadKind::Json => &self.config.json_accept,
        };
        let cookie = (self.cookie)(&self.config.tracking_cookie);

        let mut fixed = vec![
            (USER_AGENT, self.config.user_agent.as_str()),
            (ACCEPT, accept.as_str()),
            (REFERER, profile.referer.as_str()),
            (COOKIE, cookie.as_str()),
        ];
        if profile.kind == PayloadKind::Html {
            fixed.push((ACCEPT_LANGUAGE, self.config.accept_language.as_str()));
        }

        for (name, value) in fixed {
            match HeaderValue::from_str(value) {
                Ok(value) => {
                    headers.insert(name, value);
                }
                Err(e) => warn!("Skipping invalid {} header: {}", name, e),
            }
        }

        for (name, value) in &profile.extra_headers {
            match (HeaderName::try_from(*name), HeaderValue::from_str(value)) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!("Skipping invalid header {}", name),
            }
        }

        headers
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str, profile: &RequestProfile) -> FetchOutcome {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .headers(self.headers_for(profile))
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await.map_err(classify)?;
        Ok(FetchedPayload { status, body })
    }
}

fn classify(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(error.to_string())
    }
}
