//! Client-side lookup: ask the backend, fall back to the degraded path

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use reqwest::StatusCode;
use tracing::info;
use tracing::warn;

use crate::api::types::ErrorResponse;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::errors::TikidError;
use crate::models::IdentityResult;
use crate::models::Username;
use crate::resolver::DegradedFallback;
use crate::resolver::Fetch;

/// Which path answered a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    Backend,
    Degraded,
}

impl fmt::Display for LookupSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend => f.write_str("backend"),
            Self::Degraded => f.write_str("degraded fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub identity: IdentityResult,
    pub source: LookupSource,
}

pub struct BackendClient<F> {
    http: Client,
    backend_url: String,
    fallback: DegradedFallback<F>,
}

impl<F: Fetch> BackendClient<F> {
    /// Create a client for `config.client.backend_url`
    ///
    /// # Errors
    /// - HTTP client build errors
    pub fn new(config: &AppConfig, fallback_fetcher: F) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.fetch.timeout_secs))
            .build()
            .map_err(|e| TikidError::HttpError(e.to_string()))?;

        Ok(Self {
            http,
            backend_url: config.backend_url().trim_end_matches('/').to_string(),
            fallback: DegradedFallback::new(config, fallback_fetcher),
        })
    }

    #[must_use]
    pub fn with_backend_url(mut self, backend_url: impl Into<String>) -> Self {
        self.backend_url = backend_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Call `GET /api/userid` on the backend
    pub async fn query_backend(&self, username: &Username) -> Result<IdentityResult> {
        let url = format!("{}/api/userid", self.backend_url);
        let response = self
            .http
            .get(&url)
            .query(&[("username", username.as_str())])
            .send()
            .await
            .map_err(|e| TikidError::HttpError(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::OK {
            return response
                .json::<IdentityResult>()
                .await
                .map_err(|e| TikidError::HttpError(e.to_string()));
        }

        let message = response
            .json::<ErrorResponse>()
            .await
            .map_or_else(|_| status.to_string(), |body| body.error);
        if status == StatusCode::NOT_FOUND {
            Err(TikidError::NotFound(message))
        } else {
            Err(TikidError::HttpError(format!(
                "backend returned {status}: {message}"
            )))
        }
    }

    /// Resolve `raw_input`, using the degraded path whenever the backend
    /// call fails for any reason
    ///
    /// # Errors
    /// - `Validation` for empty input (nothing is contacted)
    /// - `NotFound` when the backend and the degraded path both fail
    pub async fn lookup(&self, raw_input: &str) -> Result<Lookup> {
        let username = Username::parse(raw_input)?;

        match self.query_backend(&username).await {
            Ok(identity) if identity.is_found() => {
                return Ok(Lookup {
                    identity,
                    source: LookupSource::Backend,
                });
            }
            Ok(_) => warn!("Backend returned no ids for {}, trying degraded path", username),
            Err(e) => warn!("Backend lookup failed for {}: {}, trying degraded path", username, e),
        }

        match self.fallback.lookup(&username).await {
            Some(user_id) => {
                info!("Degraded path resolved {}", username);
                Ok(Lookup {
                    identity: IdentityResult::with_user_id(user_id),
                    source: LookupSource::Degraded,
                })
            }
            None => Err(TikidError::NotFound(format!(
                "could not resolve '{username}' via backend or degraded fallback"
            ))),
        }
    }
}
