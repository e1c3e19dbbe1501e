//! Reduced HTML path used when the backend cannot be reached
//!
//! Only mirror/proxy endpoints are tried and only `userId` is reported.

use tracing::debug;
use tracing::info;

use super::extract::extract_ids;
use super::fetcher::Fetch;
use super::fetcher::RequestProfile;
use crate::config::AppConfig;
use crate::models::EndpointCandidate;
use crate::models::Username;

pub struct DegradedFallback<F> {
    fetcher: F,
    templates: Vec<String>,
    referer: String,
}

impl<F: Fetch> DegradedFallback<F> {
    pub fn new(config: &AppConfig, fetcher: F) -> Self {
        Self {
            fetcher,
            templates: config.endpoints.degraded.clone(),
            referer: format!("{}/", config.fetch.platform_origin.trim_end_matches('/')),
        }
    }

    /// First `userId` any degraded endpoint yields
    pub async fn lookup(&self, username: &Username) -> Option<String> {
        let profile = RequestProfile::html(self.referer.clone());

        for candidate in EndpointCandidate::from_templates(&self.templates, username) {
            let body = match self.fetcher.fetch(&candidate.url, &profile).await {
                Ok(payload) => payload.body,
                Err(e) => {
                    debug!("[degraded] {} failed: {}", candidate.url, e);
                    continue;
                }
            };

            let identity = extract_ids(Some(&body), username).user_id_only();
            if let Some(user_id) = identity.user_id() {
                info!("[degraded] {} resolved {}", candidate.url, username);
                return Some(user_id.to_string());
            }
            debug!("[degraded] {} returned no userId", candidate.url);
        }

        None
    }
}
