//! The three resolution tactics
//!
//! Each strategy owns an ordered list of endpoint templates, a request
//! profile, and an extraction step. It walks its endpoints strictly in order
//! and stops at the first one that yields a `userId` or `secUid`.

use std::fmt;

use serde_json::Value;
use tracing::debug;
use tracing::info;

use super::extract::extract_ids;
use super::extract::id_string;
use super::extract::ExtractError;
use super::fetcher::Fetch;
use super::fetcher::FetchError;
use super::fetcher::RequestProfile;
use crate::config::AppConfig;
use crate::models::EndpointCandidate;
use crate::models::IdentityResult;
use crate::models::Username;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// JSON `api/user/detail` endpoints
    StructuredApi,
    /// JSON `node/share/user` endpoints
    ShareEndpoint,
    /// Profile pages parsed by the HTML extractor
    RawHtml,
}

impl StrategyKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::StructuredApi => "structured-api",
            Self::ShareEndpoint => "share-endpoint",
            Self::RawHtml => "raw-html",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// JSON pointer paths tried in order for each identifier
#[derive(Debug, Clone, Copy)]
pub struct FieldPaths {
    pub user_id: &'static [&'static str],
    pub sec_uid: &'static [&'static str],
}

/// Known `api/user/detail` response shapes, newest first
pub const STRUCTURED_API_PATHS: FieldPaths = FieldPaths {
    user_id: &[
        "/user/id",
        "/user/userId",
        "/userInfo/user/id",
        "/userInfo/user/userId",
    ],
    sec_uid: &["/user/secUid", "/userInfo/user/secUid"],
};

/// Known `node/share/user` envelopes
pub const SHARE_ENDPOINT_PATHS: FieldPaths = FieldPaths {
    user_id: &[
        "/userData/userId",
        "/userInfo/user/userId",
        "/userInfo/user/id",
        "/user/userId",
        "/user/id",
        "/body/userData/userId",
    ],
    sec_uid: &[
        "/userData/secUid",
        "/userInfo/user/secUid",
        "/user/secUid",
        "/body/userData/secUid",
    ],
};

impl FieldPaths {
    /// First non-empty value per identifier
    pub fn extract(&self, data: &Value) -> IdentityResult {
        let first = |paths: &[&str]| {
            paths
                .iter()
                .find_map(|path| data.pointer(path).and_then(id_string))
        };
        IdentityResult::new(first(self.user_id), first(self.sec_uid))
    }

    /// Parse a JSON body and extract ids; malformed JSON is an error the
    /// strategy treats as "nothing from this endpoint"
    pub fn extract_from_body(&self, body: &str) -> Result<IdentityResult, ExtractError> {
        if body.trim().is_empty() {
            return Err(ExtractError::EmptyPayload);
        }
        let data: Value = serde_json::from_str(body)?;
        Ok(self.extract(&data))
    }
}

/// What happened at one endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Found,
    NoIds,
    ParseFailed(String),
    FetchFailed(FetchError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointAttempt {
    pub strategy: StrategyKind,
    pub url: String,
    pub outcome: AttemptOutcome,
}

/// Successful endpoint and the ids it produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyHit {
    pub identity: IdentityResult,
    pub endpoint: EndpointCandidate,
}

/// Result of walking one strategy's endpoint list
#[derive(Debug, Clone, Default)]
pub struct StrategyRun {
    pub hit: Option<StrategyHit>,
    pub attempts: Vec<EndpointAttempt>,
}

#[derive(Debug, Clone)]
pub struct ResolutionStrategy {
    kind: StrategyKind,
    templates: Vec<String>,
    platform_origin: String,
}

impl ResolutionStrategy {
    pub fn new(
        kind: StrategyKind,
        templates: Vec<String>,
        platform_origin: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            templates,
            platform_origin: platform_origin.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build a strategy from the configured endpoint templates
    pub fn from_config(kind: StrategyKind, config: &AppConfig) -> Self {
        let templates = match kind {
            StrategyKind::StructuredApi => &config.endpoints.structured_api,
            StrategyKind::ShareEndpoint => &config.endpoints.share,
            StrategyKind::RawHtml => &config.endpoints.raw_html,
        };
        Self::new(kind, templates.clone(), &config.fetch.platform_origin)
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    pub fn candidates(&self, username: &Username) -> Vec<EndpointCandidate> {
        EndpointCandidate::from_templates(&self.templates, username)
    }

    pub fn request_profile(&self, username: &Username) -> RequestProfile {
        let profile_referer = format!("{}/@{}", self.platform_origin, username.encoded());
        match self.kind {
            StrategyKind::StructuredApi => RequestProfile::json(profile_referer),
            StrategyKind::ShareEndpoint => RequestProfile::json(profile_referer)
                .with_header("x-requested-with", "XMLHttpRequest"),
            StrategyKind::RawHtml => RequestProfile::html(format!("{}/", self.platform_origin)),
        }
    }

    /// Extraction step for one response body
    pub fn extract(&self, body: &str, username: &Username) -> Result<IdentityResult, ExtractError> {
        match self.kind {
            StrategyKind::StructuredApi => STRUCTURED_API_PATHS.extract_from_body(body),
            StrategyKind::ShareEndpoint => SHARE_ENDPOINT_PATHS.extract_from_body(body),
            StrategyKind::RawHtml => Ok(extract_ids(Some(body), username)),
        }
    }

    /// Try each endpoint in order until one yields an identifier
    pub async fn run<F: Fetch>(&self, fetcher: &F, username: &Username) -> StrategyRun {
        let profile = self.request_profile(username);
        let mut run = StrategyRun::default();

        for candidate in self.candidates(username) {
            let fetched = fetcher.fetch(&candidate.url, &profile).await;
            let outcome = match fetched {
                Err(e) => {
                    debug!("[{}] {} failed: {}", self.kind, candidate.url, e);
                    AttemptOutcome::FetchFailed(e)
                }
                Ok(payload) => match self.extract(&payload.body, username) {
                    Ok(identity) if identity.is_found() => {
                        info!("[{}] {} resolved {}", self.kind, candidate.url, username);
                        run.attempts.push(EndpointAttempt {
                            strategy: self.kind,
                            url: candidate.url.clone(),
                            outcome: AttemptOutcome::Found,
                        });
                        run.hit = Some(StrategyHit {
                            identity,
                            endpoint: candidate,
                        });
                        return run;
                    }
                    Ok(_) => {
                        debug!("[{}] {} returned no ids", self.kind, candidate.url);
                        AttemptOutcome::NoIds
                    }
                    Err(e) => {
                        debug!("[{}] {} unparseable: {}", self.kind, candidate.url, e);
                        AttemptOutcome::ParseFailed(e.to_string())
                    }
                },
            };
            run.attempts.push(EndpointAttempt {
                strategy: self.kind,
                url: candidate.url,
                outcome,
            });
        }

        run
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_structured_paths_current_shape() {
        let data = json!({"user": {"id": "555", "secUid": "MS4w"}});
        let ids = STRUCTURED_API_PATHS.extract(&data);
        assert_eq!(ids.user_id(), Some("555"));
        assert_eq!(ids.sec_uid(), Some("MS4w"));
    }

    #[test]
    fn test_structured_paths_legacy_shape_with_numeric_id() {
        let data = json!({"userInfo": {"user": {"userId": 6789012345678u64, "secUid": "S"}}});
        let ids = STRUCTURED_API_PATHS.extract(&data);
        assert_eq!(ids.user_id(), Some("6789012345678"));
        assert_eq!(ids.sec_uid(), Some("S"));
    }

    #[test]
    fn test_structured_paths_ignore_empty_strings() {
        let data = json!({"user": {"id": "", "userId": "42"}});
        assert_eq!(STRUCTURED_API_PATHS.extract(&data).user_id(), Some("42"));
    }

    #[test]
    fn test_share_paths_envelopes() {
        let data = json!({"body": {"userData": {"userId": "9", "secUid": "B"}}});
        let ids = SHARE_ENDPOINT_PATHS.extract(&data);
        assert_eq!(ids, IdentityResult::new(Some("9".into()), Some("B".into())));

        let data = json!({"userData": {"secUid": "only-sec"}});
        assert_eq!(
            SHARE_ENDPOINT_PATHS.extract(&data),
            IdentityResult::with_sec_uid("only-sec")
        );
    }

    #[test]
    fn test_malformed_json_body() {
        assert!(matches!(
            STRUCTURED_API_PATHS.extract_from_body("Title: TikTok\n\nMarkdown Content:"),
            Err(ExtractError::MalformedJson(_))
        ));
        assert!(matches!(
            SHARE_ENDPOINT_PATHS.extract_from_body(""),
            Err(ExtractError::EmptyPayload)
        ));
    }

    #[test]
    fn test_candidates_are_rendered_in_order() {
        let strategy = ResolutionStrategy::from_config(StrategyKind::RawHtml, &AppConfig::default());
        let username = Username::parse("jane.doe").unwrap();
        let candidates = strategy.candidates(&username);

        assert_eq!(candidates.len(), 4);
        assert_eq!(
            candidates[0].url,
            "https://www.tiktok.com/@jane.doe?is_copy_url=1&is_from_webapp=v1"
        );
        assert!(candidates[3].url.starts_with("https://r.jina.ai/"));
        assert!(candidates.iter().enumerate().all(|(i, c)| c.rank == i));
    }

    #[test]
    fn test_request_profiles() {
        let config = AppConfig::default();
        let username = Username::parse("someone").unwrap();

        let share = ResolutionStrategy::from_config(StrategyKind::ShareEndpoint, &config)
            .request_profile(&username);
        assert_eq!(share.referer, "https://www.tiktok.com/@someone");
        assert_eq!(
            share.extra_headers,
            vec![("x-requested-with", "XMLHttpRequest".to_string())]
        );

        let html = ResolutionStrategy::from_config(StrategyKind::RawHtml, &config)
            .request_profile(&username);
        assert_eq!(html.referer, "https://www.tiktok.com/");
    }
}
