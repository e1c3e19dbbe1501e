//! Fixed-order fallback across the three strategies

use tracing::info;
use tracing::warn;

use super::fetcher::Fetch;
use super::strategy::EndpointAttempt;
use super::strategy::ResolutionStrategy;
use super::strategy::StrategyKind;
use crate::config::AppConfig;
use crate::models::EndpointCandidate;
use crate::models::IdentityResult;
use crate::models::Username;
use crate::Result;
use crate::TikidError;

/// Progress of a single resolution
///
/// `NotStarted → TryingStructuredApi → TryingShareEndpoint → TryingRawHtml`,
/// leaving for `Resolved` as soon as a strategy yields an id, or ending in
/// `Exhausted` after the last one misses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    NotStarted,
    TryingStructuredApi,
    TryingShareEndpoint,
    TryingRawHtml,
    Resolved,
    Exhausted,
}

impl ResolutionState {
    /// Strategy run while in this state
    pub const fn strategy(self) -> Option<StrategyKind> {
        match self {
            Self::TryingStructuredApi => Some(StrategyKind::StructuredApi),
            Self::TryingShareEndpoint => Some(StrategyKind::ShareEndpoint),
            Self::TryingRawHtml => Some(StrategyKind::RawHtml),
            Self::NotStarted | Self::Resolved | Self::Exhausted => None,
        }
    }

    /// Next state when the current strategy found nothing
    pub const fn advance(self) -> Self {
        match self {
            Self::NotStarted => Self::TryingStructuredApi,
            Self::TryingStructuredApi => Self::TryingShareEndpoint,
            Self::TryingShareEndpoint => Self::TryingRawHtml,
            Self::TryingRawHtml | Self::Exhausted => Self::Exhausted,
            Self::Resolved => Self::Resolved,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Exhausted)
    }
}

/// Where a resolved identity came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBy {
    pub strategy: StrategyKind,
    pub endpoint: EndpointCandidate,
}

/// Final report of one resolution call
#[derive(Debug, Clone)]
pub struct Resolution {
    pub username: Username,
    pub identity: IdentityResult,
    pub state: ResolutionState,
    pub resolved_by: Option<ResolvedBy>,
    pub attempts: Vec<EndpointAttempt>,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        self.state == ResolutionState::Resolved
    }

    /// The identity, or `NotFound` when every strategy was exhausted
    pub fn into_identity(self) -> Result<IdentityResult> {
        if self.is_resolved() {
            Ok(self.identity)
        } else {
            Err(TikidError::NotFound(format!(
                "could not extract userId/secUid for '{}'",
                self.username
            )))
        }
    }
}

/// Runs the strategies sequentially against a [`Fetch`] transport
pub struct Resolver<F> {
    fetcher: F,
    structured_api: ResolutionStrategy,
    share_endpoint: ResolutionStrategy,
    raw_html: ResolutionStrategy,
}

impl<F: Fetch> Resolver<F> {
    pub fn new(config: &AppConfig, fetcher: F) -> Self {
        Self {
            fetcher,
            structured_api: ResolutionStrategy::from_config(StrategyKind::StructuredApi, config),
            share_endpoint: ResolutionStrategy::from_config(StrategyKind::ShareEndpoint, config),
            raw_html: ResolutionStrategy::from_config(StrategyKind::RawHtml, config),
        }
    }

    fn strategy(&self, kind: StrategyKind) -> &ResolutionStrategy {
        match kind {
            StrategyKind::StructuredApi => &self.structured_api,
            StrategyKind::ShareEndpoint => &self.share_endpoint,
            StrategyKind::RawHtml => &self.raw_html,
        }
    }

    /// Normalize `raw_input` and resolve it
    ///
    /// # Errors
    /// - `Validation` when the input normalizes to an empty username; no
    ///   endpoint is contacted in that case
    pub async fn resolve(&self, raw_input: &str) -> Result<Resolution> {
        let username = Username::parse(raw_input)?;
        Ok(self.resolve_username(&username).await)
    }

    /// Walk the state machine for an already-normalized username
    pub async fn resolve_username(&self, username: &Username) -> Resolution {
        let mut state = ResolutionState::NotStarted;
        let mut identity = IdentityResult::empty();
        let mut resolved_by = None;
        let mut attempts = Vec::new();

        while !state.is_terminal() {
            let Some(kind) = state.strategy() else {
                state = state.advance();
                continue;
            };

            info!("Resolving {} via {}", username, kind);
            let run = self.strategy(kind).run(&self.fetcher, username).await;
            attempts.extend(run.attempts);

            state = match run.hit {
                Some(hit) => {
                    identity = identity.merge(hit.identity);
                    resolved_by = Some(ResolvedBy {
                        strategy: kind,
                        endpoint: hit.endpoint,
                    });
                    ResolutionState::Resolved
                }
                None => state.advance(),
            };
        }

        if state == ResolutionState::Exhausted {
            warn!(
                "All strategies exhausted for {} after {} attempts",
                username,
                attempts.len()
            );
        } else {
            info!("Resolved {}: {}", username, identity);
        }

        Resolution {
            username: username.clone(),
            identity,
            state,
            resolved_by,
            attempts,
        }
    }
}
