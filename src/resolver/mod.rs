//! Multi-strategy username resolution
//!
//! - `normalize`: free-form input to a username token
//! - `extract`: ids from profile HTML and embedded state
//! - `fetcher`: one outbound request with the platform-mimicking profile
//! - `strategy`: the structured-API, share-endpoint and raw-HTML tactics
//! - `orchestrator`: fixed-order fallback across strategies
//! - `degraded`: reduced path for when the backend is unreachable

pub mod degraded;
pub mod extract;
pub mod fetcher;
pub mod normalize;
pub mod orchestrator;
pub mod strategy;

pub use degraded::DegradedFallback;
pub use extract::extract_ids;
pub use fetcher::Fetch;
pub use fetcher::FetchError;
pub use fetcher::HttpFetcher;
pub use fetcher::RequestProfile;
pub use normalize::normalize_username;
pub use orchestrator::Resolution;
pub use orchestrator::ResolutionState;
pub use orchestrator::Resolver;
pub use strategy::ResolutionStrategy;
pub use strategy::StrategyKind;
