//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the `tikid` CLI

use crate::client::Lookup;
use crate::models::IdentityResult;
use crate::resolver::strategy::AttemptOutcome;
use crate::resolver::strategy::EndpointAttempt;
use crate::resolver::Resolution;

/// Print both identifiers
pub fn print_identity(identity: &IdentityResult) {
    println!("  userId: {}", identity.user_id().unwrap_or("N/A"));
    println!("  secUid: {}", identity.sec_uid().unwrap_or("N/A"));
}

/// Print an in-process resolution
pub fn print_resolution(resolution: &Resolution) {
    println!("👤 Username: {}", resolution.username);
    if let Some(source) = &resolution.resolved_by {
        println!("✅ Resolved via {} ({})", source.strategy, source.endpoint.url);
        print_identity(&resolution.identity);
    } else {
        println!(
            "❌ Not found after {} endpoint attempts",
            resolution.attempts.len()
        );
    }
}

/// Print every endpoint attempt in order
pub fn print_attempts(attempts: &[EndpointAttempt]) {
    println!("🔎 Attempts:");
    for attempt in attempts {
        let outcome = match &attempt.outcome {
            AttemptOutcome::Found => "found".to_string(),
            AttemptOutcome::NoIds => "no ids".to_string(),
            AttemptOutcome::ParseFailed(e) => format!("parse failed: {e}"),
            AttemptOutcome::FetchFailed(e) => format!("fetch failed: {e}"),
        };
        println!("  - [{}] {} -> {}", attempt.strategy, attempt.url, outcome);
    }
}

/// Print a client lookup
pub fn print_lookup(lookup: &Lookup) {
    println!("✅ Answered by {}", lookup.source);
    print_identity(&lookup.identity);
}
