//! Identifier extraction from profile HTML
//!
//! The embedded `SIGI_STATE` hydration blob is preferred. When it is missing,
//! malformed, or carries no ids, a fixed sequence of regex scans over the raw
//! markup is tried; the first pattern that matches wins.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::models::IdentityResult;
use crate::models::Username;

/// How far past `"uniqueId":"<name>"` the matching `"id"` may appear
const UNIQUE_ID_WINDOW: usize = 800;

static SIGI_STATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<script id="SIGI_STATE"[^>]*>(.*?)</script>"#)
        .expect("SIGI_STATE_RE should compile")
});

static USER_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""userId":"(\d+)""#).expect("USER_ID_RE should compile"));

static LOOSE_USER_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"userId\W+([0-9]{5,})").expect("LOOSE_USER_ID_RE should compile")
});

static SEC_UID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""secUid":"([^"]+)""#).expect("SEC_UID_RE should compile"));

/// Why a payload produced no identifiers
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("no embedded state block")]
    MissingState,
    #[error("malformed JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),
    #[error("embedded state has no user records")]
    MissingUsers,
    #[error("empty payload")]
    EmptyPayload,
}

/// Extract `(userId, secUid)` from a profile page
///
/// Never fails: every parse problem degrades to an empty result.
pub fn extract_ids(html: Option<&str>, username: &Username) -> IdentityResult {
    let Some(html) = html.filter(|h| !h.trim().is_empty()) else {
        return IdentityResult::empty();
    };

    match ids_from_embedded_state(html, username) {
        Ok(ids) if ids.is_found() => return ids,
        Ok(_) => debug!("embedded state for {} carried no ids", username),
        Err(e) => debug!("embedded state unusable for {}: {}", username, e),
    }

    ids_from_patterns(html, username)
}

/// Read ids from the `SIGI_STATE` blob's `UserModule.users` mapping
///
/// Prefers the record whose `uniqueId` (or key) matches `username`, otherwise
/// takes the first record in document order.
pub fn ids_from_embedded_state(
    html: &str,
    username: &Username,
) -> Result<IdentityResult, ExtractError> {
    let blob = SIGI_STATE_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(ExtractError::MissingState)?;

    let state: Value = serde_json::from_str(blob)?;
    let users = state
        .pointer("/UserModule/users")
        .and_then(Value::as_object)
        .filter(|users| !users.is_empty())
        .ok_or(ExtractError::MissingUsers)?;

    let matched = users.iter().find(|(key, record)| {
        let handle = record
            .get("uniqueId")
            .and_then(Value::as_str)
            .filter(|h| !h.is_empty())
            .unwrap_or(key.as_str());
        username.matches(handle)
    });

    let record = match matched {
        Some((_, record)) => record,
        None => {
            // Best effort: single-profile pages usually embed one record.
            debug!("no state record matches {}, using first entry", username);
            users.values().next().ok_or(ExtractError::MissingUsers)?
        }
    };

    Ok(record_ids(record))
}

/// Positional regex scans, in fixed priority order
pub fn ids_from_patterns(html: &str, username: &Username) -> IdentityResult {
    if let Some(id) = unique_id_adjacent_id(html, username) {
        return IdentityResult::with_user_id(id);
    }
    if let Some(id) = first_capture(&USER_ID_RE, html) {
        return IdentityResult::with_user_id(id);
    }
    if let Some(id) = first_capture(&LOOSE_USER_ID_RE, html) {
        return IdentityResult::with_user_id(id);
    }
    if let Some(sec_uid) = first_capture(&SEC_UID_RE, html) {
        return IdentityResult::with_sec_uid(sec_uid);
    }
    IdentityResult::empty()
}

/// Ids of a single user record (`id` wins over `userId`)
pub fn record_ids(record: &Value) -> IdentityResult {
    let user_id = record
        .get("id")
        .and_then(id_string)
        .or_else(|| record.get("userId").and_then(id_string));
    let sec_uid = record.get("secUid").and_then(id_string);
    IdentityResult::new(user_id, sec_uid)
}

/// Render a JSON id as a string without going through a float
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn unique_id_adjacent_id(html: &str, username: &Username) -> Option<String> {
    let pattern = format!(
        r#""uniqueId":"(?i:{})"(?s:.){{0,{}}}?"id":"(\d+)""#,
        regex::escape(username.as_str()),
        UNIQUE_ID_WINDOW
    );
    match Regex::new(&pattern) {
        Ok(re) => first_capture(&re, html),
        Err(e) => {
            debug!("skipping uniqueId scan for {}: {}", username, e);
            None
        }
    }
}

fn first_capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
