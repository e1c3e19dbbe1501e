//! Username normalization
//!
//! Accepts a raw handle, `@handle`, or a profile URL and reduces it to the bare
//! username token used by every endpoint template.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Domain marker that makes scheme-less input count as a URL
const PLATFORM_DOMAIN: &str = "tiktok.com/";

static SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("SCHEME_RE should compile")
});

static PATH_HANDLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/@@?([A-Za-z0-9._\-]+)").expect("PATH_HANDLE_RE should compile")
});

static INLINE_HANDLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@@?([A-Za-z0-9._\-]+)").expect("INLINE_HANDLE_RE should compile")
});

/// Reduce free-form input to a username token
///
/// Returns an empty string for empty or whitespace-only input; callers treat
/// that as a validation failure.
pub fn normalize_username(raw: &str) -> String {
    let input = raw.trim();
    if input.is_empty() {
        return String::new();
    }

    if looks_like_url(input) {
        if let Some(handle) = handle_from_url(input).or_else(|| capture(&PATH_HANDLE_RE, input)) {
            return handle;
        }
    }

    // A doubled leading '@' loses exactly one
    if let Some(rest) = input.strip_prefix('@') {
        if rest.starts_with('@') {
            return rest.to_string();
        }
    }

    if let Some(handle) = capture(&INLINE_HANDLE_RE, input) {
        return handle;
    }

    input.strip_prefix('@').unwrap_or(input).trim().to_string()
}

fn looks_like_url(input: &str) -> bool {
    SCHEME_RE.is_match(input) || input.to_lowercase().contains(PLATFORM_DOMAIN)
}

fn handle_from_url(input: &str) -> Option<String> {
    let parsed = if SCHEME_RE.is_match(input) {
        Url::parse(input)
    } else {
        Url::parse(&format!("https://{input}"))
    }
    .ok()?;

    capture(&PATH_HANDLE_RE, parsed.path())
}

fn capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_handle_is_unchanged() {
        assert_eq!(normalize_username("johndoe"), "johndoe");
        assert_eq!(normalize_username("  Jane.Doe_99  "), "Jane.Doe_99");
    }

    #[test]
    fn test_strips_exactly_one_leading_at() {
        assert_eq!(normalize_username("@johndoe"), "johndoe");
        assert_eq!(normalize_username("@@johndoe"), "@johndoe");
    }

    #[test]
    fn test_leading_at_with_trailing_text() {
        assert_eq!(normalize_username("@jane.doe (creator)"), "jane.doe");
        assert_eq!(normalize_username("@someone and friends"), "someone");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_username(""), "");
        assert_eq!(normalize_username("   \t\n"), "");
        assert_eq!(normalize_username("@"), "");
    }

    #[test]
    fn test_profile_urls() {
        assert_eq!(
            normalize_username("https://www.tiktok.com/@jane.doe?lang=en"),
            "jane.doe"
        );
        assert_eq!(
            normalize_username("https://www.tiktok.com/@@jane.doe/video/123"),
            "jane.doe"
        );
        assert_eq!(normalize_username("www.tiktok.com/@some_user"), "some_user");
        assert_eq!(normalize_username("m.tiktok.com/@@double-at"), "double-at");
    }

    #[test]
    fn test_unparseable_url_uses_raw_regex() {
        // Invalid port makes URL parsing fail; the raw scan still finds the handle.
        assert_eq!(
            normalize_username("https://www.tiktok.com:99999/@fallback.user"),
            "fallback.user"
        );
    }

    #[test]
    fn test_url_without_handle_falls_through() {
        assert_eq!(
            normalize_username("https://www.tiktok.com/discover"),
            "https://www.tiktok.com/discover"
        );
    }

    #[test]
    fn test_inline_mention() {
        assert_eq!(normalize_username("follow @creator.name today"), "creator.name");
        assert_eq!(normalize_username("see @@creator"), "creator");
    }
}
