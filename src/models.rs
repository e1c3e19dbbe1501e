//! Request-scoped data types shared by the resolver, the API and the CLI

use std::fmt;

use percent_encoding::utf8_percent_encode;
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;
use serde::Deserialize;
use serde::Serialize;

use crate::resolver::normalize::normalize_username;
use crate::Result;
use crate::TikidError;

/// Placeholder substituted into endpoint URL templates
pub const USERNAME_PLACEHOLDER: &str = "{username}";

/// Bytes escaped when a username is substituted into a URL (URI component rules)
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// The pair of platform identifiers a resolution produces
///
/// Empty strings are treated as absent. Values are never overwritten once set;
/// [`IdentityResult::merge`] only fills fields that are still empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "IdentityFields")]
pub struct IdentityResult {
    user_id: Option<String>,
    sec_uid: Option<String>,
}

/// Wire shape of [`IdentityResult`]; deserialized values pass through `new`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityFields {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    sec_uid: Option<String>,
}

impl From<IdentityFields> for IdentityResult {
    fn from(fields: IdentityFields) -> Self {
        Self::new(fields.user_id, fields.sec_uid)
    }
}

impl IdentityResult {
    pub fn new(user_id: Option<String>, sec_uid: Option<String>) -> Self {
        Self {
            user_id: user_id.filter(|v| !v.is_empty()),
            sec_uid: sec_uid.filter(|v| !v.is_empty()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_user_id(user_id: impl Into<String>) -> Self {
        Self::new(Some(user_id.into()), None)
    }

    pub fn with_sec_uid(sec_uid: impl Into<String>) -> Self {
        Self::new(None, Some(sec_uid.into()))
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn sec_uid(&self) -> Option<&str> {
        self.sec_uid.as_deref()
    }

    /// A result counts as found when either identifier is present
    pub fn is_found(&self) -> bool {
        self.user_id.is_some() || self.sec_uid.is_some()
    }

    /// Fill empty fields from `later`; populated fields are kept as-is
    #[must_use]
    pub fn merge(self, later: Self) -> Self {
        Self {
            user_id: self.user_id.or(later.user_id),
            sec_uid: self.sec_uid.or(later.sec_uid),
        }
    }

    /// Drop the secondary id, as the degraded path only guarantees `userId`
    #[must_use]
    pub fn user_id_only(self) -> Self {
        Self {
            user_id: self.user_id,
            sec_uid: None,
        }
    }
}

impl fmt::Display for IdentityResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "userId={} secUid={}",
            self.user_id.as_deref().unwrap_or("-"),
            self.sec_uid.as_deref().unwrap_or("-")
        )
    }
}

/// Canonical username token: no leading `@`, no whitespace, no URL parts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Normalize free-form input into a username
    ///
    /// Empty input is a validation error; no lookup should be attempted.
    pub fn parse(raw: &str) -> Result<Self> {
        let token = normalize_username(raw);
        if token.is_empty() {
            return Err(TikidError::Validation(
                "missing 'username' parameter".to_string(),
            ));
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a handle found in page state
    pub fn matches(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.to_lowercase()
    }

    /// Percent-encoded form for substitution into URL paths and queries
    pub fn encoded(&self) -> String {
        utf8_percent_encode(&self.0, URI_COMPONENT).to_string()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One fully-formed request URL within a strategy's ordered endpoint list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCandidate {
    /// Position in the strategy's list; lower is preferred
    pub rank: usize,
    pub url: String,
}

impl EndpointCandidate {
    /// Render every template for `username`, keeping template order
    pub fn from_templates(templates: &[String], username: &Username) -> Vec<Self> {
        let encoded = username.encoded();
        templates
            .iter()
            .enumerate()
            .map(|(rank, template)| Self {
                rank,
                url: render_template(template, &encoded),
            })
            .collect()
    }
}

/// Substitute an already-encoded username into a URL template
pub fn render_template(template: &str, encoded_username: &str) -> String {
    template.replace(USERNAME_PLACEHOLDER, encoded_username)
}
