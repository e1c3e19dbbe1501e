//! API request and response types

use serde::Deserialize;
use serde::Serialize;

/// Query string of `GET /api/userid`
#[derive(Debug, Default, Deserialize)]
pub struct UserIdQuery {
    #[serde(default)]
    pub username: Option<String>,
}

/// Body of every non-200 response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
