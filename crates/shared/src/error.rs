use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENROLL_FALLBACK_REASON: &str = "Failed to sign up. Please try again.";
pub const WITHDRAW_FALLBACK_REASON: &str = "Failed to unregister. Please try again.";
pub const LOAD_FAILURE_NOTICE: &str = "Failed to load activities. Please try again later.";

/// Failure body returned by the server when it declines a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorDetail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
        }
    }

    /// Extracts the server-provided reason from a raw response body, if the
    /// body parses and carries one.
    pub fn reason_from_body(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorDetail>(body)
            .ok()
            .and_then(|parsed| parsed.detail)
            .filter(|detail| !detail.is_empty())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{status}: {reason}")]
pub struct ServerRejection {
    pub status: u16,
    pub reason: String,
}

impl ServerRejection {
    pub fn new(status: u16, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
        }
    }
}
