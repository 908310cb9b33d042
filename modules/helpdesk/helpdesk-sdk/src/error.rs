//! Error types for the helpdesk module.

use thiserror::Error;

/// Errors returned by [`HelpdeskClient`](crate::HelpdeskClient) implementations
/// and by the session layer built on top of them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum HelpdeskError {
    /// The service rejected a login. `reason` is its explanation, verbatim.
    #[error("authentication failed{}", fmt_reason(.reason.as_deref()))]
    Authentication { reason: Option<String> },

    /// The stored session no longer identifies a user.
    #[error("not authenticated")]
    NotAuthenticated,

    /// A response could not be mapped into a domain value.
    #[error("malformed {record} response: {reason}")]
    MalformedResponse { record: &'static str, reason: String },

    /// The service could not be reached or did not answer in time.
    #[error("network error: {reason}")]
    Network { reason: String },

    /// The service answered with a non-2xx status.
    #[error("service returned {status}{}", fmt_reason(.detail.as_deref()))]
    Service { status: u16, detail: Option<String> },

    /// Input rejected locally before any request was made.
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// The current role may not perform this action.
    #[error("forbidden: {action} requires an operator")]
    Forbidden { action: &'static str },

    /// The session token could not be persisted or removed.
    #[error("session storage error: {reason}")]
    SessionStorage { reason: String },
}

fn fmt_reason(reason: Option<&str>) -> String {
    reason.map(|r| format!(": {r}")).unwrap_or_default()
}

impl HelpdeskError {
    #[must_use]
    pub fn malformed(record: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            record,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn network(reason: impl Into<String>) -> Self {
        Self::Network {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Text a form shows inline for this error.
    ///
    /// The service's own reason wins when it gave one; local validation
    /// messages are already user-facing; anything else falls back to the
    /// action-specific `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Authentication {
                reason: Some(reason),
            }
            | Self::Service {
                detail: Some(reason),
                ..
            } if !reason.trim().is_empty() => reason.clone(),
            Self::Validation { message, .. } => message.clone(),
            Self::Forbidden { .. } => "No tienes permisos para esta acci\u{f3}n".to_owned(),
            _ => fallback.to_owned(),
        }
    }
}
