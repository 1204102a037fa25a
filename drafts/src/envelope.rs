//! `{success, data|message}` response envelope shared by the proxy routes
//! and the form that consumes them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fallback rejection text when the backend gives no message.
pub const DEFAULT_CREATE_FAILURE: &str = "Failed to create blog post";
/// Rejection text when the response body is not an envelope at all.
pub const SUBMIT_FAILURE: &str = "Failed to submit form";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T = Value> {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self { success: true, message: None, data: Some(data) }
    }

    #[must_use]
    pub fn ok_with_message(message: impl Into<String>, data: T) -> Self {
        Self { success: true, message: Some(message.into()), data: Some(data) }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, message: Some(message.into()), data: None }
    }
}

/// `true` for statuses that mean "sign in again" rather than "try again".
#[must_use]
pub fn is_auth_failure(status: u16) -> bool {
    matches!(status, 401 | 403)
}

/// How a submission attempt ended, from the form's point of view.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// Backend stored the post; carries its response data.
    Accepted(Value),
    /// Session expired or was refused; the user must sign in again.
    Reauthenticate,
    /// Any other failure, with the message to show.
    Rejected(String),
}

impl SubmitOutcome {
    /// Interpret a create-blog response.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let Ok(envelope) = serde_json::from_str::<ApiEnvelope>(body) else {
            return Self::Rejected(SUBMIT_FAILURE.to_owned());
        };
        if envelope.success {
            return Self::Accepted(envelope.data.unwrap_or(Value::Null));
        }
        if is_auth_failure(status) {
            return Self::Reauthenticate;
        }
        Self::Rejected(
            envelope
                .message
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| DEFAULT_CREATE_FAILURE.to_owned()),
        )
    }

    /// A request that never produced a response.
    #[must_use]
    pub fn from_transport_error(error: impl std::fmt::Display) -> Self {
        let message = error.to_string();
        if message.is_empty() { Self::Rejected(SUBMIT_FAILURE.to_owned()) } else { Self::Rejected(message) }
    }
}

#[cfg(test)]
#[path = "envelope_test.rs"]
mod tests;
