//! Proxy route errors.
//!
//! ERROR HANDLING
//! ==============
//! Every failure leaves the proxy as a `{success: false, message}` envelope
//! so the browser form can treat all responses uniformly. Upstream statuses
//! are passed through; transport failures become 500s after being logged at
//! the call site.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use drafts::ApiEnvelope;
use serde_json::Value;

pub const AUTH_FAILED: &str = "Authentication failed";

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// No bearer-token cookie on the request.
    #[error("Authentication required")]
    MissingToken,

    /// The incoming form body could not be read.
    #[error("invalid form data: {0}")]
    BadForm(String),

    /// Backend answered with a non-success status.
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    /// Backend unreachable or the exchange failed mid-flight.
    #[error("{message}")]
    Internal { message: &'static str },
}

impl ProxyError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingToken => StatusCode::UNAUTHORIZED,
            Self::BadForm(_) => StatusCode::BAD_REQUEST,
            Self::Upstream { status, .. } => *status,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ApiEnvelope::<Value>::failure(self.to_string()))).into_response()
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
