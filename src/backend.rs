//! Backend API client.
//!
//! Thin `reqwest` wrapper over the two blog endpoints the admin proxies.
//! Bodies are read leniently: a response that is not JSON is kept as `null`
//! so the route can still answer with the upstream status.

use std::time::Duration;

use axum::http::StatusCode;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Form;
use serde_json::Value;

use crate::config::ProxyConfig;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Status and decoded body of a backend response.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl UpstreamResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Non-empty `message` field of the body, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.body
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
    }
}

pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &ProxyConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| BackendError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.backend_base_url.clone() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST {base}/blogs` with the re-encoded form.
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot be sent or its body read.
    pub async fn create_blog(&self, token: &str, form: Form) -> Result<UpstreamResponse, BackendError> {
        let response = self
            .http
            .post(self.url("/blogs"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        read_response(response).await
    }

    /// `GET {base}/blogs/all`.
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot be sent or its body read.
    pub async fn list_blogs(&self, token: &str) -> Result<UpstreamResponse, BackendError> {
        let response = self
            .http
            .get(self.url("/blogs/all"))
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;
        read_response(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn read_response(response: reqwest::Response) -> Result<UpstreamResponse, BackendError> {
    let status = response.status();
    let text = response.text().await?;
    Ok(UpstreamResponse { status, body: parse_body(&text) })
}

/// Decode a response body, `null` when it is empty or not JSON.
#[must_use]
pub fn parse_body(text: &str) -> Value {
    match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            if !text.trim().is_empty() {
                tracing::debug!(error = %e, "backend response is not JSON");
            }
            Value::Null
        }
    }
}

#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;
