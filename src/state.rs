//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. The
//! proxy keeps no data of its own: it holds the backend client and the name
//! of the cookie that carries each caller's bearer token.

use std::sync::Arc;

use crate::backend::{BackendClient, BackendError};
use crate::config::ProxyConfig;

/// Clone is required by Axum; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendClient>,
    pub auth_cookie: Arc<str>,
}

impl AppState {
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, BackendError> {
        Ok(Self {
            backend: Arc::new(BackendClient::new(config)?),
            auth_cookie: Arc::from(config.auth_cookie.as_str()),
        })
    }
}
