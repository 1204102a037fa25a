//! Blog routes: authenticated pass-through to the backend blog API.
//!
//! Both routes read the bearer token from the auth cookie and answer with the
//! `{success, data|message}` envelope the admin form interprets.

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use drafts::ApiEnvelope;
use drafts::envelope::{DEFAULT_CREATE_FAILURE, is_auth_failure};
use reqwest::multipart::{Form, Part};
use tracing::{error, info, warn};

use crate::error::{AUTH_FAILED, ProxyError};
use crate::state::AppState;

pub const LIST_SUCCESS: &str = "Blogs retrieved successfully";
pub const LIST_FAILURE: &str = "Failed to fetch blogs";
const CREATE_INTERNAL: &str = "Internal server error";
const LIST_INTERNAL: &str = "Internal Server Error";

type ApiResult = Result<(StatusCode, Json<ApiEnvelope>), ProxyError>;

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/create-blog` — forward the multipart form to `{base}/blogs`.
pub async fn create_blog(
    State(state): State<AppState>,
    jar: CookieJar,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult {
    let token = bearer_token(&jar, &state.auth_cookie)?;
    let multipart = multipart.map_err(|e| ProxyError::BadForm(e.body_text()))?;
    let (form, parts) = forward_form(multipart).await?;

    let upstream = state.backend.create_blog(&token, form).await.map_err(|e| {
        error!(error = %e, "create blog request failed");
        ProxyError::Internal { message: CREATE_INTERNAL }
    })?;

    if upstream.is_success() {
        info!(status = %upstream.status, parts, "blog created");
        return Ok((StatusCode::CREATED, Json(ApiEnvelope::ok(upstream.body))));
    }
    if is_auth_failure(upstream.status.as_u16()) {
        warn!(status = %upstream.status, "backend refused token");
        return Err(ProxyError::Upstream { status: upstream.status, message: AUTH_FAILED.to_owned() });
    }
    let message = upstream.message().unwrap_or(DEFAULT_CREATE_FAILURE).to_owned();
    warn!(status = %upstream.status, %message, "backend rejected blog");
    Err(ProxyError::Upstream { status: upstream.status, message })
}

/// `GET /api/get-all-blogs` — list via `{base}/blogs/all`, unwrapping `data.data`.
pub async fn list_blogs(State(state): State<AppState>, jar: CookieJar) -> ApiResult {
    let token = bearer_token(&jar, &state.auth_cookie)?;

    let upstream = state.backend.list_blogs(&token).await.map_err(|e| {
        error!(error = %e, "list blogs request failed");
        ProxyError::Internal { message: LIST_INTERNAL }
    })?;

    if !upstream.is_success() {
        let message = upstream.message().unwrap_or(LIST_FAILURE).to_owned();
        warn!(status = %upstream.status, %message, "backend refused blog listing");
        return Err(ProxyError::Upstream { status: upstream.status, message });
    }

    let envelope = ApiEnvelope {
        success: true,
        message: Some(LIST_SUCCESS.to_owned()),
        data: upstream.body.get("data").cloned(),
    };
    Ok((StatusCode::OK, Json(envelope)))
}

// =============================================================================
// HELPERS
// =============================================================================

fn bearer_token(jar: &CookieJar, cookie: &str) -> Result<String, ProxyError> {
    jar.get(cookie)
        .map(Cookie::value)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .ok_or(ProxyError::MissingToken)
}

/// Re-encode every incoming part (name, filename, content type, bytes) in order.
async fn forward_form(mut multipart: Multipart) -> Result<(Form, usize), ProxyError> {
    let mut form = Form::new();
    let mut count = 0;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ProxyError::BadForm(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await.map_err(|e| ProxyError::BadForm(e.body_text()))?;
        form = form.part(name, to_part(bytes.to_vec(), file_name, content_type)?);
        count += 1;
    }
    Ok((form, count))
}

fn to_part(bytes: Vec<u8>, file_name: Option<String>, content_type: Option<String>) -> Result<Part, ProxyError> {
    let part = match file_name {
        Some(file_name) => Part::bytes(bytes).file_name(file_name),
        None => match String::from_utf8(bytes) {
            Ok(text) => Part::text(text),
            Err(e) => Part::bytes(e.into_bytes()),
        },
    };
    match content_type {
        Some(mime) => part
            .mime_str(&mime)
            .map_err(|_| ProxyError::BadForm(format!("invalid content type {mime:?}"))),
        None => Ok(part),
    }
}

#[cfg(test)]
#[path = "blogs_test.rs"]
mod tests;
