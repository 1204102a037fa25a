//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The admin UI never talks to the backend directly. It posts to these
//! same-origin routes, which lift the bearer token out of the HTTP-only
//! cookie and forward the request upstream.

pub mod blogs;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use drafts::blog::{MAX_IMAGE_SIZE, MAX_VIDEO_SIZE};
use drafts::intake::MIB;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Largest accepted request body: both cover media at their ceilings plus form text.
#[allow(clippy::cast_possible_truncation)]
pub const MAX_BODY_BYTES: usize = (MAX_IMAGE_SIZE + MAX_VIDEO_SIZE + MIB) as usize;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/create-blog", post(blogs::create_blog))
        .route("/api/get-all-blogs", get(blogs::list_blogs))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
