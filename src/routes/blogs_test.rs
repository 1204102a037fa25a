use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::routing::{get, post};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::config::{BackendTimeouts, ProxyConfig};
use crate::routes;
use crate::state::AppState;

const BOUNDARY: &str = "ezyrent-test-boundary";
const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff];

// =============================================================================
// MOCK BACKEND
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct SeenPart {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
struct Seen {
    path: String,
    authorization: Option<String>,
    parts: Vec<SeenPart>,
}

#[derive(Clone)]
struct Mock {
    status: StatusCode,
    body: String,
    seen: Arc<Mutex<Vec<Seen>>>,
}

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

async fn mock_create(State(mock): State<Mock>, headers: HeaderMap, mut multipart: Multipart) -> (StatusCode, String) {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_owned();
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await.unwrap().to_vec();
        parts.push(SeenPart { name, file_name, content_type, bytes });
    }
    mock.seen
        .lock()
        .unwrap()
        .push(Seen { path: "/blogs".to_owned(), authorization: authorization(&headers), parts });
    (mock.status, mock.body.clone())
}

async fn mock_list(State(mock): State<Mock>, headers: HeaderMap) -> (StatusCode, String) {
    mock.seen
        .lock()
        .unwrap()
        .push(Seen { path: "/blogs/all".to_owned(), authorization: authorization(&headers), parts: Vec::new() });
    (mock.status, mock.body.clone())
}

/// Serve a backend that answers every call with `status` and `body`.
async fn spawn_backend(status: StatusCode, body: impl Into<String>) -> (String, Arc<Mutex<Vec<Seen>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mock = Mock { status, body: body.into(), seen: Arc::clone(&seen) };
    let router = Router::new()
        .route("/blogs", post(mock_create))
        .route("/blogs/all", get(mock_list))
        .with_state(mock);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    (format!("http://{addr}"), seen)
}

/// Base URL of a port nothing listens on.
fn unreachable_backend() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

// =============================================================================
// HELPERS
// =============================================================================

fn proxy_with_cookie(base_url: &str, cookie: &str) -> Router {
    let config = ProxyConfig {
        backend_base_url: base_url.to_owned(),
        port: 0,
        auth_cookie: cookie.to_owned(),
        timeouts: BackendTimeouts { request_secs: 5, connect_secs: 1 },
    };
    routes::app(AppState::from_config(&config).unwrap())
}

fn proxy(base_url: &str) -> Router {
    proxy_with_cookie(base_url, "ezyrent_auth_token")
}

fn blog_form() -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in [
        ("title", "Moving checklist"),
        ("content", "<p>Pack early.</p>"),
        ("tags[]", "Rental"),
        ("tags[]", "Smart Renting"),
        ("status", "PUBLISHED"),
    ] {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"cover.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(PNG_BYTES);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn create_request(cookie: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/create-blog")
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"));
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

fn list_request(cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri("/api/get-all-blogs");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// create-blog
// =============================================================================

#[tokio::test]
async fn create_without_cookie_is_401() {
    let (base, seen) = spawn_backend(StatusCode::CREATED, "{}").await;
    let resp = proxy(&base).oneshot(create_request(None, blog_form())).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await, json!({"success": false, "message": "Authentication required"}));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn create_forwards_every_part_with_bearer_token() {
    let (base, seen) = spawn_backend(StatusCode::CREATED, r#"{"id":"b1","title":"Moving checklist"}"#).await;
    let resp = proxy(&base)
        .oneshot(create_request(Some("ezyrent_auth_token=tok-123; theme=dark"), blog_form()))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(resp).await,
        json!({"success": true, "data": {"id": "b1", "title": "Moving checklist"}})
    );

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer tok-123"));
    let names: Vec<&str> = seen[0].parts.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["title", "content", "tags[]", "tags[]", "status", "image"]);
    assert_eq!(seen[0].parts[3].bytes, b"Smart Renting");
    assert_eq!(
        seen[0].parts[5],
        SeenPart {
            name: "image".to_owned(),
            file_name: Some("cover.png".to_owned()),
            content_type: Some("image/png".to_owned()),
            bytes: PNG_BYTES.to_vec(),
        }
    );
}

#[tokio::test]
async fn create_auth_failure_keeps_upstream_status() {
    let (base, _) = spawn_backend(StatusCode::FORBIDDEN, r#"{"message":"token revoked"}"#).await;
    let resp = proxy(&base)
        .oneshot(create_request(Some("ezyrent_auth_token=stale"), blog_form()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await, json!({"success": false, "message": "Authentication failed"}));
}

#[tokio::test]
async fn create_relays_upstream_message() {
    let (base, _) = spawn_backend(StatusCode::UNPROCESSABLE_ENTITY, r#"{"message":"Title already used"}"#).await;
    let resp = proxy(&base)
        .oneshot(create_request(Some("ezyrent_auth_token=tok"), blog_form()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(resp).await["message"], json!("Title already used"));
}

#[tokio::test]
async fn create_defaults_message_when_upstream_has_none() {
    let (base, _) = spawn_backend(StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>").await;
    let resp = proxy(&base)
        .oneshot(create_request(Some("ezyrent_auth_token=tok"), blog_form()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(resp).await["message"], json!("Failed to create blog post"));
}

#[tokio::test]
async fn create_with_unreachable_backend_is_500() {
    let resp = proxy(&unreachable_backend())
        .oneshot(create_request(Some("ezyrent_auth_token=tok"), blog_form()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(resp).await, json!({"success": false, "message": "Internal server error"}));
}

#[tokio::test]
async fn create_with_non_multipart_body_is_400() {
    let (base, seen) = spawn_backend(StatusCode::CREATED, "{}").await;
    let req = Request::builder()
        .method("POST")
        .uri("/api/create-blog")
        .header(CONTENT_TYPE, "application/json")
        .header(COOKIE, "ezyrent_auth_token=tok")
        .body(Body::from(r#"{"title":"x"}"#))
        .unwrap();
    let resp = proxy(&base).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["success"], json!(false));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn cookie_name_is_configurable() {
    let (base, seen) = spawn_backend(StatusCode::CREATED, "{}").await;
    let app = proxy_with_cookie(&base, "admin_token");

    let resp = app
        .clone()
        .oneshot(create_request(Some("ezyrent_auth_token=tok"), blog_form()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app.oneshot(create_request(Some("admin_token=tok-9"), blog_form())).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(seen.lock().unwrap()[0].authorization.as_deref(), Some("Bearer tok-9"));
}

// =============================================================================
// get-all-blogs
// =============================================================================

#[tokio::test]
async fn list_unwraps_nested_data() {
    let upstream = json!({"success": true, "data": [{"id": "b1"}, {"id": "b2"}]});
    let (base, seen) = spawn_backend(StatusCode::OK, upstream.to_string()).await;
    let resp = proxy(&base).oneshot(list_request(Some("ezyrent_auth_token=tok"))).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({"success": true, "message": "Blogs retrieved successfully", "data": [{"id": "b1"}, {"id": "b2"}]})
    );
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].path, "/blogs/all");
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer tok"));
}

#[tokio::test]
async fn list_without_cookie_is_401() {
    let resp = proxy(&unreachable_backend()).oneshot(list_request(None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn list_upstream_error_uses_default_message() {
    let (base, _) = spawn_backend(StatusCode::SERVICE_UNAVAILABLE, "{}").await;
    let resp = proxy(&base).oneshot(list_request(Some("ezyrent_auth_token=tok"))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(resp).await, json!({"success": false, "message": "Failed to fetch blogs"}));
}

#[tokio::test]
async fn list_with_unreachable_backend_is_500() {
    let resp = proxy(&unreachable_backend())
        .oneshot(list_request(Some("ezyrent_auth_token=tok")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(resp).await["message"], json!("Internal Server Error"));
}

#[tokio::test]
async fn healthz_is_ok() {
    let req = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
    let resp = proxy(&unreachable_backend()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
