mod backend;
mod config;
mod error;
mod routes;
mod state;

#[tokio::main]
async fn main() {
    // .env is optional; real deployments set the environment directly.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::ProxyConfig::from_env().expect("invalid proxy configuration");
    let state = state::AppState::from_config(&config).expect("backend client init failed");
    tracing::info!(backend = state.backend.base_url(), cookie = %config.auth_cookie, "backend configured");

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "ezyrent-admin listening");
    axum::serve(listener, app).await.expect("server failed");
}
