use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::handlers;
use crate::llm::OpenAICompatibleProvider;
use crate::persona::Persona;
use crate::relay::{ChatRelay, RelaySettings};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub relay: ChatRelay,
    /// Whether an API key was found for the upstream provider.
    pub upstream_credentials: bool,
}

impl AppState {
    /// Wire the relay to the configured OpenAI-compatible upstream.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let api_key = config.llm.api_key();
        if api_key.is_none() {
            warn!(
                env = %config.llm.api_key_env,
                "No upstream API key configured; chat requests will fail"
            );
        }
        let upstream_credentials = api_key.is_some();

        // Per-call timeout is enforced by the relay.
        let client = reqwest::Client::builder().build()?;
        let provider = OpenAICompatibleProvider::new(client, config.llm.base_url.clone(), api_key);
        info!(base_url = %config.llm.base_url, "Configured upstream provider");

        let relay = ChatRelay::new(
            Arc::new(provider),
            Persona::from_config(&config.persona),
            RelaySettings::from(&config.llm),
        );

        Ok(Self {
            relay,
            upstream_credentials,
        })
    }
}

pub fn build_app(state: AppState, request_timeout_secs: u64) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(handlers::chat))
        .route("/livez", get(handlers::livez))
        .route("/readyz", get(handlers::readyz))
        .route("/version", get(handlers::version))
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(request_timeout_secs),
        ))
        .layer(cors)
}

/// Bind `host:port` and serve until Ctrl-C.
pub async fn serve(app: Router, host: &str, port: u16) -> std::io::Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    info!(addr = %listener.local_addr()?, "Companion relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
