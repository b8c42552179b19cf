use axum::routing::get;
use axum::Router;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse};
use tower_http::LatencyUnit;

mod config;
mod handlers;
mod health;
pub mod worker;

pub use config::Config;
pub use worker::JobDispatcher;

const STATUS_PREFIX: &str = "/_status";

/// Shared state of the download gateway
#[derive(Debug, Clone)]
pub struct GatewayState {
    dispatcher: JobDispatcher,
}

impl GatewayState {
    pub fn new(dispatcher: JobDispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &JobDispatcher {
        &self.dispatcher
    }
}

/// Build the gateway router: downloads plus health routes.
pub fn router(config: &Config, state: GatewayState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .level(config.log_level)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));

    Router::new()
        .route("/download/*path", get(handlers::download::handler))
        .nest(STATUS_PREFIX, health::router())
        .fallback(handlers::not_found_handler)
        .with_state(state)
        .layer(trace_layer)
}

/// Run the download gateway until `shutdown_rx` fires.
pub async fn run(
    config: Config,
    state: GatewayState,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    let listen_addr = config.listen_addr;
    let router = router(&config, state);

    tracing::info!(addr = ?listen_addr, "Gateway server listening");
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("an error occurred running the HTTP server: {0}")]
    ServingFailed(#[from] std::io::Error),
}
