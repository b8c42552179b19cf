use std::net::SocketAddr;

use clap::Args;

use common::config::ConfigError;

use crate::http_server::{self, worker, GatewayState, HttpServerError};
use crate::process;

#[derive(Args, Debug, Clone)]
pub struct Serve {
    /// Port to listen on for HTTP requests
    #[arg(short, long, default_value = "8080")]
    pub port: u16,
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Worker(#[from] worker::WorkerError),
    #[error(transparent)]
    Server(#[from] HttpServerError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Serve {
    type Error = ServeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = ctx.load_config()?;
        let (dispatcher, worker_handle) = worker::start(config).await?;

        let listen_addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let http_config = http_server::Config::new(listen_addr);
        let (graceful_waiter, shutdown_rx) = process::graceful_shutdown_blocker();

        let served = http_server::run(http_config, GatewayState::new(dispatcher), shutdown_rx).await;
        graceful_waiter.abort();

        // The router (and with it the last dispatcher) is gone; the worker
        // drains and exits.
        if tokio::task::spawn_blocking(move || worker_handle.join())
            .await
            .map_or(true, |joined| joined.is_err())
        {
            tracing::error!("bucket worker did not shut down cleanly");
        }

        served?;
        Ok("gateway stopped".to_string())
    }
}
