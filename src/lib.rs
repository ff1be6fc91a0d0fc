pub mod config;
pub mod email;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod handlers;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod prompts;
pub mod secrets;
pub mod server;
pub mod shutdown;
pub mod state;
pub mod storage;

pub use config::{CliArgs, ServerConfig};
pub use error::HandlerError;
pub use logging::{LoggingConfig, init_logging};
pub use secrets::{EnvSecrets, SecretStore, StaticSecrets};
pub use server::build_router;
pub use shutdown::{ShutdownConfig, ShutdownCoordinator};
pub use state::AppState;

use anyhow::Result;
use std::{future::IntoFuture, sync::Arc};
use tokio::net::TcpListener;

pub async fn run_server(config: ServerConfig) -> Result<()> {
    let config = Arc::new(config);
    let secrets: Arc<dyn SecretStore> = Arc::new(EnvSecrets);
    let state = Arc::new(AppState::new(config.clone(), secrets)?);

    tracing::info!(
        gateway = %config.gateway.base_url,
        gateway_model = %config.gateway.model,
        openai_model = %config.openai.model,
        "starting bizlaunch360 functions server",
    );

    let router = build_router(state);
    let listener = TcpListener::bind(config.http_bind_address).await?;
    let actual_addr = listener.local_addr()?;
    tracing::info!(bind = %actual_addr, path = server::FUNCTIONS_PATH, "listening");

    let shutdown_config = ShutdownConfig::default().with_grace_secs(config.shutdown_grace_secs);
    let coordinator = Arc::new(ShutdownCoordinator::new(shutdown_config));

    let signal_coordinator = coordinator.clone();
    tokio::spawn(async move {
        signal_coordinator.wait_for_signal().await;
    });

    let token = coordinator.token();
    let server_future = axum::serve(listener, router)
        .with_graceful_shutdown(async move { token.cancelled().await })
        .into_future();

    coordinator.run(server_future).await?;
    tracing::info!("server stopped");
    Ok(())
}
