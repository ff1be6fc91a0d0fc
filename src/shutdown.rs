//! Graceful shutdown coordination.
//!
//! On SIGINT or SIGTERM the coordinator cancels its token, which tells the
//! HTTP server to stop accepting connections. In-flight invocations (including
//! open event streams) then get a bounded grace period to finish before the
//! server future is abandoned.

use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct ShutdownConfig {
    /// How long in-flight requests may run after the signal
    pub grace_period: Duration,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(30),
        }
    }
}

impl ShutdownConfig {
    pub fn with_grace_secs(mut self, secs: u64) -> Self {
        self.grace_period = Duration::from_secs(secs);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ShutdownPhase {
    Running,
    /// Signal received, waiting for in-flight requests
    Draining,
    Complete,
    /// Grace period elapsed with requests still running
    Forced,
}

pub struct ShutdownCoordinator {
    config: ShutdownConfig,
    phase: Arc<RwLock<ShutdownPhase>>,
    token: CancellationToken,
}

impl ShutdownCoordinator {
    pub fn new(config: ShutdownConfig) -> Self {
        Self {
            config,
            phase: Arc::new(RwLock::new(ShutdownPhase::Running)),
            token: CancellationToken::new(),
        }
    }

    /// Token cancelled once shutdown starts; hand it to the server.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub async fn phase(&self) -> ShutdownPhase {
        *self.phase.read().await
    }

    pub fn is_shutdown_initiated(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Starts shutdown without waiting for a signal.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    /// Waits for SIGINT or SIGTERM, then cancels the token.
    pub async fn wait_for_signal(&self) {
        let ctrl_c = async {
            if let Err(error) = tokio::signal::ctrl_c().await {
                error!(%error, "failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(error) => {
                    error!(%error, "failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("received SIGINT (Ctrl+C), initiating graceful shutdown"),
            _ = terminate => info!("received SIGTERM, initiating graceful shutdown"),
            _ = self.token.cancelled() => {}
        }
        self.token.cancel();
    }

    /// Drives `server` until it exits on its own, or until shutdown starts and
    /// the grace period runs out.
    ///
    /// `server` is expected to watch [`token`](Self::token) itself and stop
    /// accepting connections once it is cancelled.
    pub async fn run<F, E>(&self, server: F) -> Result<()>
    where
        F: Future<Output = Result<(), E>>,
        E: Into<anyhow::Error>,
    {
        tokio::pin!(server);

        tokio::select! {
            result = &mut server => {
                *self.phase.write().await = ShutdownPhase::Complete;
                return result.map_err(Into::into);
            }
            _ = self.token.cancelled() => {}
        }

        *self.phase.write().await = ShutdownPhase::Draining;
        info!(
            grace_secs = self.config.grace_period.as_secs(),
            "waiting for in-flight requests"
        );

        match timeout(self.config.grace_period, &mut server).await {
            Ok(result) => {
                *self.phase.write().await = ShutdownPhase::Complete;
                info!("graceful shutdown completed");
                result.map_err(Into::into)
            }
            Err(_) => {
                *self.phase.write().await = ShutdownPhase::Forced;
                warn!(
                    grace_secs = self.config.grace_period.as_secs(),
                    "grace period elapsed, abandoning in-flight requests"
                );
                Ok(())
            }
        }
    }
}
