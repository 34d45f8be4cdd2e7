//! `run` command: connect, serve until a shutdown signal, close.

use std::time::Duration;

use tokio::signal;

use crate::config::Environment;
use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::state::AppState;

/// How long the datastore gets to close after a shutdown signal.
const GRACEFUL_SHUTDOWN: Duration = Duration::from_secs(5);

pub struct RunCommandHandler {
    settings: Settings,
    environment: Environment,
}

impl RunCommandHandler {
    pub fn new(settings: Settings, environment: Environment) -> Self {
        Self {
            settings,
            environment,
        }
    }

    pub async fn execute(&self) -> AppResult<()> {
        let state = self.start().await?;

        tracing::info!("Service ready");
        shutdown_signal().await;

        state.shutdown(GRACEFUL_SHUTDOWN).await?;
        tracing::info!("Shutdown complete");
        Ok(())
    }

    /// Everything `execute` does before waiting for a signal.
    pub async fn start(&self) -> AppResult<AppState> {
        tracing::info!(
            app_name = %self.settings.application.name,
            app_version = %self.settings.application.version,
            environment = %self.environment,
            "Application starting"
        );

        tracing::info!(
            backend = %self.settings.database.name,
            db = %self.settings.database.db,
            connect_timeout = self.settings.database.connect_timeout,
            connect_attempts = self.settings.database.connect_attempts,
            "Datastore configuration loaded"
        );

        tracing::info!(
            level = %self.settings.logger.level,
            console_enabled = self.settings.logger.console.enabled,
            file_enabled = self.settings.logger.file.enabled,
            "Logger configuration loaded"
        );

        AppState::build(&self.settings).await.inspect_err(|e| {
            tracing::error!(error = %e, "Startup failed");
        })
    }
}

/// Waits for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
