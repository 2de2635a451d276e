//! Server lifecycle - bind, serve and shut down gracefully

use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use crate::config::AdminConfig;
use crate::errors::{HttpError, HttpResult};
use crate::routing::admin_router;
use crate::state::AdminState;

/// The admin HTTP server
#[derive(Debug)]
pub struct AdminServer {
    config: AdminConfig,
    state: AdminState,
}

impl AdminServer {
    pub fn new(config: AdminConfig, state: AdminState) -> Self {
        Self { config, state }
    }

    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    /// The router this server serves
    pub fn router(&self) -> Router {
        admin_router(self.state.clone(), &self.config)
    }

    /// Bind the configured address and serve until Ctrl+C or SIGTERM
    pub async fn listen(self) -> HttpResult<()> {
        let addr = self.config.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| HttpError::startup(format!("Failed to bind to {}: {}", addr, e)))?;

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> HttpResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener
            .local_addr()
            .map_err(|e| HttpError::startup(format!("Failed to read local address: {}", e)))?;
        info!(
            target: "admin::server",
            address = %local_addr,
            prefix = %self.config.api_prefix,
            resources = self.state.catalog().len(),
            "admin server listening"
        );

        axum::serve(
            listener,
            self.router().into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| HttpError::internal(format!("Server error: {}", e)))?;

        info!(target: "admin::server", "admin server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(target: "admin::server", error = %e, "failed to install Ctrl+C handler");
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
                error!(target: "admin::server", error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!(target: "admin::server", "received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            warn!(target: "admin::server", "received terminate signal, shutting down gracefully");
        },
    }
}
