use std::{net::SocketAddr, sync::Arc};

use crate::{sandbox::LifecycleManager, PreviewboxResult};

use super::{routes::create_router, state::ServerState};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The previewbox API server.
pub struct PreviewServer {
    /// Address to listen on
    addr: SocketAddr,

    /// Lifecycle manager requests are dispatched to
    manager: Arc<LifecycleManager>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl PreviewServer {
    /// Create a new server instance
    pub fn new(addr: SocketAddr, manager: Arc<LifecycleManager>) -> Self {
        Self { addr, manager }
    }

    /// Serve requests until Ctrl-C or SIGTERM.
    ///
    /// On shutdown, registered sandboxes are torn down if the configuration asks for it;
    /// otherwise they keep running and are forgotten with the process.
    pub async fn serve(self) -> PreviewboxResult<()> {
        let app = create_router(ServerState::new(self.manager.clone()));
        let listener = tokio::net::TcpListener::bind(self.addr).await?;

        tracing::info!("server listening on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        if *self.manager.config().get_cleanup_on_shutdown() {
            tracing::info!("tearing down registered sandboxes");
            self.manager.shutdown().await;
        } else {
            let remaining = self.manager.registry().len().await;
            if remaining > 0 {
                tracing::warn!("leaving {} sandboxes running", remaining);
            }
        }

        Ok(())
    }
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
