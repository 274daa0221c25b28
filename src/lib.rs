pub mod config;
pub mod database;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;
mod utils;

use tokio::signal;
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

/// Binds the configured address and serves until Ctrl-C or SIGTERM.
pub async fn run(state: AppState) -> Result<(), AppError> {
    let address = state.settings.bind_address();
    let app = routes::app_router(state);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("🚀 Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
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
                tracing::error!("failed to install SIGTERM handler: {e}");
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
}
