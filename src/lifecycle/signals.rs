//! OS signal handling.
//!
//! SIGTERM (sent by the kubelet) and SIGINT both trigger graceful shutdown.

use crate::lifecycle::shutdown::Shutdown;

/// Wait for SIGINT or SIGTERM, then trigger `shutdown`.
pub async fn wait_for_signal(shutdown: Shutdown) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown"),
                    _ = tokio::signal::ctrl_c() => tracing::info!("Received SIGINT, initiating graceful shutdown"),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Unable to install SIGTERM handler, listening for Ctrl+C only");
                ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    ctrl_c().await;

    shutdown.trigger();
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C, initiating graceful shutdown"),
        Err(e) => {
            // Without a handler the process only stops when killed.
            tracing::error!(error = %e, "Unable to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
