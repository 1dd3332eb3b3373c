//! cm2http
//!
//! Discovers a Kubernetes ConfigMap and serves its data over HTTP, following
//! every change to it.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────── cm2http ────────────────────────────┐
//!   │                                                                  │
//!   │  ┌──────────────┐  events  ┌──────────────┐  replace()           │
//! ──┼─▶│ KubeSource   │────────▶│ Synchronizer │─────────┐            │
//!   │  │ (watch API)  │◀────────│ + Reconciler │         ▼            │
//!   │  └──────────────┘ resubscribe └──────────┘  ┌──────────────┐    │
//!   │                                             │SnapshotStore │    │
//!   │  ┌──────────────┐            read()         │   (Mutex)    │    │
//! ◀─┼──│ axum router  │◀──────────────────────────└──────────────┘    │
//!   │  │ /data /info  │                                               │
//!   │  │ /healthz ... │                                               │
//!   │  └──────────────┘                                               │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```

use clap::Parser;

use cm2http::config::Cli;
use cm2http::lifecycle::startup;
use cm2http::observability::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return Err(e.into());
        }
    };

    let level = logging::init(&config.observability);

    tracing::info!("cm2http v{} starting", env!("CARGO_PKG_VERSION"));
    if let Some(path) = cli.config_path() {
        tracing::info!(path = %path.display(), "Using config file");
    }
    tracing::info!(
        bind_address = %config.listener.bind_address,
        namespace = %config.target.namespace,
        configmap = %config.target.name,
        key = ?config.target.selected_key(),
        log_level = level,
        "Configuration loaded"
    );

    if let Err(e) = startup::run(config).await {
        tracing::error!(error = %e, "Fatal error");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
