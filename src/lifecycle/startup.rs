//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Own the snapshot store and hand it to both the synchronizer and the
//!   HTTP layer
//! - Tie the synchronizer and server lifetimes together
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Order: metrics → cluster client → listener → synchronizer + server
//! - If the synchronizer stops with an error, the server is drained and the
//!   error is returned

use std::net::SocketAddr;
use std::sync::Arc;

use metrics_exporter_prometheus::BuildError;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinError;

use crate::config::ServiceConfig;
use crate::http::{AppState, HttpServer, ServiceInfo};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::snapshot::SnapshotStore;
use crate::watch::cluster::{create_client, resolve_target, ClientError, KubeSource};
use crate::watch::{ConfigSource, Reconciler, SelectionMode, SyncError, Synchronizer};

/// Anything that stops the service from starting or keeps it from running.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("metrics exporter failed: {0}")]
    Metrics(#[from] BuildError),

    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server failed: {0}")]
    Serve(#[source] std::io::Error),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("synchronizer task failed: {0}")]
    Join(#[from] JoinError),
}

/// Start every subsystem against the configured cluster and run until shutdown.
pub async fn run(config: ServiceConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let client = create_client(&config.kube).await?;
    let target = resolve_target(&config.target, client.default_namespace());
    let source = KubeSource::new(client, target, config.target.watch_timeout_secs);

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    let shutdown = Shutdown::new();
    tokio::spawn(signals::wait_for_signal(shutdown.clone()));

    serve(&config, source, listener, shutdown).await
}

/// Wire the store, synchronizer and HTTP server around `source` and run them.
///
/// Returns once both have stopped: after `shutdown` fires, when the server
/// fails, or when the synchronizer cannot subscribe.
pub async fn serve<S>(
    config: &ServiceConfig,
    source: S,
    listener: TcpListener,
    shutdown: Shutdown,
) -> Result<(), StartupError>
where
    S: ConfigSource + 'static,
{
    let default_data = config.target.default_data.clone();
    let key = config.target.selected_key().map(str::to_string);

    let store = Arc::new(SnapshotStore::new(default_data.clone()));
    let reconciler = Reconciler::new(SelectionMode::from_key(key.as_deref()), default_data);
    let info = ServiceInfo::from_env(source.target().clone(), key);

    tracing::info!(
        configmap = %info.target,
        key = ?info.key,
        default_keys = store.len(),
        "Serving configmap data"
    );

    let synchronizer = Synchronizer::new(source, reconciler, store.clone());
    let mut sync_task = tokio::spawn(synchronizer.run(shutdown.subscribe()));

    let server = HttpServer::new(config, AppState::new(store, info));
    let server_task = server.run(listener, shutdown.subscribe());
    tokio::pin!(server_task);

    tokio::select! {
        served = &mut server_task => {
            shutdown.trigger();
            let synced = sync_task.await;
            served.map_err(StartupError::Serve)?;
            synced??;
        }
        synced = &mut sync_task => {
            shutdown.trigger();
            let served = server_task.await;
            if let Ok(Err(e)) = &synced {
                tracing::error!(error = %e, "Synchronizer stopped, shutting down");
            }
            synced??;
            served.map_err(StartupError::Serve)?;
        }
    }

    Ok(())
}
