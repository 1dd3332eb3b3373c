//! The watch-reconnect loop.
//!
//! # Responsibilities
//! - Keep one subscription to the target open for the process lifetime
//! - Feed each event through the reconciler, in arrival order
//! - Re-subscribe immediately whenever the stream ends
//! - Exit cleanly on the shutdown signal

use std::sync::Arc;

use futures_util::StreamExt;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::observability::metrics;
use crate::snapshot::SnapshotStore;
use crate::watch::event::{IgnoreReason, RecordEvent};
use crate::watch::reconciler::{Reconciler, Reconciliation, StaleReason};
use crate::watch::source::{ConfigSource, EventStream, SourceError};

/// Errors that stop the synchronizer.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A watch could not be established; there is nothing to serve without one.
    #[error("unable to create watcher: {0}")]
    Subscribe(#[source] SourceError),
}

/// How one subscription ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamEnd {
    Closed,
    Shutdown,
}

/// Owns the subscription and is the only writer of the snapshot store.
pub struct Synchronizer<S> {
    source: S,
    reconciler: Reconciler,
    store: Arc<SnapshotStore>,
}

impl<S: ConfigSource> Synchronizer<S> {
    pub fn new(source: S, reconciler: Reconciler, store: Arc<SnapshotStore>) -> Self {
        Self {
            source,
            reconciler,
            store,
        }
    }

    /// Run until shutdown, or until a subscription cannot be established.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> Result<(), SyncError> {
        let target = self.source.target().clone();
        tracing::info!(
            configmap = %target,
            key = ?self.reconciler.mode().key(),
            "Synchronizer starting"
        );

        loop {
            let events = tokio::select! {
                subscribed = self.source.subscribe() => subscribed.map_err(SyncError::Subscribe)?,
                _ = shutdown.recv() => break,
            };
            metrics::record_subscription();
            tracing::debug!(configmap = %target, "Watch established");

            match self.consume(events, &mut shutdown).await {
                StreamEnd::Closed => {
                    tracing::debug!(configmap = %target, "Watch closed by server, re-subscribing");
                }
                StreamEnd::Shutdown => break,
            }
        }

        tracing::info!(configmap = %target, "Synchronizer received shutdown signal, exiting loop");
        Ok(())
    }

    async fn consume(
        &self,
        mut events: EventStream,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> StreamEnd {
        loop {
            let next = tokio::select! {
                next = events.next() => next,
                _ = shutdown.recv() => return StreamEnd::Shutdown,
            };

            match next {
                Some(Ok(event)) => self.handle(&event),
                Some(Err(err)) => {
                    tracing::warn!(configmap = %self.source.target(), error = %err, "Watch stream error, re-subscribing");
                    return StreamEnd::Closed;
                }
                None => return StreamEnd::Closed,
            }
        }
    }

    fn handle(&self, event: &RecordEvent) {
        metrics::record_watch_event(event.kind());
        let target = self.source.target();

        match event {
            RecordEvent::Added(record) | RecordEvent::Modified(record) => {
                tracing::info!(
                    configmap = %target,
                    event = event.kind(),
                    resource_version = ?record.resource_version,
                    "Target configmap has been modified"
                );
            }
            RecordEvent::Deleted(_) => {
                tracing::info!(configmap = %target, "Target configmap has been deleted");
            }
            RecordEvent::Other(IgnoreReason::ForeignObject { namespace, name }) => {
                tracing::warn!(
                    configmap = %target,
                    object_namespace = ?namespace,
                    object_name = ?name,
                    "Watch delivered an object other than the target, ignoring"
                );
            }
            RecordEvent::Other(IgnoreReason::ServerError { code, message }) => {
                tracing::warn!(configmap = %target, code, message = %message, "Watch reported an error");
            }
            RecordEvent::Other(IgnoreReason::Bookmark) => {}
        }

        let outcome = self.reconciler.apply(event, &self.store);
        metrics::record_snapshot_update(outcome.label(), self.store.len());

        match outcome {
            Reconciliation::Replaced => {
                tracing::info!(keys = self.store.len(), "Updating data served");
            }
            Reconciliation::ResetToDefault => {
                tracing::info!(
                    keys = self.reconciler.default_data().len(),
                    "Serving default value"
                );
            }
            Reconciliation::KeptStale(StaleReason::KeyMissing) => {
                tracing::warn!(
                    key = ?self.reconciler.mode().key(),
                    "Key not found in configmap, continuing to serve previous data"
                );
            }
            Reconciliation::KeptStale(StaleReason::EmptyData) => {
                tracing::warn!("Configmap has no data keys, continuing to serve previous data");
            }
            Reconciliation::Ignored => {}
        }
    }
}
