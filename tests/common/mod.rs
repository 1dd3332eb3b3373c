//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use tokio::sync::mpsc;

use cm2http::snapshot::Snapshot;
use cm2http::watch::{ConfigRecord, ConfigSource, EventStream, RecordEvent, SourceError, TargetRef};

pub type EventSender = mpsc::UnboundedSender<Result<RecordEvent, SourceError>>;

enum Session {
    Events(mpsc::UnboundedReceiver<Result<RecordEvent, SourceError>>),
    Refuse,
}

/// A `ConfigSource` driven by the test.
///
/// Each call to `subscribe` consumes the next scripted session. Dropping a
/// session's sender ends that stream, like a server-side watch timeout. Once
/// the script runs out, subscriptions stay open and silent.
#[derive(Clone)]
pub struct ScriptedSource {
    target: TargetRef,
    sessions: Arc<Mutex<VecDeque<Session>>>,
    subscriptions: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(target: TargetRef) -> Self {
        Self {
            target,
            sessions: Arc::new(Mutex::new(VecDeque::new())),
            subscriptions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue a session and return the handle that feeds it.
    pub fn session(&self) -> EventSender {
        let (tx, rx) = mpsc::unbounded_channel();
        self.sessions.lock().unwrap().push_back(Session::Events(rx));
        tx
    }

    /// Queue a subscription attempt that fails.
    pub fn refuse(&self) {
        self.sessions.lock().unwrap().push_back(Session::Refuse);
    }

    /// Subscriptions attempted so far.
    pub fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigSource for ScriptedSource {
    fn target(&self) -> &TargetRef {
        &self.target
    }

    async fn subscribe(&self) -> Result<EventStream, SourceError> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        let next = self.sessions.lock().unwrap().pop_front();
        match next {
            Some(Session::Events(rx)) => Ok(stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|item| (item, rx))
            })
            .boxed()),
            Some(Session::Refuse) => Err(SourceError::subscribe("connection refused")),
            None => Ok(stream::pending::<Result<RecordEvent, SourceError>>().boxed()),
        }
    }
}

pub fn target() -> TargetRef {
    TargetRef::new("kube-system", "kube-root-ca.crt")
}

pub fn snapshot(pairs: &[(&str, &str)]) -> Snapshot {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn record(pairs: &[(&str, &str)]) -> ConfigRecord {
    ConfigRecord {
        target: target(),
        resource_version: None,
        data: snapshot(pairs),
    }
}

pub fn added(pairs: &[(&str, &str)]) -> Result<RecordEvent, SourceError> {
    Ok(RecordEvent::Added(record(pairs)))
}

pub fn modified(pairs: &[(&str, &str)]) -> Result<RecordEvent, SourceError> {
    Ok(RecordEvent::Modified(record(pairs)))
}

pub fn deleted() -> Result<RecordEvent, SourceError> {
    Ok(RecordEvent::Deleted(record(&[])))
}

/// Poll `check` until it holds, failing the test after two seconds.
pub async fn eventually<F: Fn() -> bool>(what: &str, check: F) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for: {}", what);
}
