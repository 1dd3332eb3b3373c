//! Watch events on the target ConfigMap.
//!
//! Raw Kubernetes watch events are classified into [`RecordEvent`] before the
//! reconciler sees them. Anything that is not a change to the exact target
//! object becomes [`RecordEvent::Other`].

use std::fmt;

use k8s_openapi::api::core::v1::ConfigMap;
use kube::core::WatchEvent;

use crate::snapshot::Snapshot;

/// Identity of the watched ConfigMap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetRef {
    pub namespace: String,
    pub name: String,
}

impl TargetRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// The observed state of the ConfigMap carried by an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRecord {
    pub target: TargetRef,
    pub resource_version: Option<String>,
    /// The ConfigMap's `data`; a missing field is an empty map.
    pub data: Snapshot,
}

/// Why an event was left out of reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Progress marker without an object.
    Bookmark,
    /// The API server reported an error on the watch.
    ServerError { code: u16, message: String },
    /// The event carried some other object.
    ForeignObject {
        namespace: Option<String>,
        name: Option<String>,
    },
}

/// A classified change to the watched ConfigMap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordEvent {
    Added(ConfigRecord),
    Modified(ConfigRecord),
    Deleted(ConfigRecord),
    Other(IgnoreReason),
}

impl RecordEvent {
    /// Classify a raw watch event against `target`.
    ///
    /// Objects that do not carry the target's namespace and name are refused
    /// here rather than trusted downstream.
    pub fn from_watch(event: WatchEvent<ConfigMap>, target: &TargetRef) -> Self {
        let admit = |cm: ConfigMap| ConfigRecord::for_target(cm, target);

        match event {
            WatchEvent::Added(cm) => admit(cm).map_or_else(RecordEvent::Other, RecordEvent::Added),
            WatchEvent::Modified(cm) => {
                admit(cm).map_or_else(RecordEvent::Other, RecordEvent::Modified)
            }
            WatchEvent::Deleted(cm) => {
                admit(cm).map_or_else(RecordEvent::Other, RecordEvent::Deleted)
            }
            WatchEvent::Bookmark(_) => RecordEvent::Other(IgnoreReason::Bookmark),
            WatchEvent::Error(err) => RecordEvent::Other(IgnoreReason::ServerError {
                code: err.code,
                message: err.message,
            }),
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RecordEvent::Added(_) => "added",
            RecordEvent::Modified(_) => "modified",
            RecordEvent::Deleted(_) => "deleted",
            RecordEvent::Other(_) => "other",
        }
    }
}

impl ConfigRecord {
    /// Build a record if `cm` is the target object.
    fn for_target(cm: ConfigMap, target: &TargetRef) -> Result<Self, IgnoreReason> {
        let meta = cm.metadata;
        let matches = meta.name.as_deref() == Some(target.name.as_str())
            && meta.namespace.as_deref() == Some(target.namespace.as_str());

        if !matches {
            return Err(IgnoreReason::ForeignObject {
                namespace: meta.namespace,
                name: meta.name,
            });
        }

        Ok(Self {
            target: target.clone(),
            resource_version: meta.resource_version,
            data: cm.data.unwrap_or_default(),
        })
    }
}
