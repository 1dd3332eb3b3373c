//! Live synchronization subsystem.
//!
//! # Data Flow
//! ```text
//! Kubernetes API
//!     → cluster.rs (KubeSource: watch with metadata.name field selector)
//!     → event.rs (classify into RecordEvent, foreign objects fail closed)
//!     → synchronizer.rs (ordered consumption, re-subscribe on close)
//!     → reconciler.rs (selection mode → next snapshot)
//!     → snapshot::SnapshotStore::replace
//! ```
//!
//! # Design Decisions
//! - One background task, one subscription at a time
//! - Stream closure is routine: re-subscribe at once, no backoff, no limit
//! - Failing to establish a subscription is fatal
//! - `source.rs` is the seam; tests drive the synchronizer with scripted sources

pub mod cluster;
pub mod event;
pub mod reconciler;
pub mod source;
pub mod synchronizer;

pub use cluster::KubeSource;
pub use event::{ConfigRecord, IgnoreReason, RecordEvent, TargetRef};
pub use reconciler::{Reconciler, Reconciliation, SelectionMode, StaleReason};
pub use source::{ConfigSource, EventStream, SourceError};
pub use synchronizer::{SyncError, Synchronizer};
