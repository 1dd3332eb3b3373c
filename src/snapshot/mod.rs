//! Served-state subsystem.
//!
//! # Data Flow
//! ```text
//! watch::Synchronizer ── replace(full map) ──▶ SnapshotStore ◀── read() ── http handlers
//! ```
//!
//! # Design Decisions
//! - Exactly one snapshot, latest wins, no history
//! - One `std::sync::Mutex` shared by the writer and all readers
//! - No per-key mutation: callers compute the whole next map first
//! - Constructed by `lifecycle::startup` and injected as `Arc<SnapshotStore>`

pub mod store;

pub use store::{Snapshot, SnapshotStore};
