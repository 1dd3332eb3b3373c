//! cm2http: serve a Kubernetes ConfigMap over HTTP.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod snapshot;
pub mod watch;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use snapshot::{Snapshot, SnapshotStore};
