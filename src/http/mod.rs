//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, call logging)
//!     → handlers.rs (read SnapshotStore, serialize JSON)
//!     → Send to client
//! ```
//!
//! # Routes
//! - `GET /data`    current snapshot as a flat JSON object
//! - `GET /info`    pod, cluster and request time
//! - `GET /healthz` `{"healthy":"true"}`
//! - `GET /readyz`  `{"ready":"true"}`

pub mod handlers;
pub mod request;
pub mod server;

pub use handlers::{ServiceInfo, CLUSTER_ENV, POD_ENV};
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
