//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Kubernetes client → Bind listener → Spawn synchronizer → Serve
//!
//! Shutdown (shutdown.rs):
//!     Trigger → synchronizer drops its watch → server drains → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
