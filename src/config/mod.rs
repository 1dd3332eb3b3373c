//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! ServiceConfig::default()
//!     → loader.rs (optional TOML file: --config or $HOME/.cm2http.toml)
//!     → cli.rs (flags and CM2HTTP_* environment variables)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the selection mode is fixed for the
//!   process lifetime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::Cli;
pub use loader::ConfigError;
pub use schema::{KubeConfig, ListenerConfig, ObservabilityConfig, ServiceConfig, TargetConfig};
