//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Pick the log level from config, with `RUST_LOG` taking precedence
//!
//! # Design Decisions
//! - JSON format for production, pretty format for development
//! - An unknown level falls back to `info` and is reported once logging is up

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const FALLBACK_LEVEL: &str = "info";

/// Normalize a configured level; `None` if it is not one we accept.
pub fn parse_level(raw: &str) -> Option<&'static str> {
    let lowered = raw.trim().to_ascii_lowercase();
    LEVELS.iter().copied().find(|level| *level == lowered)
}

/// Install the global subscriber. Returns the level in effect.
pub fn init(config: &ObservabilityConfig) -> &'static str {
    let parsed = parse_level(&config.log_level);
    let level = parsed.unwrap_or(FALLBACK_LEVEL);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("cm2http={level},tower_http={level}").into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    if parsed.is_none() {
        tracing::warn!(
            log_level = %config.log_level,
            fallback = FALLBACK_LEVEL,
            "Unrecognized log level, using fallback"
        );
    }

    level
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Some("debug"));
        assert_eq!(parse_level(" info "), Some("info"));
        assert_eq!(parse_level("verbose"), None);
    }
}
