//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Log level is not validated here; unknown levels fall back to `info` at
//!   logging init

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{ServiceConfig, MAX_WATCH_TIMEOUT_SECS};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("target.name must not be empty")]
    EmptyConfigMapName,

    #[error("listener.bind_address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("target.watch_timeout_secs must be between 1 and {max}, got {got}")]
    WatchTimeoutOutOfRange { got: u32, max: u32 },

    #[error("observability.log_format must be \"pretty\" or \"json\", got {0:?}")]
    UnknownLogFormat(String),
}

/// Check the configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.target.name.trim().is_empty() {
        errors.push(ValidationError::EmptyConfigMapName);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    let watch_timeout = config.target.watch_timeout_secs;
    if watch_timeout == 0 || watch_timeout > MAX_WATCH_TIMEOUT_SECS {
        errors.push(ValidationError::WatchTimeoutOutOfRange {
            got: watch_timeout,
            max: MAX_WATCH_TIMEOUT_SECS,
        });
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => errors.push(ValidationError::UnknownLogFormat(other.to_string())),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ServiceConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ServiceConfig::default();
        config.target.name = "  ".into();
        config.listener.bind_address = "not-an-address".into();
        config.timeouts.request_secs = 0;
        config.target.watch_timeout_secs = 600;
        config.observability.log_format = "xml".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::EmptyConfigMapName));
        assert!(errors.contains(&ValidationError::WatchTimeoutOutOfRange { got: 600, max: 290 }));
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = ServiceConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::InvalidMetricsAddress("nowhere".into())])
        );
    }
}
