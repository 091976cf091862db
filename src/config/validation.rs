//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (workers > 0, capacity > 0)
//! - Validate addresses (bind host, metrics endpoint)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AcceptorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

use crate::config::schema::AcceptorConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("workers.max_workers must be greater than zero")]
    NoWorkers,
    #[error("workers.thread_name must not be empty")]
    EmptyThreadName,
    #[error("queue.capacity must be greater than zero when set")]
    ZeroCapacity,
    #[error("listener.bind_host '{0}' is not an IP address")]
    InvalidBindHost(String),
    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check every semantic rule, collecting all failures.
pub fn validate_config(config: &AcceptorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.workers.max_workers == 0 {
        errors.push(ValidationError::NoWorkers);
    }
    if config.workers.thread_name.trim().is_empty() {
        errors.push(ValidationError::EmptyThreadName);
    }
    if config.queue.capacity == Some(0) {
        errors.push(ValidationError::ZeroCapacity);
    }
    if config.listener.bind_host.parse::<IpAddr>().is_err() {
        errors.push(ValidationError::InvalidBindHost(
            config.listener.bind_host.clone(),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
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
    fn defaults_are_valid() {
        assert!(validate_config(&AcceptorConfig::default()).is_ok());
    }

    #[test]
    fn reports_every_problem() {
        let mut config = AcceptorConfig::default();
        config.workers.max_workers = 0;
        config.queue.capacity = Some(0);
        config.listener.bind_host = "localhost:80".into();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nope".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::NoWorkers,
                ValidationError::ZeroCapacity,
                ValidationError::InvalidBindHost("localhost:80".into()),
                ValidationError::InvalidMetricsAddress("nope".into()),
            ]
        );
    }

    #[test]
    fn metrics_address_ignored_when_disabled() {
        let mut config = AcceptorConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());
    }
}
