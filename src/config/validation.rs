//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, paths and value ranges
//! - Report every problem at once, not only the first

use std::net::SocketAddr;

use crate::config::schema::{StatusBand, TriggerConfig};
use crate::http::response::STATUS_RANGE;
use crate::outbound::redis::RedisAddress;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a parsed configuration, collecting every problem.
pub fn validate_config(config: &TriggerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.max_body_size == 0 {
        errors.push(ValidationError::new("listener.max_body_size", "must be > 0"));
    }

    let timeouts = [
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("timeouts.outbound_connect_secs", config.timeouts.outbound_connect_secs),
        ("timeouts.outbound_request_secs", config.timeouts.outbound_request_secs),
        ("timeouts.store_connect_secs", config.timeouts.store_connect_secs),
        ("timeouts.store_request_secs", config.timeouts.store_request_secs),
    ];
    for (field, secs) in timeouts {
        if secs == 0 {
            errors.push(ValidationError::new(field, "must be > 0"));
        }
    }

    let warmup = &config.dispatch.warmup_path;
    if !warmup.is_empty() && !warmup.starts_with('/') {
        errors.push(ValidationError::new(
            "dispatch.warmup_path",
            "must be empty or start with '/'",
        ));
    }

    if config.outbound.allowed_hosts.iter().any(|h| h.trim().is_empty()) {
        errors.push(ValidationError::new(
            "outbound.allowed_hosts",
            "entries must not be empty",
        ));
    }

    if let Err(e) = RedisAddress::parse(&config.samples.redis_address) {
        errors.push(ValidationError::new("samples.redis_address", e.to_string()));
    }
    if url::Url::parse(&config.samples.outbound_url).is_err() {
        errors.push(ValidationError::new(
            "samples.outbound_url",
            format!("'{}' is not an absolute URL", config.samples.outbound_url),
        ));
    }
    check_band(&mut errors, "samples.outbound_success", config.samples.outbound_success);
    check_band(&mut errors, "samples.outbound_show_body", config.samples.outbound_show_body);

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_band(errors: &mut Vec<ValidationError>, field: &'static str, band: StatusBand) {
    if band.min > band.max || !STATUS_RANGE.contains(&band.min) || !STATUS_RANGE.contains(&band.max) {
        errors.push(ValidationError::new(
            field,
            format!("{}..={} is not a valid status range", band.min, band.max),
        ));
    }
}
