//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the trigger.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the trigger host.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct TriggerConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Dispatcher behaviour.
    pub dispatch: DispatchConfig,

    /// Outbound HTTP capability.
    pub outbound: OutboundConfig,

    /// Settings for the bundled sample handlers.
    pub samples: SamplesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Largest inbound body accepted, in bytes.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Timeout configuration for inbound and outbound work.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Inbound request timeout (whole dispatch) in seconds.
    pub request_secs: u64,

    /// Outbound HTTP connect timeout in seconds.
    pub outbound_connect_secs: u64,

    /// Outbound HTTP total timeout in seconds.
    pub outbound_request_secs: u64,

    /// Key-value / pub-sub connect timeout in seconds.
    pub store_connect_secs: u64,

    /// Key-value / pub-sub command timeout in seconds.
    pub store_request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            outbound_connect_secs: 5,
            outbound_request_secs: 20,
            store_connect_secs: 5,
            store_request_secs: 10,
        }
    }
}

/// Dispatcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DispatchConfig {
    /// Include the failure message in 500 bodies, not only its class.
    pub verbose_errors: bool,

    /// Path dispatched once at startup to warm the handler code path.
    /// Empty disables warm-up.
    pub warmup_path: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            verbose_errors: false,
            warmup_path: "/scroggins".to_string(),
        }
    }
}

/// Outbound HTTP capability.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OutboundConfig {
    /// Hosts (`host` or `host:port`) handlers may call; `*` allows any.
    pub allowed_hosts: Vec<String>,

    /// User-Agent sent on outbound requests.
    pub user_agent: String,
}

impl Default for OutboundConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: vec!["*".to_string()],
            user_agent: concat!("http-trigger/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Inclusive range of status codes.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct StatusBand {
    pub min: u16,
    pub max: u16,
}

impl StatusBand {
    pub const fn new(min: u16, max: u16) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, status: u16) -> bool {
        (self.min..=self.max).contains(&status)
    }
}

/// Settings for the sample handlers.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SamplesConfig {
    /// Store / broker address used by `/redis`.
    pub redis_address: String,

    /// Key written and read back by `/redis`.
    pub redis_key: String,

    /// Channel published to by `/redis`.
    pub redis_channel: String,

    /// Target of the `/outbound` sample call.
    pub outbound_url: String,

    /// Statuses treated as a successful outbound call.
    pub outbound_success: StatusBand,

    /// Statuses for which the outbound body is shown.
    pub outbound_show_body: StatusBand,
}

impl Default for SamplesConfig {
    fn default() -> Self {
        Self {
            redis_address: "redis://127.0.0.1:6379".to_string(),
            redis_key: "mykey".to_string(),
            redis_channel: "messages".to_string(),
            outbound_url: "http://127.0.0.1:3001/hibblebibbdle".to_string(),
            outbound_success: StatusBand::new(200, 299),
            outbound_show_body: StatusBand::new(200, 200),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Emit JSON log lines instead of the human format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: TriggerConfig = toml::from_str(
            r#"
            [dispatch]
            verbose_errors = true

            [samples]
            redis_address = "redis://cache:6380"
            outbound_show_body = { min = 200, max = 299 }
            "#,
        )
        .unwrap();

        assert!(config.dispatch.verbose_errors);
        assert_eq!(config.dispatch.warmup_path, "/scroggins");
        assert_eq!(config.samples.redis_address, "redis://cache:6380");
        assert_eq!(config.samples.redis_key, "mykey");
        assert!(config.samples.outbound_show_body.contains(204));
        assert_eq!(config.listener, ListenerConfig::default());
    }

    #[test]
    fn test_status_band() {
        let band = StatusBand::new(200, 299);
        assert!(band.contains(200));
        assert!(band.contains(299));
        assert!(!band.contains(300));
        assert!(!band.contains(199));
    }
}
