//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the acceptor.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the request acceptor.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AcceptorConfig {
    /// Listener configuration (host, port, scheme).
    pub listener: ListenerConfig,

    /// Worker pool sizing.
    pub workers: WorkerConfig,

    /// Dispatch queue limits.
    pub queue: QueueConfig,

    /// Socket error classification.
    pub errors: ErrorConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind; `0.0.0.0` stands for the `+` wildcard of the prefix.
    pub bind_host: String,

    /// Port to listen on (0 picks a free port).
    pub port: u16,

    /// Advertise the `https` scheme. TLS itself is terminated by the handler or a front proxy.
    pub secure: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 8080,
            secure: false,
        }
    }
}

/// Worker pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct WorkerConfig {
    /// Number of worker threads.
    pub max_workers: usize,

    /// Thread name prefix (`<prefix>-acceptor`, `<prefix>-worker-N`).
    pub thread_name: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            thread_name: "acceptor".to_string(),
        }
    }
}

/// What the acceptor does when a bounded queue is full.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Wait for a worker to make room.
    #[default]
    Block,
    /// Discard the new context.
    Drop,
    /// Pass the new context to the handler's reject hook.
    Reject,
}

impl std::fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OverflowPolicy::Block => "block",
            OverflowPolicy::Drop => "drop",
            OverflowPolicy::Reject => "reject",
        };
        f.write_str(name)
    }
}

/// Dispatch queue configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct QueueConfig {
    /// Maximum queued contexts; unbounded when absent.
    pub capacity: Option<usize>,

    /// Behaviour when `capacity` is reached.
    pub overflow: OverflowPolicy,
}

/// Socket error classification.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct ErrorConfig {
    /// Raw OS error codes treated as benign, on top of the platform defaults.
    pub ignorable_os_codes: Vec<i32>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: AcceptorConfig = toml::from_str("").unwrap();
        assert_eq!(config, AcceptorConfig::default());
        assert_eq!(config.listener.port, 8080);
        assert!(config.queue.capacity.is_none());
        assert_eq!(config.queue.overflow, OverflowPolicy::Block);
        assert!(config.workers.max_workers > 0);
    }

    #[test]
    fn parses_every_section() {
        let config: AcceptorConfig = toml::from_str(
            r#"
            [listener]
            bind_host = "127.0.0.1"
            port = 9000
            secure = true

            [workers]
            max_workers = 8
            thread_name = "edge"

            [queue]
            capacity = 256
            overflow = "reject"

            [errors]
            ignorable_os_codes = [10054]

            [observability]
            log_level = "debug"
            metrics_enabled = true
            metrics_address = "127.0.0.1:9100"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.port, 9000);
        assert!(config.listener.secure);
        assert_eq!(config.workers.max_workers, 8);
        assert_eq!(config.workers.thread_name, "edge");
        assert_eq!(config.queue.capacity, Some(256));
        assert_eq!(config.queue.overflow, OverflowPolicy::Reject);
        assert_eq!(config.errors.ignorable_os_codes, vec![10054]);
        assert!(config.observability.metrics_enabled);
    }

    #[test]
    fn overflow_policy_display_matches_serde_name() {
        assert_eq!(OverflowPolicy::Drop.to_string(), "drop");
        let parsed: QueueConfig = toml::from_str(r#"overflow = "drop""#).unwrap();
        assert_eq!(parsed.overflow, OverflowPolicy::Drop);
    }
}
