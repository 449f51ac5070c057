//! Configuration management for the marketplace.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Durable storage configuration
    pub storage: StorageConfig,
    /// Mock gateway configuration
    pub gateways: GatewayConfig,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// How long callers wait for a booking to settle, in seconds
    pub booking_timeout: u64,
}

/// Durable storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory the slot files live under
    pub data_dir: String,
}

/// Mock gateway configuration
///
/// The latencies model the remote round-trips the browser original
/// simulated: one second for the identity provider, two for the payment
/// processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Simulated identity-provider latency in milliseconds
    pub auth_latency_ms: u64,
    /// Simulated payment-processor latency in milliseconds
    pub payment_latency_ms: u64,
}

impl GatewayConfig {
    /// Identity-provider latency as a [`Duration`]
    #[must_use]
    pub const fn auth_latency(&self) -> Duration {
        Duration::from_millis(self.auth_latency_ms)
    }

    /// Payment-processor latency as a [`Duration`]
    #[must_use]
    pub const fn payment_latency(&self) -> Duration {
        Duration::from_millis(self.payment_latency_ms)
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            storage: StorageConfig {
                data_dir: env::var("TEMBEA_DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            },
            gateways: GatewayConfig {
                auth_latency_ms: env::var("TEMBEA_AUTH_LATENCY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1000),
                payment_latency_ms: env::var("TEMBEA_PAYMENT_LATENCY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2000),
            },
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            booking_timeout: env::var("TEMBEA_BOOKING_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        }
    }

    /// Booking wait budget as a [`Duration`]
    #[must_use]
    pub const fn booking_timeout(&self) -> Duration {
        Duration::from_secs(self.booking_timeout)
    }
}
