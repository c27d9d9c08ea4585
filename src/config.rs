use crate::error::{AvrError, Result};
use crate::protocol::REQUEST_ID;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// SSDP search target advertised by ScalarWebAPI devices
pub const SEARCH_TARGET: &str = "urn:schemas-sony-com:service:ScalarWebAPI:1";

/// Settings for the JSON-RPC client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Hard per-call timeout
    pub timeout: Duration,

    /// Id placed in every request envelope
    pub request_id: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(3050),
            request_id: REQUEST_ID,
        }
    }
}

impl ClientConfig {
    /// Set the per-call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check the settings before building a client
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(AvrError::InvalidConfig(
                "client timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for SSDP discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Service type to search for
    pub search_target: String,

    /// How long to collect SSDP responses; also bounds each descriptor fetch
    pub timeout: Duration,

    /// Number of M-SEARCH packets to send (UDP is lossy)
    pub send_count: u32,

    /// Delay between M-SEARCH packets
    pub retry_delay: Duration,

    /// MX value (max response delay in seconds)
    pub mx: u64,

    /// Maximum number of descriptor fetches in flight
    pub fetch_concurrency: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            search_target: SEARCH_TARGET.to_string(),
            timeout: Duration::from_secs(5),
            send_count: 2,
            retry_delay: Duration::from_millis(500),
            mx: 2,
            fetch_concurrency: 8,
        }
    }
}

impl DiscoveryConfig {
    /// Set the discovery timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check the settings before searching
    pub fn validate(&self) -> Result<()> {
        if self.search_target.trim().is_empty() {
            return Err(AvrError::InvalidConfig("search target is empty".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(AvrError::InvalidConfig(
                "discovery timeout must be greater than zero".to_string(),
            ));
        }
        if self.send_count == 0 {
            return Err(AvrError::InvalidConfig(
                "send_count must be at least 1".to_string(),
            ));
        }
        if self.fetch_concurrency == 0 {
            return Err(AvrError::InvalidConfig(
                "fetch_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
