// Shared transport configuration for building reqwest::Client instances.
//
// Both client variants and the endpoint prober share timeout settings
// through this module, avoiding duplicated builder logic. The heater
// speaks plain unauthenticated HTTP on the LAN, so there is no TLS or
// credential handling here.

use std::time::Duration;

/// Control-path request timeout. The device occasionally stalls for
/// several seconds while its PIC co-processor is busy.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Probe request timeout -- diagnostics are best-effort and should give
/// up quickly on paths the firmware never served.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Config with a specific timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent("tesyctl/0.1.0")
            .build()?;
        Ok(client)
    }
}
