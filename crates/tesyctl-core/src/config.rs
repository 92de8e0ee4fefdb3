// ── Runtime heater configuration ──
//
// These types describe *how* to reach and poll one water heater.
// They carry connection tuning only and never touch disk; the CLI
// constructs a `HeaterConfig` and hands it in.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use tesyctl_api::ApiVariant;

/// Shortest poll interval the device tolerates. The WiFi module's HTTP
/// stack starts dropping requests when hammered faster than this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Longest useful poll interval before the data is effectively static.
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(300);

/// Default poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Default nominal element power, used to convert the pulse counter to
/// kWh when the device does not report its own rating.
pub const DEFAULT_HEATER_POWER_WATTS: u32 = 2400;

/// What to do with local state after a successful field write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WritePolicy {
    /// Merge the acknowledged field into the held snapshot and wait for
    /// the next scheduled poll to pick up the rest.
    #[default]
    MergeAck,
    /// Trigger an immediate full refresh after the write.
    RefreshAfterWrite,
}

/// Configuration for polling a single heater.
///
/// Built by the CLI, passed to `Coordinator` -- core never reads config
/// files.
#[derive(Debug, Clone)]
pub struct HeaterConfig {
    /// Device host, e.g. `192.168.1.40` or `heater.lan:8080`.
    pub host: String,
    /// Which local API generation the firmware speaks.
    pub api: ApiVariant,
    /// Nominal heating element power in watts, for energy estimation.
    pub heater_power_watts: u32,
    /// How often to poll; clamped to [`MIN_POLL_INTERVAL`]..=[`MAX_POLL_INTERVAL`].
    pub poll_interval: Duration,
    /// Per-request timeout on the control path.
    pub timeout: Duration,
    /// Local-state behavior after writes.
    pub write_policy: WritePolicy,
}

impl HeaterConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            api: ApiVariant::default(),
            heater_power_watts: DEFAULT_HEATER_POWER_WATTS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: tesyctl_api::transport::DEFAULT_TIMEOUT,
            write_policy: WritePolicy::default(),
        }
    }

    /// The configured poll interval, clamped to the supported range.
    pub fn effective_poll_interval(&self) -> Duration {
        clamp_poll_interval(self.poll_interval)
    }
}

/// Clamp an arbitrary requested interval to what the device tolerates.
pub fn clamp_poll_interval(requested: Duration) -> Duration {
    requested.clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_interval_is_clamped_both_ways() {
        assert_eq!(
            clamp_poll_interval(Duration::from_secs(1)),
            MIN_POLL_INTERVAL
        );
        assert_eq!(
            clamp_poll_interval(Duration::from_secs(3600)),
            MAX_POLL_INTERVAL
        );
        assert_eq!(
            clamp_poll_interval(Duration::from_secs(45)),
            Duration::from_secs(45)
        );
    }

    #[test]
    fn defaults_are_sane() {
        let cfg = HeaterConfig::new("192.168.1.40");
        assert_eq!(cfg.effective_poll_interval(), DEFAULT_POLL_INTERVAL);
        assert_eq!(cfg.write_policy, WritePolicy::MergeAck);
        assert_eq!(cfg.api, ApiVariant::Modern);
    }
}
