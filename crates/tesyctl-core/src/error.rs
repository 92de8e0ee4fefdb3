// ── Core error types ──
//
// User-facing errors from tesyctl-core. These are NOT API-specific --
// consumers never see raw HTTP failures or JSON parse errors directly.
// The `From<tesyctl_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use std::time::Duration;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to heater at {host}: {reason}")]
    ConnectionFailed { host: String, reason: String },

    #[error("Heater did not respond within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Protocol errors ──────────────────────────────────────────────
    #[error("Device reported API status '{status}'")]
    ValidationFailed { status: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Coordinator not started")]
    NotStarted,

    #[error("Operation not supported: {operation} (requires {required})")]
    Unsupported { operation: String, required: String },

    #[error("Target out of range: {value} (allowed {min}..={max})")]
    InvalidSetpoint { value: u8, min: u8, max: u8 },

    #[error("Device rejected write to {field}")]
    WriteRejected { field: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("Device API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Fill in the configured timeout on a bare [`CoreError::Timeout`].
    ///
    /// The `From` conversion below cannot know the timeout that was in
    /// force, so call sites that do attach it here.
    pub(crate) fn with_timeout(self, timeout: Duration) -> Self {
        match self {
            CoreError::Timeout { .. } => CoreError::Timeout {
                timeout_secs: timeout.as_secs(),
            },
            other => other,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<tesyctl_api::Error> for CoreError {
    fn from(err: tesyctl_api::Error) -> Self {
        match err {
            tesyctl_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        host: e
                            .url()
                            .and_then(|u| u.host_str().map(str::to_owned))
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            tesyctl_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            tesyctl_api::Error::Http { status } => CoreError::Api {
                message: format!("Device returned HTTP {status}"),
                status: Some(status),
            },
            tesyctl_api::Error::Deserialization { message, .. } => CoreError::Api {
                message: format!("Unparseable device response: {message}"),
                status: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_keeps_the_status() {
        let err: CoreError = tesyctl_api::Error::Http { status: 503 }.into();
        match err {
            CoreError::Api { status, .. } => assert_eq!(status, Some(503)),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn with_timeout_only_touches_the_timeout_variant() {
        let err = CoreError::Timeout { timeout_secs: 0 }.with_timeout(Duration::from_secs(15));
        assert_eq!(err.to_string(), "Heater did not respond within 15s");

        let err = CoreError::NotStarted.with_timeout(Duration::from_secs(15));
        assert!(matches!(err, CoreError::NotStarted));
    }

    #[test]
    fn setpoint_error_is_readable() {
        let err = CoreError::InvalidSetpoint {
            value: 99,
            min: 14,
            max: 75,
        };
        assert_eq!(err.to_string(), "Target out of range: 99 (allowed 14..=75)");
    }
}
