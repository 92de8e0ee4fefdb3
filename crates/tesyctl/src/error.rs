//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable
//! help text.

use miette::Diagnostic;
use thiserror::Error;

use tesyctl_core::CoreError;

/// Exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to heater at {host}")]
    #[diagnostic(
        code(tesyctl::connection_failed),
        help(
            "Check that the heater is powered and on your network.\n\
             Host: {host}\n\
             Older WiFi modules need --api legacy."
        )
    )]
    ConnectionFailed { host: String, reason: String },

    #[error("Heater did not respond in time")]
    #[diagnostic(
        code(tesyctl::timeout),
        help("The device stalls while its controller is busy; try again or raise --timeout.")
    )]
    Timeout,

    // ── Configuration ────────────────────────────────────────────────
    #[error("No heater configured")]
    #[diagnostic(
        code(tesyctl::no_config),
        help(
            "Pass --host <ip>, set TESY_HOST, or create a profile:\n\
             tesyctl config set --host 192.168.1.40"
        )
    )]
    NoHost,

    #[error("Profile '{name}' not found")]
    #[diagnostic(
        code(tesyctl::no_profile),
        help("List profiles with: tesyctl config show")
    )]
    ProfileNotFound { name: String },

    #[error("Invalid {field}: {reason}")]
    #[diagnostic(code(tesyctl::validation))]
    Validation { field: String, reason: String },

    #[error("Config error: {message}")]
    #[diagnostic(code(tesyctl::config))]
    Config { message: String },

    // ── Device operations ────────────────────────────────────────────
    #[error("{0}")]
    #[diagnostic(code(tesyctl::device))]
    Device(CoreError),

    #[error("IO error: {0}")]
    #[diagnostic(code(tesyctl::io))]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NoHost | Self::ProfileNotFound { .. } | Self::Validation { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { host, reason } => Self::ConnectionFailed { host, reason },
            CoreError::Timeout { .. } => Self::Timeout,
            CoreError::Config { message } => Self::Config { message },
            other => Self::Device(other),
        }
    }
}
