use thiserror::Error;

/// Top-level error type for the `tesyctl-api` crate.
///
/// Covers every failure mode of the device transport: connection problems,
/// HTTP-level rejections, and malformed response bodies. `tesyctl-core`
/// maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The device answered with a non-2xx status.
    #[error("Device returned HTTP {status}")]
    Http { status: u16 },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the failure was a request timeout.
    ///
    /// The heater treats timeouts and connection failures identically --
    /// both mean the device is unreachable until the next poll.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// Returns `true` if the connection itself could not be established.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_connect())
    }
}
