use thiserror::Error;

/// Top-level error type for the `fleetdeck-api` crate.
///
/// Covers every failure mode of the boat data service client:
/// transport, service-reported errors, and payload decoding.
/// `fleetdeck-core` maps these into user-facing notifications.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Service ─────────────────────────────────────────────────────
    /// Credentials missing or rejected by the service.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Structured error reported by the data service.
    #[error("Service error (HTTP {status}): {message}")]
    Service {
        message: String,
        code: Option<String>,
        status: u16,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Service { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Service { status: 404, .. } => true,
            _ => false,
        }
    }

    /// The message the service itself supplied, if any.
    ///
    /// This is what gets surfaced to the user verbatim in error toasts.
    pub fn service_message(&self) -> Option<&str> {
        match self {
            Self::Service { message, .. } | Self::Authentication { message } => {
                Some(message.as_str())
            }
            _ => None,
        }
    }

    /// Extract the service error code, if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
