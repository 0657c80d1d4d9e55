// ── Core error types ──
//
// User-facing errors from fleetdeck-core. Consumers never see HTTP status
// codes or JSON parse failures directly: the `From<fleetdeck_api::Error>`
// impl translates transport-layer errors into domain-appropriate variants,
// keeping the service-supplied message for notifications.

use thiserror::Error;

/// Message shown when a failure carries no service-supplied text.
pub const DEFAULT_ERROR_MESSAGE: &str = "Unknown error";

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Remote errors ────────────────────────────────────────────────
    #[error("Cannot reach the data service: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// The data service rejected or failed the request.
    #[error("{message}")]
    Service {
        message: String,
        code: Option<String>,
        status: Option<u16>,
    },

    // ── Device capability ────────────────────────────────────────────
    #[error("Geolocation is not available")]
    CapabilityUnavailable,

    #[error("Location request declined: {reason}")]
    LocationDeclined { reason: String },

    // ── Input errors ─────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Text for a user notification: the service's own message when it
    /// sent one, otherwise the default.
    pub fn user_message(&self) -> String {
        match self {
            Self::Service { message, .. } | Self::AuthenticationFailed { message }
                if !message.trim().is_empty() =>
            {
                message.clone()
            }
            Self::Service { .. } | Self::AuthenticationFailed { .. } | Self::Internal(_) => {
                DEFAULT_ERROR_MESSAGE.to_owned()
            }
            other => other.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<fleetdeck_api::Error> for CoreError {
    fn from(err: fleetdeck_api::Error) -> Self {
        match err {
            fleetdeck_api::Error::Transport(ref e) => {
                if e.is_timeout() || e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Service {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            fleetdeck_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid service URL: {e}"),
            },
            fleetdeck_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                reason: format!("TLS error: {msg}"),
            },
            fleetdeck_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            fleetdeck_api::Error::Service {
                message,
                code,
                status,
            } => CoreError::Service {
                message,
                code,
                status: Some(status),
            },
            fleetdeck_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
