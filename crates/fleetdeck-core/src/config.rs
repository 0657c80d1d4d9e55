// ── Runtime service configuration ──
//
// These types describe *how* to reach the boat data service. They carry
// credential data and connection tuning, but never touch disk: the CLI
// constructs a `ServiceConfig` (usually via `fleetdeck-config`) and hands
// it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed staging services).
    DangerAcceptInvalid,
}

/// Configuration for connecting to the boat data service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Service base URL (e.g., `https://fleet.example.com/api`).
    pub url: Url,
    /// Bearer token, if the service requires one.
    pub api_token: Option<SecretString>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
}

impl ServiceConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            api_token: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }
}
