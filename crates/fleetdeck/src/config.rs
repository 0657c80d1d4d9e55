//! CLI configuration: thin wrapper around `fleetdeck_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--service-url, --api-token, etc.).

use std::time::Duration;

use secrecy::SecretString;

use fleetdeck_core::{ServiceConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use fleetdeck_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

/// Everything a data command needs: where to connect, and the active
/// profile when one is configured.
#[derive(Debug)]
pub struct Session {
    pub service: ServiceConfig,
    pub profile: Option<Profile>,
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the session from the config file, profile, and CLI overrides.
pub fn resolve_session(global: &GlobalOpts) -> Result<Session, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    // If a profile exists, use it with CLI flag overrides
    if let Some(profile) = cfg.profiles.get(&profile_name) {
        let service = resolve_profile(profile, &profile_name, global, cfg.defaults.timeout)?;
        return Ok(Session {
            service,
            profile: Some(profile.clone()),
        });
    }

    // An explicitly requested profile must exist
    if global.profile.is_some() {
        let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
        available.sort();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        });
    }

    // No profile found -- build from CLI flags / env vars alone
    let url_str = global
        .service_url
        .as_deref()
        .ok_or_else(|| CliError::NoConfig {
            path: config_path().display().to_string(),
        })?;

    let mut service = ServiceConfig::new(parse_url(url_str)?);
    service.api_token = global.api_token.clone().map(SecretString::from);
    if global.insecure {
        service.tls = TlsVerification::DangerAcceptInvalid;
    }
    service.timeout = Duration::from_secs(global.timeout.unwrap_or(cfg.defaults.timeout));

    Ok(Session {
        service,
        profile: None,
    })
}

/// Translate a `Profile` + global flags into a `ServiceConfig`.
///
/// CLI flag overrides take priority over profile values.
fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
    default_timeout: u64,
) -> Result<ServiceConfig, CliError> {
    // 1. Service URL (flag > env > profile)
    let url_str = global
        .service_url
        .as_deref()
        .unwrap_or(&profile.service_url);
    let url = parse_url(url_str)?;

    // 2. Token (flag > profile env > keyring > plaintext)
    let api_token = global
        .api_token
        .clone()
        .map(SecretString::from)
        .or_else(|| fleetdeck_config::resolve_api_token(profile, profile_name));

    // 3. TLS verification
    let tls = if global.insecure || profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    // 4. Timeout (flag > profile > defaults)
    let timeout = Duration::from_secs(
        global
            .timeout
            .or(profile.timeout)
            .unwrap_or(default_timeout),
    );

    let mut service = ServiceConfig::new(url);
    service.api_token = api_token;
    service.tls = tls;
    service.timeout = timeout;
    Ok(service)
}

fn parse_url(raw: &str) -> Result<url::Url, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: "service_url".into(),
        reason: format!("invalid URL: {raw}"),
    })
}
