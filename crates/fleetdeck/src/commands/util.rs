//! Shared helpers for command handlers.

use std::sync::Arc;

use fleetdeck_core::{BoatFilter, Notifier, StateStream};

use crate::cli::GlobalOpts;
use crate::config::Session;
use crate::error::CliError;
use crate::notify::TerminalNotifier;
use crate::output;

/// The notifier every component of one invocation reports through.
pub fn notifier(global: &GlobalOpts) -> Arc<dyn Notifier> {
    Arc::new(TerminalNotifier::new(
        output::should_color(&global.color),
        global.quiet,
    ))
}

/// `--filter` if given, else the profile's default boat type.
pub fn resolve_filter(flag: Option<String>, session: &Session) -> BoatFilter {
    match flag {
        Some(raw) => BoatFilter::from(raw.as_str()),
        None => session
            .profile
            .as_ref()
            .map(fleetdeck_config::Profile::default_filter)
            .unwrap_or_default(),
    }
}

/// Wait until a component reports it is no longer loading.
pub async fn settled<S: Clone + Send + Sync + 'static>(
    stream: &mut StateStream<S>,
    is_loading: impl Fn(&S) -> bool,
) -> Result<S, CliError> {
    stream
        .wait_until(|s| !is_loading(s))
        .await
        .ok_or_else(|| CliError::ServiceError {
            code: Some("internal".into()),
            message: "component stopped before loading finished".into(),
        })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}
