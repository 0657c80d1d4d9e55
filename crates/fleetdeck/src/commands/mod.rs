//! Command dispatch: bridges CLI args -> core components -> output formatting.

pub mod boats;
pub mod config_cmd;
pub mod near_me;
pub mod reviews;
pub mod util;

use std::sync::Arc;

use fleetdeck_core::BoatDataService;

use crate::cli::{Command, GlobalOpts};
use crate::config::Session;
use crate::error::CliError;

/// Dispatch a service-bound command to the appropriate handler.
pub async fn dispatch<S: BoatDataService>(
    cmd: Command,
    service: Arc<S>,
    session: &Session,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Boats(args) => boats::handle(service, args, session, global).await,
        Command::Reviews(args) => reviews::handle(service, args, global).await,
        Command::NearMe(args) => near_me::handle(service, args, session, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
