//! Near-me command handler: boats around a position, as map markers.

use std::sync::Arc;

use tabled::Tabled;

use fleetdeck_core::{
    BoatDataService, BoatFilter, BoatsNearMe, Coordinates, FixedPosition, GeolocationProvider, MapMarker,
    NearMeState, NoGeolocation,
};

use crate::cli::{GlobalOpts, NearMeArgs};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct MarkerRow {
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Latitude")]
    latitude: String,
    #[tabled(rename = "Longitude")]
    longitude: String,
    #[tabled(rename = "Icon")]
    icon: String,
}

fn marker_row(marker: &MapMarker) -> MarkerRow {
    MarkerRow {
        title: marker.title.clone(),
        latitude: format!("{:.5}", marker.latitude),
        longitude: format!("{:.5}", marker.longitude),
        icon: marker.icon.clone(),
    }
}

/// `--lat/--lon` if given, else the profile's home position. The flags
/// must come as a pair.
fn position(
    lat: Option<f64>,
    lon: Option<f64>,
    session: &Session,
) -> Result<Option<Coordinates>, CliError> {
    match (lat, lon) {
        (Some(lat), Some(lon)) => return Ok(Some(Coordinates::new(lat, lon)?)),
        (Some(_), None) | (None, Some(_)) => {
            return Err(CliError::Validation {
                field: "--lat/--lon".into(),
                reason: "pass both a latitude and a longitude".into(),
            });
        }
        (None, None) => {}
    }
    match session.profile {
        Some(ref profile) => Ok(profile.home_position()?),
        None => Ok(None),
    }
}

pub async fn handle<S: BoatDataService>(
    service: Arc<S>,
    args: NearMeArgs,
    session: &Session,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let NearMeArgs { filter, lat, lon } = args;
    let filter = util::resolve_filter(filter, session);
    match position(lat, lon, session)? {
        Some(position) => run(service, FixedPosition(position), filter, global).await,
        None => run(service, NoGeolocation, filter, global).await,
    }
}

async fn run<S: BoatDataService, G: GeolocationProvider>(
    service: Arc<S>,
    geolocation: G,
    filter: BoatFilter,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let near = BoatsNearMe::new(service, geolocation, util::notifier(global));
    let mut states = near.subscribe();

    near.set_filter(filter);
    near.on_rendered().await;
    let state = util::settled(&mut states, |s: &NearMeState| s.is_loading).await?;

    if state.position.is_none() {
        if !global.quiet {
            eprintln!(
                "No location available. Pass --lat/--lon or set home_latitude and \
                 home_longitude on the profile."
            );
        }
        return Ok(());
    }
    if state.last_error.is_some() {
        return Err(CliError::Reported {
            operation: "Loading boats near me".into(),
        });
    }

    let out = output::render_list(&global.output, state.markers.as_slice(), marker_row, |m| {
        m.title.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
