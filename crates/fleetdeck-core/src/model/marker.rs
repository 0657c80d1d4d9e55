// ── Map markers ──

use serde::{Deserialize, Serialize};

use super::boat::{Boat, Coordinates};

pub const ICON_USER: &str = "standard:user";
pub const ICON_BOAT: &str = "utility:anchor";
pub const LABEL_YOU_ARE_HERE: &str = "You are here!";

/// A map annotation. The "you are here" marker, when present, is always
/// first in a marker collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub latitude: f64,
    pub longitude: f64,
    pub icon: String,
    pub title: String,
}

impl MapMarker {
    pub fn user(position: Coordinates) -> Self {
        Self {
            latitude: position.latitude,
            longitude: position.longitude,
            icon: ICON_USER.into(),
            title: LABEL_YOU_ARE_HERE.into(),
        }
    }

    /// Project a boat onto the map. Boats without a location have no marker.
    pub fn for_boat(boat: &Boat) -> Option<Self> {
        let location = boat.location?;
        Some(Self {
            latitude: location.latitude,
            longitude: location.longitude,
            icon: ICON_BOAT.into(),
            title: boat.name.clone(),
        })
    }

    pub fn position(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}
