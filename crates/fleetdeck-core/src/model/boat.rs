// ── Boat domain types ──
//
// `BoatId` and `BoatFilter` are the two reactive inputs most components
// are keyed by, so both have a well-defined "absent" form.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ── BoatId ──────────────────────────────────────────────────────────

/// Opaque identifier of a boat record, as issued by the data service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoatId(String);

impl BoatId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse an externally supplied id. Blank input means "no record".
    pub fn parse_optional(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BoatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BoatId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for BoatId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ── BoatFilter ──────────────────────────────────────────────────────

/// Category filter applied to boat queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoatFilter {
    /// No filter: every boat.
    #[default]
    All,
    /// Only boats of the given boat type id.
    Type(String),
}

impl BoatFilter {
    /// The boat type id to send to the service, if any.
    pub fn type_id(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Type(id) => Some(id),
        }
    }
}

impl From<&str> for BoatFilter {
    fn from(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self::All
        } else {
            Self::Type(trimmed.to_owned())
        }
    }
}

impl From<Option<String>> for BoatFilter {
    fn from(raw: Option<String>) -> Self {
        raw.as_deref().map_or(Self::All, Self::from)
    }
}

impl fmt::Display for BoatFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Type(id) => f.write_str(id),
        }
    }
}

// ── Coordinates ─────────────────────────────────────────────────────

/// A WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build a position, rejecting out-of-range or non-finite values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoreError::ValidationFailed {
                message: format!("latitude must be within -90..=90, got {latitude}"),
            });
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoreError::ValidationFailed {
                message: format!("longitude must be within -180..=180, got {longitude}"),
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

// ── Boat ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boat {
    pub id: BoatId,
    pub name: String,
    /// Length in feet.
    pub length: Option<f64>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub picture_url: Option<String>,
    pub boat_type_id: Option<String>,
    /// Only populated by location-filtered queries.
    pub location: Option<Coordinates>,
}

impl Boat {
    /// Minimal boat record, mostly useful in tests and fixtures.
    pub fn new(id: impl Into<BoatId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            length: None,
            price: None,
            description: None,
            picture_url: None,
            boat_type_id: None,
            location: None,
        }
    }
}
