// ── API-to-domain type conversions ──
//
// Bridges raw `fleetdeck_api` response types into canonical domain types.
// Missing optional fields stay `None`; nothing here can fail.

use chrono::{DateTime, NaiveDateTime, Utc};

use fleetdeck_api::{ApiBoat, ApiBoatEdit, ApiReview};

use crate::model::{Boat, BoatEdit, BoatId, Coordinates, ReviewEntry};

// ── Helpers ────────────────────────────────────────────────────────

/// Parse the service's timestamps. Accepts RFC 3339 as well as the
/// `+0000` offset form (`2024-06-15T10:30:00.000+0000`).
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Clamp a numeric rating into the 1-5 star range.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
fn stars(rating: f64) -> Option<u8> {
    rating
        .is_finite()
        .then(|| rating.round().clamp(1.0, 5.0) as u8)
}

// ── Boats ───────────────────────────────────────────────────────────

impl From<ApiBoat> for Boat {
    fn from(b: ApiBoat) -> Self {
        let location = match (b.latitude, b.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        };

        Boat {
            id: BoatId::from(b.id),
            name: b.name.unwrap_or_default(),
            length: b.length,
            price: b.price,
            description: b.description,
            picture_url: b.picture_url,
            boat_type_id: b.boat_type_id,
            location,
        }
    }
}

impl From<BoatEdit> for ApiBoatEdit {
    fn from(e: BoatEdit) -> Self {
        ApiBoatEdit {
            id: e.id.to_string(),
            name: e.name,
            length: e.length,
            price: e.price,
            description: e.description,
        }
    }
}

// ── Reviews ─────────────────────────────────────────────────────────

impl ReviewEntry {
    /// Convert a wire review. `boat_id` is the id the reviews were
    /// requested for, used when the record omits its own reference.
    pub(crate) fn from_api(r: ApiReview, boat_id: &BoatId) -> Self {
        let (reviewer_id, reviewer_name) = r
            .created_by
            .map(|c| (c.id, c.name))
            .unwrap_or_default();

        ReviewEntry {
            id: r.id,
            boat_id: r.boat_id.map_or_else(|| boat_id.clone(), BoatId::from),
            reviewer_id,
            reviewer_name,
            title: r.title,
            text: r.comment.unwrap_or_default(),
            rating: r.rating.and_then(stars),
            created_at: r.created_date.as_deref().and_then(parse_timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use fleetdeck_api::ApiReviewer;

    fn api_boat(id: &str) -> ApiBoat {
        ApiBoat {
            id: id.into(),
            name: Some("Kai".into()),
            length: Some(12.0),
            price: Some(5000.0),
            description: None,
            picture_url: None,
            boat_type_id: Some("kayak".into()),
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn boat_without_both_coordinates_has_no_location() {
        let mut raw = api_boat("b1");
        raw.latitude = Some(37.8);
        let boat = Boat::from(raw);
        assert_eq!(boat.location, None);
        assert_eq!(boat.name, "Kai");
    }

    #[test]
    fn boat_with_coordinates_has_location() {
        let mut raw = api_boat("b2");
        raw.latitude = Some(37.8);
        raw.longitude = Some(-122.4);
        let boat = Boat::from(raw);
        assert_eq!(
            boat.location,
            Some(Coordinates {
                latitude: 37.8,
                longitude: -122.4
            })
        );
    }

    #[test]
    fn parses_service_timestamp_offset_form() {
        let ts = parse_timestamp("2024-06-15T10:30:00.000+0000").expect("parsable");
        assert_eq!((ts.year(), ts.month(), ts.day()), (2024, 6, 15));
        assert_eq!((ts.hour(), ts.minute()), (10, 30));
        assert!(parse_timestamp("2024-06-15T10:30:00Z").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn review_falls_back_to_requested_boat_id() {
        let review = ReviewEntry::from_api(
            ApiReview {
                id: "r1".into(),
                title: Some("Great".into()),
                comment: Some("Smooth".into()),
                rating: Some(7.0),
                boat_id: None,
                created_date: None,
                created_by: Some(ApiReviewer {
                    id: Some("u1".into()),
                    name: Some("Ada".into()),
                }),
            },
            &BoatId::from("b1"),
        );
        assert_eq!(review.boat_id, BoatId::from("b1"));
        assert_eq!(review.rating, Some(5));
        assert_eq!(review.reviewer_name.as_deref(), Some("Ada"));
        assert_eq!(review.text, "Smooth");
    }
}
