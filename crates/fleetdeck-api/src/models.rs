// Wire types for the boat data service.
//
// Field names mirror the service's JSON payloads exactly. Domain types in
// `fleetdeck-core` are converted from these; nothing outside this crate
// should depend on the `__c` naming.

use serde::{Deserialize, Serialize};

/// A boat record as returned by `GET /boats` and `GET /boats/nearby`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiBoat {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Length__c", default)]
    pub length: Option<f64>,
    #[serde(rename = "Price__c", default)]
    pub price: Option<f64>,
    #[serde(rename = "Description__c", default)]
    pub description: Option<String>,
    #[serde(rename = "Picture__c", default)]
    pub picture_url: Option<String>,
    #[serde(rename = "BoatType__c", default)]
    pub boat_type_id: Option<String>,
    #[serde(rename = "Geolocation__Latitude__s", default)]
    pub latitude: Option<f64>,
    #[serde(rename = "Geolocation__Longitude__s", default)]
    pub longitude: Option<f64>,
}

/// A partial boat record sent to `PATCH /boats`.
///
/// Only the fields that were edited are serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiBoatEdit {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(rename = "Length__c", skip_serializing_if = "Option::is_none", default)]
    pub length: Option<f64>,
    #[serde(rename = "Price__c", skip_serializing_if = "Option::is_none", default)]
    pub price: Option<f64>,
    #[serde(
        rename = "Description__c",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub description: Option<String>,
}

/// Request body for `PATCH /boats`.
#[derive(Debug, Serialize)]
pub(crate) struct BoatEditsRequest<'a> {
    pub data: &'a [ApiBoatEdit],
}

/// The author of a review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiReviewer {
    #[serde(rename = "Id", default)]
    pub id: Option<String>,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
}

/// A review record as returned by `GET /boats/{id}/reviews`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiReview {
    #[serde(rename = "Id")]
    pub id: String,
    /// Review headline.
    #[serde(rename = "Name", default)]
    pub title: Option<String>,
    #[serde(rename = "Comment__c", default)]
    pub comment: Option<String>,
    /// Rating as the service stores it (a number, usually 1-5).
    #[serde(rename = "Rating__c", default)]
    pub rating: Option<f64>,
    #[serde(rename = "Boat__c", default)]
    pub boat_id: Option<String>,
    /// Service timestamp, e.g. `2024-06-15T10:30:00.000+0000`. Kept raw;
    /// the core crate parses it leniently.
    #[serde(rename = "CreatedDate", default)]
    pub created_date: Option<String>,
    #[serde(rename = "CreatedBy", default)]
    pub created_by: Option<ApiReviewer>,
}

/// Error payload shape used by the service on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ServiceErrorBody {
    pub message: Option<String>,
    #[serde(rename = "errorCode", default)]
    pub error_code: Option<String>,
}

/// Some endpoints wrap errors in a list; the first entry is the one shown.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ServiceErrorPayload {
    Single(ServiceErrorBody),
    List(Vec<ServiceErrorBody>),
}

impl ServiceErrorPayload {
    pub(crate) fn into_first(self) -> Option<ServiceErrorBody> {
        match self {
            Self::Single(body) => Some(body),
            Self::List(bodies) => bodies.into_iter().next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn boat_edit_serializes_only_changed_fields() {
        let edit = ApiBoatEdit {
            id: "b1".into(),
            price: Some(6000.0),
            ..ApiBoatEdit::default()
        };
        let value = serde_json::to_value(&edit).expect("serializable");
        assert_eq!(value, json!({ "Id": "b1", "Price__c": 6000.0 }));
    }

    #[test]
    fn boat_tolerates_missing_optional_fields() {
        let boat: ApiBoat = serde_json::from_value(json!({ "Id": "b9" })).expect("valid");
        assert_eq!(boat.id, "b9");
        assert!(boat.name.is_none());
        assert!(boat.latitude.is_none());
    }

    #[test]
    fn error_payload_accepts_list_shape() {
        let payload: ServiceErrorPayload = serde_json::from_value(json!([
            { "message": "first", "errorCode": "FIELD_CUSTOM_VALIDATION_EXCEPTION" },
            { "message": "second" }
        ]))
        .expect("valid");
        let first = payload.into_first().expect("non-empty");
        assert_eq!(first.message.as_deref(), Some("first"));
        assert_eq!(
            first.error_code.as_deref(),
            Some("FIELD_CUSTOM_VALIDATION_EXCEPTION")
        );
    }
}
