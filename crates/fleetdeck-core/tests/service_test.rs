#![allow(clippy::unwrap_used)]
// `ApiDataService` against a mock data service.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use tokio::sync::mpsc;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fleetdeck_core::{
    ApiDataService, BoatDataService, BoatEdit, BoatFilter, BoatId, BoatList, Coordinates,
    CoreError, Notification, SelectionBus, ServiceConfig,
};

async fn setup() -> (MockServer, ApiDataService) {
    let server = MockServer::start().await;
    let mut config = ServiceConfig::new(Url::parse(&format!("{}/api", server.uri())).unwrap());
    config.api_token = Some(SecretString::from("t0ken".to_owned()));
    let service = ApiDataService::connect(&config).unwrap();
    (server, service)
}

#[tokio::test]
async fn boats_are_converted_to_domain_types() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/boats"))
        .and(query_param("boatTypeId", "kayak"))
        .and(header("authorization", "Bearer t0ken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "Id": "b1",
            "Name": "Kai",
            "Length__c": 12,
            "Price__c": 5000,
            "BoatType__c": "kayak",
            "Geolocation__Latitude__s": 37.8,
            "Geolocation__Longitude__s": -122.4
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let boats = service.fetch_boats(&BoatFilter::from("kayak")).await.unwrap();

    assert_eq!(boats.len(), 1);
    assert_eq!(boats[0].id, BoatId::new("b1"));
    assert_eq!(boats[0].name, "Kai");
    assert_eq!(boats[0].price, Some(5000.0));
    assert_eq!(boats[0].location, Some(Coordinates::new(37.8, -122.4).unwrap()));
}

#[tokio::test]
async fn reviews_carry_boat_id_and_clamped_rating() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/boats/b1/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "Id": "r1",
            "Name": "Loved it",
            "Comment__c": "Dry and fast",
            "Rating__c": 7,
            "Boat__c": "b1",
            "CreatedDate": "2024-06-15T10:30:00.000+0000",
            "CreatedBy": { "Id": "005xx", "Name": "Ada" }
        }])))
        .mount(&server)
        .await;

    let reviews = service.fetch_reviews(&BoatId::new("b1")).await.unwrap();

    assert_eq!(reviews[0].boat_id, BoatId::new("b1"));
    assert_eq!(reviews[0].text, "Dry and fast");
    assert_eq!(reviews[0].rating, Some(5));
    assert_eq!(reviews[0].reviewer_name.as_deref(), Some("Ada"));
    assert!(reviews[0].created_at.is_some());
}

#[tokio::test]
async fn persist_sends_only_edited_fields() {
    let (server, service) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/boats"))
        .and(body_json(json!({ "data": [{ "Id": "b1", "Price__c": 6000.0 }] })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    service
        .persist_boat_edits(vec![BoatEdit::new("b1").with_price(6000.0)])
        .await
        .unwrap();
}

#[tokio::test]
async fn service_message_survives_into_core_error() {
    let (server, service) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/boats"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!([{
            "message": "Price must be positive",
            "errorCode": "FIELD_CUSTOM_VALIDATION_EXCEPTION"
        }])))
        .mount(&server)
        .await;

    let err = service
        .persist_boat_edits(vec![BoatEdit::new("b1").with_price(-1.0)])
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Service { status: Some(400), .. }));
    assert_eq!(err.user_message(), "Price must be positive");
}

#[tokio::test]
async fn list_save_over_http_refreshes_once() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/boats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "Id": "b1", "Name": "Kai", "Price__c": 5000 }
        ])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/boats"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (note_tx, _notes) = mpsc::unbounded_channel::<Notification>();
    let (event_tx, _events) = mpsc::unbounded_channel();
    let list = BoatList::new(
        Arc::new(service),
        SelectionBus::new(),
        Arc::new(note_tx),
        event_tx,
    );
    let mut state = list.subscribe();

    list.search_boats(BoatFilter::All);
    state.wait_until(|s| s.boats.is_some() && !s.is_loading).await;

    list.stage_edit(BoatEdit::new("b1").with_price(6000.0));
    list.save().await;
    state.wait_until(|s| !s.is_loading).await;
}
