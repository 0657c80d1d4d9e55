#![allow(clippy::unwrap_used)]
// End-to-end component flows against an in-memory data service.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

use fleetdeck_core::{
    Boat, BoatDataService, BoatEdit, BoatFilter, BoatId, BoatList, BoatReviews, BoatsNearMe,
    Coordinates, CoreError, FixedPosition, ListEvent, Notification, ReviewEntry, SaveOutcome,
    SelectionBus, Severity,
};

// ── Fake service ────────────────────────────────────────────────────

#[derive(Default)]
struct Fleet {
    boats: Mutex<HashMap<BoatId, Boat>>,
    reviews: HashMap<BoatId, Vec<ReviewEntry>>,
    fetches: Mutex<Vec<String>>,
}

impl Fleet {
    fn with_boat(self, boat: Boat) -> Self {
        self.boats.lock().unwrap().insert(boat.id.clone(), boat);
        self
    }

    fn with_review(mut self, boat_id: &str, text: &str) -> Self {
        let boat_id = BoatId::new(boat_id);
        let entry = ReviewEntry {
            id: format!("r-{text}"),
            boat_id: boat_id.clone(),
            reviewer_id: None,
            reviewer_name: Some("Grace".into()),
            title: None,
            text: text.into(),
            rating: Some(4),
            created_at: None,
        };
        self.reviews.entry(boat_id).or_default().push(entry);
        self
    }

    fn fetches(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }

    fn sorted_boats(&self) -> Vec<Boat> {
        let mut boats: Vec<Boat> = self.boats.lock().unwrap().values().cloned().collect();
        boats.sort_by(|a, b| a.id.cmp(&b.id));
        boats
    }
}

impl BoatDataService for Fleet {
    async fn fetch_boats(&self, filter: &BoatFilter) -> Result<Vec<Boat>, CoreError> {
        self.fetches.lock().unwrap().push(format!("boats:{filter}"));
        Ok(self
            .sorted_boats()
            .into_iter()
            .filter(|b| match filter {
                BoatFilter::All => true,
                BoatFilter::Type(t) => b.boat_type_id.as_deref() == Some(t.as_str()),
            })
            .collect())
    }

    async fn fetch_boats_by_location(
        &self,
        position: Coordinates,
        _filter: &BoatFilter,
    ) -> Result<Vec<Boat>, CoreError> {
        self.fetches.lock().unwrap().push(format!("nearby:{position}"));
        Ok(self.sorted_boats())
    }

    async fn fetch_reviews(&self, boat_id: &BoatId) -> Result<Vec<ReviewEntry>, CoreError> {
        self.fetches.lock().unwrap().push(format!("reviews:{boat_id}"));
        Ok(self.reviews.get(boat_id).cloned().unwrap_or_default())
    }

    async fn persist_boat_edits(&self, edits: Vec<BoatEdit>) -> Result<(), CoreError> {
        let mut boats = self.boats.lock().unwrap();
        for edit in edits {
            let Some(boat) = boats.get_mut(&edit.id) else {
                return Err(CoreError::Service {
                    message: format!("entity is deleted: {}", edit.id),
                    code: Some("ENTITY_IS_DELETED".into()),
                    status: Some(400),
                });
            };
            if let Some(price) = edit.price {
                boat.price = Some(price);
            }
            if let Some(name) = edit.name {
                boat.name = name;
            }
        }
        Ok(())
    }
}

fn kayak(id: &str, name: &str) -> Boat {
    let mut boat = Boat::new(id, name);
    boat.boat_type_id = Some("kayak".into());
    boat.length = Some(12.0);
    boat.price = Some(5000.0);
    boat
}

async fn eventually<F: std::future::Future>(fut: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(2), fut)
        .await
        .expect("component did not settle")
}

// ── Flows ───────────────────────────────────────────────────────────

#[tokio::test]
async fn search_edit_save_reflects_server_state() {
    let fleet = Arc::new(Fleet::default().with_boat(kayak("b1", "Kai")));
    let (note_tx, mut notes) = mpsc::unbounded_channel::<Notification>();
    let (event_tx, mut events) = mpsc::unbounded_channel();
    let list = BoatList::new(
        Arc::clone(&fleet),
        SelectionBus::new(),
        Arc::new(note_tx),
        event_tx,
    );
    let mut state = list.subscribe();

    list.search_boats("kayak");
    let loaded = eventually(state.wait_until(|s| !s.is_loading)).await.unwrap();
    assert_eq!(loaded.boats.as_ref().unwrap().len(), 1);
    assert_eq!(events.recv().await, Some(ListEvent::Loading));
    assert_eq!(events.recv().await, Some(ListEvent::DoneLoading));

    list.stage_edit(BoatEdit::new("b1").with_price(6000.0));
    assert_eq!(list.save().await, SaveOutcome::Saved { count: 1 });
    assert!(list.state().draft.is_empty());

    let refreshed = eventually(state.wait_until(|s| !s.is_loading)).await.unwrap();
    assert_eq!(refreshed.boats.as_ref().unwrap()[0].price, Some(6000.0));
    assert_eq!(fleet.fetches(), ["boats:kayak", "boats:kayak"]);

    let note = notes.recv().await.unwrap();
    assert_eq!(note.severity, Severity::Success);
    assert_eq!(note.title, "Success");
    assert_eq!(note.message, "Ship it!");
}

#[tokio::test]
async fn rejected_save_surfaces_server_message() {
    let fleet = Arc::new(Fleet::default().with_boat(kayak("b1", "Kai")));
    let (note_tx, mut notes) = mpsc::unbounded_channel::<Notification>();
    let (event_tx, _events) = mpsc::unbounded_channel();
    let list = BoatList::new(Arc::clone(&fleet), SelectionBus::new(), Arc::new(note_tx), event_tx);

    list.stage_edit(BoatEdit::new("gone").with_name("Ghost"));
    let outcome = list.save().await;

    assert_eq!(
        outcome,
        SaveOutcome::Failed {
            message: "entity is deleted: gone".into()
        }
    );
    assert!(!list.is_loading());
    assert!(list.state().draft.is_empty());
    let note = notes.recv().await.unwrap();
    assert_eq!((note.title.as_str(), note.severity), ("Error", Severity::Error));
}

#[tokio::test]
async fn tile_selection_drives_reviews_through_the_bus() {
    let fleet = Arc::new(
        Fleet::default()
            .with_boat(kayak("b1", "Kai"))
            .with_boat(kayak("b2", "Nalu"))
            .with_review("b2", "Fast and dry"),
    );
    let bus = SelectionBus::new();
    let (note_tx, _notes) = mpsc::unbounded_channel::<Notification>();
    let note_tx = Arc::new(note_tx);
    let (event_tx, _events) = mpsc::unbounded_channel();

    let list = BoatList::new(Arc::clone(&fleet), bus.clone(), note_tx.clone(), event_tx);
    let mut reviews = BoatReviews::new(Arc::clone(&fleet), note_tx);
    reviews.follow_selection(&bus);

    let mut list_state = list.subscribe();
    list.search_boats(BoatFilter::All);
    eventually(list_state.wait_until(|s| s.boats.is_some())).await;

    let tile = list
        .tiles()
        .into_iter()
        .find(|t| t.boat.name == "Nalu")
        .unwrap();
    assert_eq!(list.update_selected_tile(tile.select()), 1);

    let mut review_state = reviews.subscribe();
    let shown = eventually(review_state.wait_until(|s| s.reviews.is_some()))
        .await
        .unwrap();
    assert_eq!(shown.boat_id, Some(BoatId::new("b2")));
    assert_eq!(shown.reviews.unwrap()[0].text, "Fast and dry");

    drop(reviews);
    assert_eq!(list.update_selected_tile(tile.select()), 0);
}

#[tokio::test]
async fn near_me_places_user_before_boats() {
    let mut b2 = Boat::new("b2", "Breeze");
    b2.location = Some(Coordinates::new(37.8, -122.4).unwrap());
    let fleet = Arc::new(Fleet::default().with_boat(b2));
    let here = Coordinates::new(37.77, -122.42).unwrap();
    let (note_tx, _notes) = mpsc::unbounded_channel::<Notification>();

    let near = BoatsNearMe::new(Arc::clone(&fleet), FixedPosition(here), Arc::new(note_tx));
    let mut state = near.subscribe();
    near.on_rendered().await;
    let settled = eventually(state.wait_until(|s| s.markers.len() == 2))
        .await
        .unwrap();

    assert_eq!(settled.markers[0].position(), here);
    assert_eq!(settled.markers[0].title, "You are here!");
    assert_eq!(settled.markers[1].title, "Breeze");
    assert_eq!(fleet.fetches(), ["nearby:37.77000, -122.42000"]);
}
