// ── In-memory service for component tests ──

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::error::CoreError;
use crate::model::{Boat, BoatEdit, BoatFilter, BoatId, Coordinates, ReviewEntry};
use crate::service::BoatDataService;

/// Await `fut`, failing the test if it takes more than a second.
pub(crate) async fn within<F: Future>(fut: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(1), fut)
        .await
        .expect("timed out waiting for component state")
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Boats(BoatFilter),
    Nearby(Coordinates, BoatFilter),
    Reviews(BoatId),
    Persist(Vec<BoatEdit>),
}

/// Canned responses keyed by request, with optional gates that hold a
/// response back until the test releases it.
#[derive(Default)]
pub(crate) struct FakeService {
    boats: Mutex<HashMap<BoatFilter, Result<Vec<Boat>, CoreError>>>,
    nearby: Mutex<Option<Result<Vec<Boat>, CoreError>>>,
    reviews: Mutex<HashMap<BoatId, Result<Vec<ReviewEntry>, CoreError>>>,
    persist_error: Mutex<Option<CoreError>>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeService {
    pub(crate) fn with_boats(self, filter: &str, boats: Vec<Boat>) -> Self {
        self.boats
            .lock()
            .unwrap()
            .insert(BoatFilter::from(filter), Ok(boats));
        self
    }

    pub(crate) fn with_boats_error(self, filter: &str, error: CoreError) -> Self {
        self.boats
            .lock()
            .unwrap()
            .insert(BoatFilter::from(filter), Err(error));
        self
    }

    pub(crate) fn with_nearby(self, boats: Vec<Boat>) -> Self {
        *self.nearby.lock().unwrap() = Some(Ok(boats));
        self
    }

    /// Replace the nearby response after construction.
    pub(crate) fn set_nearby(&self, response: Result<Vec<Boat>, CoreError>) {
        *self.nearby.lock().unwrap() = Some(response);
    }

    pub(crate) fn with_reviews(self, boat_id: &str, reviews: Vec<ReviewEntry>) -> Self {
        self.reviews
            .lock()
            .unwrap()
            .insert(BoatId::new(boat_id), Ok(reviews));
        self
    }

    pub(crate) fn with_reviews_error(self, boat_id: &str, error: CoreError) -> Self {
        self.reviews
            .lock()
            .unwrap()
            .insert(BoatId::new(boat_id), Err(error));
        self
    }

    pub(crate) fn with_persist_error(self, error: CoreError) -> Self {
        *self.persist_error.lock().unwrap() = Some(error);
        self
    }

    /// Hold back responses for `key` (`boats:<filter>`, `nearby`,
    /// `reviews:<id>`) until [`release()`](Self::release).
    pub(crate) fn hold(&self, key: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(key.to_owned(), Arc::new(Semaphore::new(0)));
    }

    /// Let one held response for `key` through.
    pub(crate) fn release(&self, key: &str) {
        if let Some(gate) = self.gates.lock().unwrap().get(key) {
            gate.add_permits(1);
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn boat_fetches(&self) -> usize {
        self.count(|c| matches!(c, Call::Boats(_)))
    }

    pub(crate) fn nearby_fetches(&self) -> usize {
        self.count(|c| matches!(c, Call::Nearby(..)))
    }

    pub(crate) fn review_fetches(&self) -> usize {
        self.count(|c| matches!(c, Call::Reviews(_)))
    }

    pub(crate) fn persisted(&self) -> Vec<Vec<BoatEdit>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Persist(edits) => Some(edits),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    async fn pass_gate(&self, key: &str) {
        let gate = self.gates.lock().unwrap().get(key).cloned();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
    }
}

impl BoatDataService for FakeService {
    async fn fetch_boats(&self, filter: &BoatFilter) -> Result<Vec<Boat>, CoreError> {
        self.record(Call::Boats(filter.clone()));
        self.pass_gate(&format!("boats:{filter}")).await;
        let response = self.boats.lock().unwrap().get(filter).cloned();
        response.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_boats_by_location(
        &self,
        position: Coordinates,
        filter: &BoatFilter,
    ) -> Result<Vec<Boat>, CoreError> {
        self.record(Call::Nearby(position, filter.clone()));
        self.pass_gate("nearby").await;
        let response = self.nearby.lock().unwrap().clone();
        response.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_reviews(&self, boat_id: &BoatId) -> Result<Vec<ReviewEntry>, CoreError> {
        self.record(Call::Reviews(boat_id.clone()));
        self.pass_gate(&format!("reviews:{boat_id}")).await;
        let response = self.reviews.lock().unwrap().get(boat_id).cloned();
        response.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn persist_boat_edits(&self, edits: Vec<BoatEdit>) -> Result<(), CoreError> {
        self.record(Call::Persist(edits));
        self.pass_gate("persist").await;
        let error = self.persist_error.lock().unwrap().clone();
        error.map_or(Ok(()), Err)
    }
}

/// A review fixture.
pub(crate) fn review(id: &str, boat_id: &str, text: &str) -> ReviewEntry {
    ReviewEntry {
        id: id.to_owned(),
        boat_id: BoatId::new(boat_id),
        reviewer_id: Some("005xx".to_owned()),
        reviewer_name: Some("Ada".to_owned()),
        title: Some("Great".to_owned()),
        text: text.to_owned(),
        rating: Some(5),
        created_at: None,
    }
}
