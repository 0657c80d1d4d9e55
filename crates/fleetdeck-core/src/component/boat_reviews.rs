// ── Boat reviews ──
//
// Reviews of one boat, keyed by an externally supplied record id. Setting
// or changing the id fetches automatically; clearing it drops the cached
// reviews without fetching.

use std::sync::{Arc, Weak};

use futures_util::FutureExt;
use tokio::sync::watch;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, warn};

use crate::bus::{SelectionBus, Subscription};
use crate::error::CoreError;
use crate::model::{BoatId, ReviewEntry};
use crate::notify::{Notification, Notifier};
use crate::query::{Fetcher, QueryEvent, ReactiveQuery};
use crate::service::BoatDataService;
use crate::stream::StateStream;

use super::{ERROR_TITLE, run_driver};

#[derive(Debug, Clone, Default)]
pub struct ReviewsState {
    pub boat_id: Option<BoatId>,
    pub reviews: Option<Arc<Vec<ReviewEntry>>>,
    pub is_loading: bool,
    pub last_error: Option<String>,
}

impl ReviewsState {
    pub fn has_reviews(&self) -> bool {
        self.reviews.as_ref().is_some_and(|r| !r.is_empty())
    }
}

/// Reviews controller.
///
/// Must be created within a Tokio runtime. Dropping it stops its driver
/// and ends any selection following.
pub struct BoatReviews {
    inner: Arc<ReviewsInner>,
    selection: Option<Subscription>,
    _guard: DropGuard,
}

struct ReviewsInner {
    query: ReactiveQuery<BoatId, Vec<ReviewEntry>>,
    state: watch::Sender<ReviewsState>,
    notifier: Arc<dyn Notifier>,
}

impl BoatReviews {
    pub fn new<S: BoatDataService>(service: Arc<S>, notifier: Arc<dyn Notifier>) -> Self {
        let fetch: Fetcher<BoatId, Vec<ReviewEntry>> = Arc::new(move |boat_id: BoatId| {
            let service = Arc::clone(&service);
            async move { service.fetch_reviews(&boat_id).await }.boxed()
        });
        let (query, query_rx) = ReactiveQuery::new("reviews", fetch);
        let (state, _) = watch::channel(ReviewsState::default());

        let inner = Arc::new(ReviewsInner {
            query,
            state,
            notifier,
        });

        let cancel = CancellationToken::new();
        let driver = Arc::clone(&inner);
        tokio::spawn(run_driver(
            "reviews",
            query_rx,
            cancel.clone(),
            move |QueryEvent { generation, result }| match result {
                Ok(reviews) => driver.apply_reviews(generation, reviews),
                Err(e) => driver.apply_error(generation, &e),
            },
        ));

        Self {
            inner,
            selection: None,
            _guard: cancel.drop_guard(),
        }
    }

    /// Set the boat whose reviews are shown. `None` (or a blank id)
    /// clears the reviews and fetches nothing.
    pub fn set_record_id(&self, boat_id: Option<BoatId>) {
        self.inner.set_record_id(boat_id);
    }

    pub fn record_id(&self) -> Option<BoatId> {
        self.inner.state.borrow().boat_id.clone()
    }

    /// Re-fetch the reviews of the current boat.
    pub fn refresh(&self) -> bool {
        let issued = self.inner.query.refresh();
        if issued {
            self.inner.state.send_modify(|s| s.is_loading = true);
        }
        issued
    }

    /// Follow selections published on `bus`, replacing any previous
    /// subscription.
    pub fn follow_selection(&mut self, bus: &SelectionBus) {
        let weak: Weak<ReviewsInner> = Arc::downgrade(&self.inner);
        self.selection = Some(bus.subscribe(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.set_record_id(Some(event.boat_id.clone()));
            }
        }));
    }

    pub fn has_reviews(&self) -> bool {
        self.inner.state.borrow().has_reviews()
    }

    pub fn state(&self) -> ReviewsState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> StateStream<ReviewsState> {
        StateStream::new(self.inner.state.subscribe())
    }
}

impl std::fmt::Debug for BoatReviews {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoatReviews")
            .field("state", &*self.inner.state.borrow())
            .field("following", &self.selection.is_some())
            .finish_non_exhaustive()
    }
}

impl ReviewsInner {
    fn set_record_id(&self, boat_id: Option<BoatId>) {
        let Some(boat_id) = boat_id.filter(|id| !id.as_str().trim().is_empty()) else {
            self.query.clear();
            self.state.send_if_modified(|s| {
                let changed = s.boat_id.is_some() || s.reviews.is_some() || s.is_loading;
                *s = ReviewsState::default();
                changed
            });
            debug!("record id cleared, reviews dropped");
            return;
        };

        if self.query.set_params(boat_id.clone()) {
            debug!(%boat_id, "fetching reviews");
            self.state.send_modify(|s| {
                s.boat_id = Some(boat_id);
                s.is_loading = true;
            });
        }
    }

    fn apply_reviews(&self, generation: u64, reviews: Vec<ReviewEntry>) {
        let count = reviews.len();
        let applied = self.state.send_if_modified(|s| {
            if !self.query.is_current(generation) {
                return false;
            }
            s.reviews = Some(Arc::new(reviews));
            s.last_error = None;
            s.is_loading = false;
            true
        });
        if applied {
            debug!(count, "reviews replaced");
        } else {
            debug!(generation, "dropping reviews for a superseded record id");
        }
    }

    fn apply_error(&self, generation: u64, error: &CoreError) {
        let message = error.user_message();
        let applied = self.state.send_if_modified(|s| {
            if !self.query.is_current(generation) {
                return false;
            }
            s.reviews = None;
            s.last_error = Some(message.clone());
            s.is_loading = false;
            true
        });
        if applied {
            warn!(error = %error, "fetching reviews failed");
            self.notifier
                .notify(Notification::error(ERROR_TITLE, message));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc;

    use super::*;
    use crate::bus::SelectionEvent;
    use crate::testing::{FakeService, review, within};

    fn component(
        service: FakeService,
    ) -> (
        Arc<FakeService>,
        BoatReviews,
        mpsc::UnboundedReceiver<Notification>,
    ) {
        let service = Arc::new(service);
        let (tx, rx) = mpsc::unbounded_channel::<Notification>();
        let reviews = BoatReviews::new(Arc::clone(&service), Arc::new(tx));
        (service, reviews, rx)
    }

    async fn settled(reviews: &BoatReviews) -> ReviewsState {
        let mut stream = reviews.subscribe();
        within(stream.wait_until(|s| !s.is_loading)).await.unwrap()
    }

    #[tokio::test]
    async fn setting_record_id_fetches_automatically() {
        let service = FakeService::default().with_reviews("b1", vec![review("r1", "b1", "Smooth")]);
        let (service, reviews, _notes) = component(service);

        reviews.set_record_id(Some(BoatId::new("b1")));
        assert!(reviews.state().is_loading);

        let state = settled(&reviews).await;
        assert!(state.has_reviews());
        assert_eq!(state.reviews.unwrap()[0].text, "Smooth");
        assert_eq!(service.review_fetches(), 1);
    }

    #[tokio::test]
    async fn empty_record_id_clears_without_fetching() {
        let service = FakeService::default().with_reviews("b1", vec![review("r1", "b1", "Smooth")]);
        let (service, reviews, _notes) = component(service);
        reviews.set_record_id(Some(BoatId::new("b1")));
        settled(&reviews).await;
        assert!(reviews.has_reviews());

        reviews.set_record_id(None);
        assert!(!reviews.has_reviews());
        assert_eq!(reviews.record_id(), None);

        reviews.set_record_id(Some(BoatId::new("  ")));
        assert!(!reviews.has_reviews());
        assert_eq!(service.review_fetches(), 1);
    }

    #[tokio::test]
    async fn clearing_mid_fetch_discards_the_late_result() {
        let service = FakeService::default().with_reviews("b1", vec![review("r1", "b1", "Smooth")]);
        service.hold("reviews:b1");
        let (service, reviews, _notes) = component(service);

        reviews.set_record_id(Some(BoatId::new("b1")));
        reviews.set_record_id(None);
        assert!(!reviews.state().is_loading);

        service.release("reviews:b1");
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(!reviews.has_reviews());
    }

    #[tokio::test]
    async fn same_record_id_does_not_refetch() {
        let (service, reviews, _notes) = component(FakeService::default());
        reviews.set_record_id(Some(BoatId::new("b1")));
        reviews.set_record_id(Some(BoatId::new("b1")));
        settled(&reviews).await;
        assert_eq!(service.review_fetches(), 1);
    }

    #[tokio::test]
    async fn refresh_reruns_with_current_id() {
        let (service, reviews, _notes) = component(FakeService::default());
        assert!(!reviews.refresh());

        reviews.set_record_id(Some(BoatId::new("b1")));
        settled(&reviews).await;
        assert!(reviews.refresh());
        settled(&reviews).await;

        assert_eq!(service.review_fetches(), 2);
        assert_eq!(reviews.record_id(), Some(BoatId::new("b1")));
    }

    #[tokio::test]
    async fn failure_clears_loading_and_notifies() {
        let service = FakeService::default().with_reviews_error(
            "b1",
            CoreError::Service {
                message: "no access".into(),
                code: None,
                status: Some(403),
            },
        );
        let (_service, reviews, mut notes) = component(service);

        reviews.set_record_id(Some(BoatId::new("b1")));
        let state = settled(&reviews).await;

        assert!(!state.has_reviews());
        assert_eq!(state.last_error.as_deref(), Some("no access"));
        assert_eq!(notes.try_recv().unwrap(), Notification::error("Error", "no access"));
    }

    #[tokio::test]
    async fn follows_bus_selection_until_dropped() {
        let bus = SelectionBus::new();
        let (service, mut reviews, _notes) = component(FakeService::default());
        reviews.follow_selection(&bus);

        assert_eq!(bus.publish(SelectionEvent::new("b5")), 1);
        settled(&reviews).await;
        assert_eq!(reviews.record_id(), Some(BoatId::new("b5")));

        drop(reviews);
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.publish(SelectionEvent::new("b6")), 0);
        assert_eq!(service.review_fetches(), 1);
    }

    #[tokio::test]
    async fn reviews_queued_before_clear_are_dropped() {
        let service = FakeService::default();
        service.hold("reviews:b1");
        let (_service, reviews, mut notes) = component(service);

        reviews.set_record_id(Some(BoatId::new("b1")));
        reviews.set_record_id(None);

        // Generation 1 is the b1 fetch, delivered after the id was cleared.
        reviews
            .inner
            .apply_reviews(1, vec![review("r1", "b1", "Smooth")]);
        reviews
            .inner
            .apply_error(1, &CoreError::Internal("late".into()));

        assert_eq!(reviews.record_id(), None);
        assert!(!reviews.has_reviews());
        assert!(reviews.state().last_error.is_none());
        assert!(notes.try_recv().is_err());
    }

    #[tokio::test]
    async fn reviews_queued_before_id_change_are_dropped() {
        let service = FakeService::default().with_reviews("b2", vec![review("r2", "b2", "Dry")]);
        service.hold("reviews:b1");
        let (_service, reviews, _notes) = component(service);

        reviews.set_record_id(Some(BoatId::new("b1")));
        reviews.set_record_id(Some(BoatId::new("b2")));
        reviews
            .inner
            .apply_reviews(1, vec![review("r1", "b1", "Smooth")]);
        assert!(reviews.state().reviews.is_none());

        let state = settled(&reviews).await;
        assert_eq!(state.reviews.unwrap()[0].text, "Dry");
    }
}
