// ── Boats near me ──
//
// Acquires the device position once, then keeps a marker collection for
// the boats around it: the user marker first, one marker per located
// boat after it, in the order the service returned them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::FutureExt;
use tokio::sync::watch;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, trace, warn};

use crate::error::CoreError;
use crate::geolocation::GeolocationProvider;
use crate::model::{Boat, BoatFilter, Coordinates, MapMarker};
use crate::notify::{Notification, Notifier};
use crate::query::{Fetcher, QueryEvent, ReactiveQuery};
use crate::service::BoatDataService;
use crate::stream::StateStream;

use super::{NEAR_ME_ERROR_TITLE, run_driver};

/// Input of the location-filtered query.
#[derive(Debug, Clone, PartialEq)]
struct NearbyQuery {
    position: Coordinates,
    filter: BoatFilter,
}

#[derive(Debug, Clone, Default)]
pub struct NearMeState {
    pub markers: Arc<Vec<MapMarker>>,
    pub is_loading: bool,
    pub position: Option<Coordinates>,
    pub filter: BoatFilter,
    pub last_error: Option<String>,
}

/// Must be created within a Tokio runtime. Dropping it stops its driver.
pub struct BoatsNearMe<G: GeolocationProvider> {
    inner: Arc<NearMeInner<G>>,
    _guard: DropGuard,
}

struct NearMeInner<G> {
    geolocation: G,
    query: ReactiveQuery<NearbyQuery, Vec<Boat>>,
    state: watch::Sender<NearMeState>,
    notifier: Arc<dyn Notifier>,
    /// Set on the first render; gates the one location request.
    rendered: AtomicBool,
}

impl<G: GeolocationProvider> BoatsNearMe<G> {
    pub fn new<S: BoatDataService>(
        service: Arc<S>,
        geolocation: G,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let fetch: Fetcher<NearbyQuery, Vec<Boat>> = Arc::new(move |q: NearbyQuery| {
            let service = Arc::clone(&service);
            async move {
                service
                    .fetch_boats_by_location(q.position, &q.filter)
                    .await
            }
            .boxed()
        });
        let (query, query_rx) = ReactiveQuery::new("boats near me", fetch);
        let (state, _) = watch::channel(NearMeState::default());

        let inner = Arc::new(NearMeInner {
            geolocation,
            query,
            state,
            notifier,
            rendered: AtomicBool::new(false),
        });

        let cancel = CancellationToken::new();
        let driver = Arc::clone(&inner);
        tokio::spawn(run_driver(
            "boats near me",
            query_rx,
            cancel.clone(),
            move |QueryEvent { generation, result }| match result {
                Ok(boats) => driver.apply_boats(generation, &boats),
                Err(e) => driver.apply_error(generation, &e),
            },
        ));

        Self {
            inner,
            _guard: cancel.drop_guard(),
        }
    }

    /// Lifecycle hook, called after every render. Only the first call
    /// requests the device position.
    pub async fn on_rendered(&self) {
        if self.inner.rendered.swap(true, Ordering::AcqRel) {
            trace!("already rendered, location not requested again");
            return;
        }

        if !self.inner.geolocation.is_available() {
            debug!("geolocation unavailable, no markers");
            self.inner.set_loading(false);
            return;
        }

        self.inner.set_loading(true);
        match self.inner.geolocation.current_position().await {
            Ok(position) => self.inner.located(position),
            Err(CoreError::CapabilityUnavailable) => {
                debug!("geolocation unavailable, no markers");
                self.inner.set_loading(false);
            }
            Err(e) => {
                warn!(error = %e, "location request failed");
                self.inner.set_loading(false);
            }
        }
    }

    /// Narrow the markers to one boat type. Takes effect once a position
    /// is known.
    pub fn set_filter(&self, filter: impl Into<BoatFilter>) {
        let filter = filter.into();
        let mut position = None;
        self.inner.state.send_if_modified(|s| {
            position = s.position;
            if s.filter == filter {
                return false;
            }
            s.filter = filter.clone();
            true
        });

        if let Some(position) = position {
            self.inner.fetch(NearbyQuery { position, filter });
        }
    }

    /// Re-fetch around the current position. Skipped until a first fetch
    /// has completed.
    pub fn refresh(&self) -> bool {
        let issued = self.inner.query.refresh();
        if issued {
            self.inner.set_loading(true);
        }
        issued
    }

    pub fn state(&self) -> NearMeState {
        self.inner.state.borrow().clone()
    }

    pub fn markers(&self) -> Arc<Vec<MapMarker>> {
        Arc::clone(&self.inner.state.borrow().markers)
    }

    pub fn subscribe(&self) -> StateStream<NearMeState> {
        StateStream::new(self.inner.state.subscribe())
    }
}

impl<G: GeolocationProvider> std::fmt::Debug for BoatsNearMe<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoatsNearMe")
            .field("state", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

impl<G: GeolocationProvider> NearMeInner<G> {
    fn set_loading(&self, loading: bool) {
        self.state.send_if_modified(|s| {
            let changed = s.is_loading != loading;
            s.is_loading = loading;
            changed
        });
    }

    fn located(&self, position: Coordinates) {
        debug!(%position, "position acquired");
        let mut filter = BoatFilter::All;
        self.state.send_modify(|s| {
            s.position = Some(position);
            s.markers = Arc::new(vec![MapMarker::user(position)]);
            filter = s.filter.clone();
        });
        self.fetch(NearbyQuery { position, filter });
    }

    fn fetch(&self, params: NearbyQuery) {
        let issued = self.query.set_params(params);
        self.state.send_if_modified(|s| {
            let loading = issued || self.query.is_pending();
            let changed = s.is_loading != loading;
            s.is_loading = loading;
            changed
        });
    }

    fn apply_boats(&self, generation: u64, boats: &[Boat]) {
        let applied = self.state.send_if_modified(|s| {
            if !self.query.is_current(generation) {
                return false;
            }
            let mut markers = Vec::with_capacity(boats.len() + 1);
            markers.extend(s.position.map(MapMarker::user));
            markers.extend(boats.iter().filter_map(MapMarker::for_boat));
            debug!(markers = markers.len(), "markers rebuilt");
            s.markers = Arc::new(markers);
            s.last_error = None;
            s.is_loading = false;
            true
        });
        if !applied {
            debug!(generation, "dropping boats for a superseded position or filter");
        }
    }

    fn apply_error(&self, generation: u64, error: &CoreError) {
        let message = error.user_message();
        // Markers stay at their last good state.
        let applied = self.state.send_if_modified(|s| {
            if !self.query.is_current(generation) {
                return false;
            }
            s.last_error = Some(message.clone());
            s.is_loading = false;
            true
        });
        if applied {
            warn!(error = %error, "fetching nearby boats failed");
            self.notifier
                .notify(Notification::error(NEAR_ME_ERROR_TITLE, message));
        }
    }
}
