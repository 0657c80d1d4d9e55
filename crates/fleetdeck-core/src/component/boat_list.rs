// ── Boat list ──
//
// The searchable, inline-editable boat collection. States:
//
//   Idle ──search/refresh──▶ Loading ──ok──▶ Idle
//                               └────err──▶ Error
//   Idle/Error ──save──▶ Saving ──ok──▶ Loading (implicit refresh)
//                           └────err──▶ Error
//
// The loading flag is cleared on every terminal transition. Selecting a
// tile is orthogonal to this machine.

use std::sync::Arc;

use futures_util::FutureExt;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use crate::bus::{SelectionBus, SelectionEvent};
use crate::error::CoreError;
use crate::model::{Boat, BoatEdit, BoatFilter, BoatId, EditDraft};
use crate::notify::{Notification, Notifier};
use crate::query::{Fetcher, QueryEvent, ReactiveQuery};
use crate::service::BoatDataService;
use crate::stream::StateStream;

use super::boat_tile::{BoatSelect, BoatTile};
use super::{ERROR_TITLE, MESSAGE_SHIP_IT, SUCCESS_TITLE, run_driver};

// ── State ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ListPhase {
    #[default]
    Idle,
    Loading,
    Error,
    Saving,
}

/// Signals to the list's owner, used to drive a page-level spinner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEvent {
    Loading,
    DoneLoading,
}

/// Snapshot of everything the list renders.
#[derive(Debug, Clone, Default)]
pub struct BoatListState {
    pub phase: ListPhase,
    pub is_loading: bool,
    /// `None` until the first successful fetch, and after a failed one.
    pub boats: Option<Arc<Vec<Boat>>>,
    pub filter: Option<BoatFilter>,
    pub selected_boat_id: Option<BoatId>,
    pub draft: EditDraft,
    pub last_error: Option<String>,
}

/// Result of [`BoatList::save()`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { count: usize },
    Failed { message: String },
    NothingToSave,
}

// ── BoatList ─────────────────────────────────────────────────────────

/// Boat list controller.
///
/// Must be created within a Tokio runtime. Dropping it stops its driver.
pub struct BoatList<S: BoatDataService> {
    inner: Arc<ListInner<S>>,
    _guard: DropGuard,
}

struct ListInner<S> {
    service: Arc<S>,
    query: ReactiveQuery<BoatFilter, Vec<Boat>>,
    state: watch::Sender<BoatListState>,
    bus: SelectionBus,
    notifier: Arc<dyn Notifier>,
    events: mpsc::UnboundedSender<ListEvent>,
}

impl<S: BoatDataService> BoatList<S> {
    /// `events` receives the list's `Loading` / `DoneLoading` signals.
    pub fn new(
        service: Arc<S>,
        bus: SelectionBus,
        notifier: Arc<dyn Notifier>,
        events: mpsc::UnboundedSender<ListEvent>,
    ) -> Self {
        let fetch_service = Arc::clone(&service);
        let fetch: Fetcher<BoatFilter, Vec<Boat>> = Arc::new(move |filter: BoatFilter| {
            let service = Arc::clone(&fetch_service);
            async move { service.fetch_boats(&filter).await }.boxed()
        });
        let (query, query_rx) = ReactiveQuery::new("boats", fetch);
        let (state, _) = watch::channel(BoatListState::default());

        let inner = Arc::new(ListInner {
            service,
            query,
            state,
            bus,
            notifier,
            events,
        });

        let cancel = CancellationToken::new();
        let driver = Arc::clone(&inner);
        tokio::spawn(run_driver(
            "boat list",
            query_rx,
            cancel.clone(),
            move |QueryEvent { generation, result }| match result {
                Ok(boats) => driver.apply_boats(generation, boats),
                Err(e) => driver.apply_error(generation, &e),
            },
        ));

        Self {
            inner,
            _guard: cancel.drop_guard(),
        }
    }

    // ── Public operations ────────────────────────────────────────────

    /// Show the boats matching `filter`. Re-fetches only when the filter
    /// differs from the current one.
    pub fn search_boats(&self, filter: impl Into<BoatFilter>) {
        let filter = filter.into();
        let issued = self.inner.query.set_params(filter.clone());
        debug!(%filter, issued, "search boats");

        let inner = &self.inner;
        inner.state.send_modify(|s| {
            s.filter = Some(filter);
            // A save in progress keeps its phase; it re-fetches when done.
            if issued && s.phase != ListPhase::Saving {
                s.phase = ListPhase::Loading;
            }
            inner.set_loading(s, true);
            if !issued && !inner.query.is_pending() && s.phase != ListPhase::Saving {
                // Same filter, nothing in flight: the current collection stands.
                inner.set_loading(s, false);
            }
        });
    }

    /// Re-fetch with the current filter. Returns `false` (and does
    /// nothing) if no fetch has completed yet.
    pub fn refresh(&self) -> bool {
        self.inner.refresh()
    }

    /// Record a tile selection and broadcast it on the selection bus.
    /// Returns the number of subscribers reached.
    pub fn update_selected_tile(&self, select: BoatSelect) -> usize {
        let BoatSelect { boat_id } = select;
        self.inner
            .state
            .send_modify(|s| s.selected_boat_id = Some(boat_id.clone()));
        self.inner.bus.publish(SelectionEvent { boat_id })
    }

    /// Add a cell edit to the pending draft.
    pub fn stage_edit(&self, edit: BoatEdit) {
        self.inner.state.send_if_modified(|s| {
            let before = s.draft.len();
            let staged = !edit.is_empty();
            s.draft.stage(edit);
            staged || s.draft.len() != before
        });
    }

    /// Persist the pending draft.
    ///
    /// The draft is discarded whatever the outcome; a failed save is not
    /// retried. On success the list re-fetches once with the current filter
    /// so it reflects the service's state, superseding any fetch that
    /// started before the save.
    pub async fn save(&self) -> SaveOutcome {
        let mut edits = Vec::new();
        self.inner.state.send_if_modified(|s| {
            if s.draft.is_empty() {
                return false;
            }
            edits = std::mem::take(&mut s.draft).into_edits();
            s.phase = ListPhase::Saving;
            true
        });
        if edits.is_empty() {
            return SaveOutcome::NothingToSave;
        }

        let count = edits.len();
        self.inner.notify_loading(true);
        info!(count, "saving boat edits");

        match self.inner.service.persist_boat_edits(edits).await {
            Ok(()) => {
                self.inner
                    .notifier
                    .notify(Notification::success(SUCCESS_TITLE, MESSAGE_SHIP_IT));

                let refetched = self.inner.query.refetch();
                let inner = &self.inner;
                inner.state.send_modify(|s| {
                    if refetched {
                        s.phase = ListPhase::Loading;
                    } else {
                        s.phase = ListPhase::Idle;
                        inner.set_loading(s, false);
                    }
                });
                SaveOutcome::Saved { count }
            }
            Err(e) => {
                let message = e.user_message();
                warn!(error = %e, "saving boat edits failed");
                self.inner
                    .notifier
                    .notify(Notification::error(ERROR_TITLE, message.clone()));
                let inner = &self.inner;
                inner.state.send_modify(|s| {
                    s.phase = ListPhase::Error;
                    s.last_error = Some(message.clone());
                    // A search issued mid-save settles the flag itself.
                    if !inner.query.is_pending() {
                        inner.set_loading(s, false);
                    }
                });
                SaveOutcome::Failed { message }
            }
        }
    }

    /// Set the loading flag and tell the owner.
    pub fn notify_loading(&self, loading: bool) {
        self.inner.notify_loading(loading);
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn state(&self) -> BoatListState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> StateStream<BoatListState> {
        StateStream::new(self.inner.state.subscribe())
    }

    pub fn has_boats(&self) -> bool {
        self.inner.state.borrow().boats.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    /// The current collection as tiles, with the selected one flagged.
    pub fn tiles(&self) -> Vec<BoatTile> {
        let state = self.inner.state.borrow();
        let selected = state.selected_boat_id.as_ref();
        state
            .boats
            .iter()
            .flat_map(|boats| boats.iter())
            .map(|boat| BoatTile::new(boat.clone(), selected))
            .collect()
    }
}

impl<S: BoatDataService> std::fmt::Debug for BoatList<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoatList")
            .field("state", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

// ── State transitions ────────────────────────────────────────────────

impl<S: BoatDataService> ListInner<S> {
    fn refresh(&self) -> bool {
        if !self.query.refresh() {
            return false;
        }
        self.state.send_modify(|s| {
            if s.phase != ListPhase::Saving {
                s.phase = ListPhase::Loading;
            }
            self.set_loading(s, true);
        });
        true
    }

    fn notify_loading(&self, loading: bool) {
        self.state.send_if_modified(|s| self.set_loading(s, loading));
    }

    /// Update the flag and signal the owner. Runs under the state lock so
    /// signals are emitted in the same order as state changes.
    fn set_loading(&self, s: &mut BoatListState, loading: bool) -> bool {
        let changed = s.is_loading != loading;
        s.is_loading = loading;
        let event = if loading {
            ListEvent::Loading
        } else {
            ListEvent::DoneLoading
        };
        let _ = self.events.send(event);
        changed
    }

    fn apply_boats(&self, generation: u64, boats: Vec<Boat>) {
        let count = boats.len();
        let applied = self.state.send_if_modified(|s| {
            if !self.query.is_current(generation) {
                return false;
            }
            s.boats = Some(Arc::new(boats));
            s.last_error = None;
            // A fetch that started before a save must not end the save.
            if s.phase != ListPhase::Saving {
                s.phase = ListPhase::Idle;
                self.set_loading(s, false);
            }
            true
        });
        if applied {
            debug!(count, "boat list replaced");
        } else {
            debug!(generation, "dropping boats for a superseded filter");
        }
    }

    fn apply_error(&self, generation: u64, error: &CoreError) {
        let message = error.user_message();
        let applied = self.state.send_if_modified(|s| {
            if !self.query.is_current(generation) {
                return false;
            }
            s.boats = None;
            s.last_error = Some(message.clone());
            if s.phase != ListPhase::Saving {
                s.phase = ListPhase::Error;
                self.set_loading(s, false);
            }
            true
        });
        if !applied {
            debug!(generation, error = %error, "dropping error for a superseded filter");
            return;
        }
        warn!(error = %error, "fetching boats failed");
        self.notifier
            .notify(Notification::error(ERROR_TITLE, message));
    }
}
