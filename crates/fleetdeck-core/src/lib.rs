//! Reactive component layer of the fleetdeck dashboard.
//!
//! This crate sits between `fleetdeck-api` and the UI surfaces (the
//! `fleetdeck` CLI today) and owns everything with state:
//!
//! - **[`ReactiveQuery`]**: binds a remote fetch to an input value,
//!   re-fetching on every change and discarding results of superseded
//!   invocations.
//!
//! - **[`SelectionBus`]**: process-wide publish/subscribe channel for boat
//!   selections. Subscriptions end when their [`Subscription`] handle is
//!   dropped.
//!
//! - **Components** ([`component`]): [`BoatList`] (search, inline edit and
//!   save, tile selection), [`BoatsNearMe`] (geolocated map markers) and
//!   [`BoatReviews`] (reviews keyed by a record id). Each one is an
//!   independent state machine observable through a [`StateStream`].
//!
//! - **Seams**: [`BoatDataService`] for the remote data service,
//!   [`GeolocationProvider`] for the device position, and [`Notifier`] for
//!   user-visible messages.
//!
//! - **Domain model** ([`model`]): [`Boat`], [`BoatFilter`], [`EditDraft`],
//!   [`MapMarker`], [`ReviewEntry`] and friends.

pub mod bus;
pub mod component;
pub mod config;
pub mod convert;
pub mod error;
pub mod geolocation;
pub mod model;
pub mod notify;
pub mod query;
pub mod service;
pub mod stream;

#[cfg(test)]
mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bus::{SelectionBus, SelectionEvent, Subscription};
pub use component::{
    BoatList, BoatListState, BoatReviews, BoatSelect, BoatTile, BoatsNearMe, ListEvent, ListPhase,
    NearMeState, ReviewsState, SaveOutcome,
};
pub use config::{ServiceConfig, TlsVerification};
pub use error::{CoreError, DEFAULT_ERROR_MESSAGE};
pub use geolocation::{FixedPosition, GeolocationProvider, NoGeolocation};
pub use notify::{Notification, Notifier, Severity};
pub use query::{QueryEvent, ReactiveQuery};
pub use service::{ApiDataService, BoatDataService};
pub use stream::StateStream;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Boat, BoatEdit, BoatFilter, BoatId, Coordinates, EditDraft, MapMarker, ReviewEntry,
};
