// ── Dashboard components ──
//
// Each component is an independent state machine. Components never touch
// each other's state: selections travel over the `SelectionBus`, loading
// signals over the owner's event channel, and everything else through
// explicit inputs.
//
// Every component owns a driver task that applies query outcomes to its
// `watch` state. Dropping the component cancels the driver and releases
// any bus subscription.

pub mod boat_list;
pub mod boat_reviews;
pub mod boat_tile;
pub mod boats_near_me;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::query::QueryEvent;

pub use boat_list::{BoatList, BoatListState, ListEvent, ListPhase, SaveOutcome};
pub use boat_reviews::{BoatReviews, ReviewsState};
pub use boat_tile::{BoatSelect, BoatTile};
pub use boats_near_me::{BoatsNearMe, NearMeState};

// ── Notification copy ──

pub const ERROR_TITLE: &str = "Error";
pub const SUCCESS_TITLE: &str = "Success";
pub const MESSAGE_SHIP_IT: &str = "Ship it!";
pub const NEAR_ME_ERROR_TITLE: &str = "Error loading Boats Near Me";

// ── Driver loop ──

/// Apply query outcomes to a component until it is torn down.
pub(crate) async fn run_driver<T, F>(
    component: &'static str,
    mut query_rx: mpsc::UnboundedReceiver<QueryEvent<T>>,
    cancel: CancellationToken,
    mut apply: F,
) where
    F: FnMut(QueryEvent<T>),
{
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            event = query_rx.recv() => match event {
                Some(event) => apply(event),
                None => break,
            },
        }
    }
    debug!(component, "driver stopped");
}
