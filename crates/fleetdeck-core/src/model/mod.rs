// ── Domain model ──
//
// Canonical types shared by every component. Converted from the wire
// types in `fleetdeck-api` by `crate::convert`.

pub mod boat;
pub mod edit;
pub mod marker;
pub mod review;

pub use boat::{Boat, BoatFilter, BoatId, Coordinates};
pub use edit::{BoatEdit, EditDraft};
pub use marker::{ICON_BOAT, ICON_USER, LABEL_YOU_ARE_HERE, MapMarker};
pub use review::ReviewEntry;
