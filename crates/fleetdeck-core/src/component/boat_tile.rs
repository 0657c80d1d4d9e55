// ── Boat tile ──
//
// One selectable card in the tile view of the boat list.

use serde::Serialize;

use crate::model::{Boat, BoatId};

/// Emitted when a tile is chosen; fed to
/// [`BoatList::update_selected_tile`](super::BoatList::update_selected_tile).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoatSelect {
    pub boat_id: BoatId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoatTile {
    pub boat: Boat,
    selected: bool,
}

impl BoatTile {
    /// Build a tile, highlighted when `selected` names this boat.
    pub fn new(boat: Boat, selected: Option<&BoatId>) -> Self {
        let selected = selected.is_some_and(|id| *id == boat.id);
        Self { boat, selected }
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn select(&self) -> BoatSelect {
        BoatSelect {
            boat_id: self.boat.id.clone(),
        }
    }
}
