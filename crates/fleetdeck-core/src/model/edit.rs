// ── Inline edit draft ──
//
// Pending, uncommitted cell edits keyed by boat id. Staging a second
// edit for the same boat merges field-by-field into the existing entry.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::boat::BoatId;

/// A partial boat record: only the editable columns, each optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoatEdit {
    pub id: BoatId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl BoatEdit {
    pub fn new(id: impl Into<BoatId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            length: None,
            price: None,
            description: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// `true` when no field was actually changed.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.length.is_none()
            && self.price.is_none()
            && self.description.is_none()
    }

    /// Overlay the fields set in `newer` onto this edit.
    fn merge(&mut self, newer: BoatEdit) {
        if newer.name.is_some() {
            self.name = newer.name;
        }
        if newer.length.is_some() {
            self.length = newer.length;
        }
        if newer.price.is_some() {
            self.price = newer.price;
        }
        if newer.description.is_some() {
            self.description = newer.description;
        }
    }
}

/// The set of pending edits awaiting persistence, in staging order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditDraft {
    edits: IndexMap<BoatId, BoatEdit>,
}

impl EditDraft {
    /// Stage an edit. Edits that change nothing are ignored.
    pub fn stage(&mut self, edit: BoatEdit) {
        if edit.is_empty() {
            return;
        }
        match self.edits.get_mut(&edit.id) {
            Some(existing) => existing.merge(edit),
            None => {
                self.edits.insert(edit.id.clone(), edit);
            }
        }
    }

    pub fn get(&self, id: &BoatId) -> Option<&BoatEdit> {
        self.edits.get(id)
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoatEdit> {
        self.edits.values()
    }

    pub fn into_edits(self) -> Vec<BoatEdit> {
        self.edits.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_same_boat_merges_fields() {
        let mut draft = EditDraft::default();
        draft.stage(BoatEdit::new("b1").with_price(6000.0));
        draft.stage(BoatEdit::new("b1").with_name("Kai II"));
        draft.stage(BoatEdit::new("b2").with_length(20.0));

        assert_eq!(draft.len(), 2);
        let b1 = draft.get(&BoatId::from("b1")).expect("staged");
        assert_eq!(b1.price, Some(6000.0));
        assert_eq!(b1.name.as_deref(), Some("Kai II"));
    }

    #[test]
    fn empty_edits_are_ignored() {
        let mut draft = EditDraft::default();
        draft.stage(BoatEdit::new("b1"));
        assert!(draft.is_empty());
    }

    #[test]
    fn into_edits_preserves_staging_order() {
        let mut draft = EditDraft::default();
        draft.stage(BoatEdit::new("b2").with_price(1.0));
        draft.stage(BoatEdit::new("b1").with_price(2.0));
        draft.stage(BoatEdit::new("b2").with_name("again"));

        let ids: Vec<String> = draft.into_edits().into_iter().map(|e| e.id.to_string()).collect();
        assert_eq!(ids, ["b2", "b1"]);
    }
}
