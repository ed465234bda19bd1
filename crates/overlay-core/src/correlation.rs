//! Explicit key → element table for the two views
//!
//! The rendering layer registers a handle for every form row and overlay box
//! it creates. Connecting the hovered form row to its highlight (the arrow
//! between the two panes) is then a table lookup by [`FieldKey`] rather than
//! a search through either UI tree.

use std::collections::HashMap;

use shared_types::FieldKey;

use crate::hover::HoverState;
use crate::index::FieldIndex;

#[derive(Debug, Clone)]
pub struct Anchors<H> {
    pub form: Option<H>,
    pub overlay: Option<H>,
}

impl<H> Default for Anchors<H> {
    fn default() -> Self {
        Self {
            form: None,
            overlay: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CorrelationTable<H> {
    anchors: HashMap<FieldKey, Anchors<H>>,
}

impl<H> CorrelationTable<H> {
    /// Table with one empty slot per indexed key
    pub fn from_index(index: &FieldIndex) -> Self {
        let anchors = index
            .entries()
            .iter()
            .map(|entry| (entry.key.clone(), Anchors::default()))
            .collect();
        Self { anchors }
    }

    /// Register the form element for `key`; unknown keys are ignored
    pub fn bind_form(&mut self, key: &FieldKey, handle: H) -> bool {
        match self.anchors.get_mut(key) {
            Some(slot) => {
                slot.form = Some(handle);
                true
            }
            None => false,
        }
    }

    /// Register the overlay element for `key`; unknown keys are ignored
    pub fn bind_overlay(&mut self, key: &FieldKey, handle: H) -> bool {
        match self.anchors.get_mut(key) {
            Some(slot) => {
                slot.overlay = Some(handle);
                true
            }
            None => false,
        }
    }

    /// Drop every overlay handle (the page view re-created its overlays)
    pub fn unbind_overlays(&mut self) {
        for slot in self.anchors.values_mut() {
            slot.overlay = None;
        }
    }

    pub fn anchors(&self, key: &FieldKey) -> Option<&Anchors<H>> {
        self.anchors.get(key)
    }

    /// Form and overlay element of the hovered key, when both are on screen
    pub fn connector(&self, hover: &HoverState) -> Option<(&H, &H)> {
        let slot = self.anchors.get(hover.key.as_ref()?)?;
        Some((slot.form.as_ref()?, slot.overlay.as_ref()?))
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexSpec;
    use shared_types::ExtractedDocument;

    fn table() -> CorrelationTable<&'static str> {
        let doc: ExtractedDocument = serde_json::from_value(serde_json::json!({
            "fields": {"InvoiceId": {"content": "INV-100"}},
            "items": [{"fields": {"Amount": {"content": "$1"}}}]
        }))
        .unwrap();
        CorrelationTable::from_index(&FieldIndex::build(&doc, &IndexSpec::all()))
    }

    fn hovering(key: &str) -> HoverState {
        HoverState {
            key: Some(FieldKey::from(key)),
            page_num: Some(1),
        }
    }

    #[test]
    fn test_connector_needs_both_anchors() {
        let mut table = table();
        let key = FieldKey::document("InvoiceId");
        assert!(table.connector(&hovering("InvoiceId")).is_none());

        assert!(table.bind_form(&key, "json-InvoiceId"));
        assert!(table.connector(&hovering("InvoiceId")).is_none());

        assert!(table.bind_overlay(&key, "pdf-InvoiceId"));
        assert_eq!(
            table.connector(&hovering("InvoiceId")),
            Some((&"json-InvoiceId", &"pdf-InvoiceId"))
        );
        assert!(table.connector(&HoverState::idle()).is_none());
    }

    #[test]
    fn test_unknown_keys_are_not_bound() {
        let mut table = table();
        assert_eq!(table.len(), 2);
        assert!(!table.bind_form(&FieldKey::from("Nope"), "json-Nope"));
        assert!(table.anchors(&FieldKey::from("Nope")).is_none());
    }

    #[test]
    fn test_unbind_overlays_keeps_form() {
        let mut table = table();
        let key = FieldKey::line_item("Amount", 0);
        table.bind_form(&key, "json-Amount-0");
        table.bind_overlay(&key, "pdf-Amount-0");

        table.unbind_overlays();
        let anchors = table.anchors(&key).unwrap();
        assert_eq!(anchors.form, Some("json-Amount-0"));
        assert_eq!(anchors.overlay, None);
        assert!(table.connector(&hovering("Amount-0")).is_none());
    }
}
