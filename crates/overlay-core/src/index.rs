//! Flat, key-addressable view over an extracted document
//!
//! The index is shared by the form (what to render, in which order) and the
//! page overlays (where to highlight), so both sides agree on every
//! [`FieldKey`].

use std::collections::HashMap;

use serde::Serialize;
use shared_types::{BoundingRegion, ExtractedDocument, ExtractedField, FieldKey};
use tracing::debug;

use crate::region;

/// Which field names to index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSelection {
    /// Every field present, in name order
    All,
    /// Only these names, in this order
    Only(Vec<String>),
}

impl FieldSelection {
    pub fn only<S: AsRef<str>>(names: &[S]) -> Self {
        FieldSelection::Only(names.iter().map(|n| n.as_ref().to_string()).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub document_fields: FieldSelection,
    pub item_fields: FieldSelection,
}

impl IndexSpec {
    /// Index every document-level and line-item field
    pub fn all() -> Self {
        Self {
            document_fields: FieldSelection::All,
            item_fields: FieldSelection::All,
        }
    }
}

/// One highlightable element
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldEntry {
    pub key: FieldKey,
    /// Field name without the item suffix
    pub name: String,
    /// Position of the owning line item; `None` for document-level fields
    pub item_index: Option<usize>,
    /// `None` when a tracked line-item field is missing from the item
    pub field: Option<ExtractedField>,
    pub page_num: u32,
    /// Parsed first bounding region; `None` means no highlight
    pub region: Option<BoundingRegion>,
}

impl FieldEntry {
    fn new(key: FieldKey, name: &str, item_index: Option<usize>, field: Option<&ExtractedField>) -> Self {
        let first = field.and_then(|f| f.first_region());
        Self {
            key,
            name: name.to_string(),
            item_index,
            field: field.cloned(),
            page_num: region::page_number_or_default(first),
            region: first.and_then(region::parse),
        }
    }

    /// Extracted text: content, then value, then empty
    pub fn display_value(&self) -> String {
        self.field
            .as_ref()
            .map(ExtractedField::display_text)
            .unwrap_or_default()
    }

    pub fn is_line_item(&self) -> bool {
        self.item_index.is_some()
    }

    pub fn has_highlight(&self) -> bool {
        self.region.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FieldIndex {
    entries: Vec<FieldEntry>,
    positions: HashMap<FieldKey, usize>,
    item_count: usize,
}

impl FieldIndex {
    /// Index a document.
    ///
    /// Document-level entries come first in selection order (only fields
    /// present in the document), followed by every `(item, tracked field)`
    /// pair in document order.
    pub fn build(document: &ExtractedDocument, spec: &IndexSpec) -> Self {
        let mut index = FieldIndex {
            item_count: document.items.len(),
            ..Default::default()
        };

        let document_names: Vec<&str> = match &spec.document_fields {
            FieldSelection::All => document.fields.keys().map(String::as_str).collect(),
            FieldSelection::Only(names) => names.iter().map(String::as_str).collect(),
        };
        for name in document_names {
            if let Some(field) = document.fields.get(name) {
                index.push(FieldEntry::new(FieldKey::document(name), name, None, Some(field)));
            }
        }

        for (item_index, item) in document.items.iter().enumerate() {
            let item_names: Vec<&str> = match &spec.item_fields {
                FieldSelection::All => item.fields.keys().map(String::as_str).collect(),
                FieldSelection::Only(names) => names.iter().map(String::as_str).collect(),
            };
            for name in item_names {
                index.push(FieldEntry::new(
                    FieldKey::line_item(name, item_index),
                    name,
                    Some(item_index),
                    item.fields.get(name),
                ));
            }
        }

        debug!(
            entries = index.entries.len(),
            highlightable = index.entries.iter().filter(|e| e.has_highlight()).count(),
            "built field index"
        );
        index
    }

    fn push(&mut self, entry: FieldEntry) {
        if self.positions.contains_key(&entry.key) {
            debug!(key = %entry.key, "duplicate field key skipped");
            return;
        }
        self.positions.insert(entry.key.clone(), self.entries.len());
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[FieldEntry] {
        &self.entries
    }

    pub fn get(&self, key: &FieldKey) -> Option<&FieldEntry> {
        self.positions.get(key).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, key: &FieldKey) -> bool {
        self.positions.contains_key(key)
    }

    /// Entries whose first region sits on `page`
    pub fn on_page(&self, page: u32) -> impl Iterator<Item = &FieldEntry> {
        self.entries.iter().filter(move |e| e.page_num == page)
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Highest page any entry refers to
    pub fn page_count_hint(&self) -> u32 {
        self.entries
            .iter()
            .map(|e| e.page_num)
            .max()
            .unwrap_or(region::DEFAULT_PAGE_NUMBER)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
