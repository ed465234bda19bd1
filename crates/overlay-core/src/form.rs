//! Editable view of the extracted document
//!
//! Edits are kept beside the source document, keyed like everything else by
//! [`FieldKey`]. The extraction result itself is shared and never mutated;
//! [`ReviewForm::edited_document`] materialises a new copy on demand.

use std::collections::HashMap;
use std::sync::Arc;

use shared_types::{ExtractedDocument, ExtractedField, FieldKey};
use tracing::debug;

use crate::index::FieldEntry;

#[derive(Debug, Clone)]
pub struct ReviewForm {
    source: Arc<ExtractedDocument>,
    edits: HashMap<FieldKey, String>,
}

impl ReviewForm {
    pub fn new(source: Arc<ExtractedDocument>) -> Self {
        Self {
            source,
            edits: HashMap::new(),
        }
    }

    pub fn source(&self) -> &ExtractedDocument {
        &self.source
    }

    /// Record the reviewer's text for a field
    pub fn set_value(&mut self, key: &FieldKey, text: impl Into<String>) {
        let text = text.into();
        debug!(key = %key, "field edited");
        self.edits.insert(key.clone(), text);
    }

    /// Value shown in the input: edit, then extracted content, then value
    pub fn value(&self, entry: &FieldEntry) -> String {
        match self.edits.get(&entry.key) {
            Some(text) => text.clone(),
            None => entry.display_value(),
        }
    }

    pub fn is_edited(&self, key: &FieldKey) -> bool {
        self.edits.contains_key(key)
    }

    pub fn revert(&mut self, key: &FieldKey) -> bool {
        self.edits.remove(key).is_some()
    }

    /// Copy of the source document with every edit written into `content`.
    ///
    /// Line-item edits for fields the item lacks create the field. Edits for
    /// keys that match nothing in the document are dropped.
    pub fn edited_document(&self) -> ExtractedDocument {
        let mut document = (*self.source).clone();
        for (key, text) in &self.edits {
            if let Some(field) = document.fields.get_mut(key.as_str()) {
                field.content = Some(text.clone());
                continue;
            }
            let Some((name, index)) = split_item_key(key.as_str()) else {
                debug!(key = %key, "edit for unknown field dropped");
                continue;
            };
            match document.items.get_mut(index) {
                Some(item) => {
                    item.fields
                        .entry(name.to_string())
                        .and_modify(|field| field.content = Some(text.clone()))
                        .or_insert_with(|| ExtractedField::with_content(text.clone()));
                }
                None => debug!(key = %key, "edit for unknown line item dropped"),
            }
        }
        document
    }
}

/// `"Amount-2"` → `("Amount", 2)`
fn split_item_key(key: &str) -> Option<(&str, usize)> {
    let (name, index) = key.rsplit_once('-')?;
    if name.is_empty() {
        return None;
    }
    Some((name, index.parse().ok()?))
}

/// Human label for a field name: `"VendorName"` → `"Vendor Name"`
pub fn field_label(name: &str) -> String {
    let mut label = String::with_capacity(name.len() + 4);
    let mut previous: Option<char> = None;
    for c in name.chars() {
        if c.is_uppercase() && previous.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
            label.push(' ');
        }
        label.push(c);
        previous = Some(c);
    }
    label
}

/// Helper text under an input, only for fields present in the document
pub fn page_hint(entry: &FieldEntry) -> Option<String> {
    entry.field.as_ref().map(|_| format!("Page {}", entry.page_num))
}

/// Heading of a line item's section
pub fn item_title(document: &ExtractedDocument, item_index: usize) -> String {
    document
        .item_field(item_index, "Description")
        .and_then(|field| field.content.clone())
        .filter(|content| !content.is_empty())
        .unwrap_or_else(|| format!("Item {}", item_index + 1))
}
