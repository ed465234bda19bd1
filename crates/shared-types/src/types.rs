use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::null_as_default;
use crate::region::RawBoundingRegion;

/// One processed invoice as delivered by the extraction service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_number: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: BTreeMap<String, ExtractedField>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<LineItem>,
}

impl ExtractedDocument {
    /// Get a document-level field by name
    pub fn field(&self, name: &str) -> Option<&ExtractedField> {
        self.fields.get(name)
    }

    /// Get a field of a line item
    pub fn item_field(&self, index: usize, name: &str) -> Option<&ExtractedField> {
        self.items.get(index).and_then(|item| item.fields.get(name))
    }
}

/// A repeated line item (invoice row)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_number: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: BTreeMap<String, ExtractedField>,
}

/// A single extracted value with its source location(s)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Typed value; a string, number or object depending on the field kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(
        default,
        alias = "boundingRegions",
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub bounding_regions: Vec<RawBoundingRegion>,
}

impl ExtractedField {
    /// Field with only textual content and no location
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Text shown to the reviewer: content, then value, then empty
    pub fn display_text(&self) -> String {
        if let Some(content) = self.content.as_deref().filter(|c| !c.is_empty()) {
            return content.to_string();
        }

        match &self.value {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(serde_json::Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }

    /// First bounding region; later regions are never highlighted
    pub fn first_region(&self) -> Option<&RawBoundingRegion> {
        self.bounding_regions.first()
    }
}

/// Identifier joining a form element to its highlight overlay.
///
/// Document-level fields use the bare field name, line-item fields use
/// `name-index`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldKey(String);

impl FieldKey {
    pub fn document(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn line_item(name: &str, index: usize) -> Self {
        Self(format!("{}-{}", name, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the key has the `name-index` line-item shape
    pub fn is_line_item(&self) -> bool {
        match self.0.rsplit_once('-') {
            Some((name, index)) => {
                !name.is_empty() && !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit())
            }
            None => false,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FieldKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_text_prefers_content() {
        let field = ExtractedField {
            content: Some("INV-100".to_string()),
            value: Some(serde_json::json!("INV-0100")),
            ..Default::default()
        };
        assert_eq!(field.display_text(), "INV-100");
    }

    #[test]
    fn test_display_text_falls_back_to_value() {
        let field = ExtractedField {
            content: Some(String::new()),
            value: Some(serde_json::json!(110.5)),
            ..Default::default()
        };
        assert_eq!(field.display_text(), "110.5");

        let field = ExtractedField {
            value: Some(serde_json::json!({"street_address": "123 Main St"})),
            ..Default::default()
        };
        assert_eq!(field.display_text(), "");
        assert_eq!(ExtractedField::default().display_text(), "");
    }

    #[test]
    fn test_field_keys() {
        assert_eq!(FieldKey::document("InvoiceId").as_str(), "InvoiceId");
        assert_eq!(FieldKey::line_item("Amount", 2).as_str(), "Amount-2");
        assert!(FieldKey::line_item("Amount", 2).is_line_item());
        assert!(!FieldKey::document("InvoiceId").is_line_item());
        assert!(!FieldKey::from("Amount-").is_line_item());
        assert!(!FieldKey::from("Sub-Total").is_line_item());
    }

    #[test]
    fn test_document_deserializes_with_nulls() {
        let json = r#"{
            "document_number": 1,
            "fields": {
                "InvoiceId": {"content": "INV-100", "confidence": 0.97, "bounding_regions": null}
            },
            "items": null
        }"#;
        let doc: ExtractedDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.document_number, Some(1));
        assert!(doc.items.is_empty());
        let field = doc.field("InvoiceId").unwrap();
        assert!(field.bounding_regions.is_empty());
        assert_eq!(field.confidence, Some(0.97));
    }

    #[test]
    fn test_item_field_lookup() {
        let json = r#"{
            "items": [
                {"item_number": 1, "fields": {"Amount": {"content": "$10.00"}}},
                {"item_number": 2}
            ]
        }"#;
        let doc: ExtractedDocument = serde_json::from_str(json).unwrap();
        assert_eq!(
            doc.item_field(0, "Amount").map(|f| f.display_text()),
            Some("$10.00".to_string())
        );
        assert!(doc.item_field(1, "Amount").is_none());
        assert!(doc.item_field(5, "Amount").is_none());
    }

    #[test]
    fn test_field_key_serializes_as_string() {
        let key = FieldKey::line_item("Description", 0);
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"Description-0\"");
    }
}
