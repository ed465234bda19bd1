//! Extraction envelope handed to the review UI after upload
//!
//! ```json
//! {
//!   "preap_metadata": { "preap_version": "1.0", "source": { ... } },
//!   "extracted_data": { "documents": [ { "fields": {...}, "items": [...] } ] },
//!   "full_analysis": { "pages": [ { "pageNumber": 1, "width": 8.5, "height": 11, "unit": "inch" } ] }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::null_as_default;
use crate::types::ExtractedDocument;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preap_metadata: Option<EnvelopeMetadata>,
    #[serde(default)]
    pub extracted_data: ExtractedData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_analysis: Option<FullAnalysis>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeMetadata {
    #[serde(default)]
    pub preap_version: Option<String>,
    #[serde(default)]
    pub preap_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Upload details (file name, size, uploaded file id); shape owned by the uploader
    #[serde(default)]
    pub source: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub documents: Vec<ExtractedDocument>,
}

/// Subset of the raw layout analysis the overlay engine cares about
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FullAnalysis {
    #[serde(default, deserialize_with = "null_as_default")]
    pub pages: Vec<AnalysisPage>,
}

/// Native size of one analysed page, in the unit polygons are expressed in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPage {
    #[serde(rename = "pageNumber", alias = "page_number")]
    pub page_number: u32,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    /// `"inch"`, `"pixel"` or `"point"`
    #[serde(default)]
    pub unit: Option<String>,
}

impl ReviewEnvelope {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Wrap a bare document (no metadata, no analysis)
    pub fn from_document(document: ExtractedDocument) -> Self {
        Self {
            preap_metadata: None,
            extracted_data: ExtractedData {
                documents: vec![document],
            },
            full_analysis: None,
        }
    }

    /// The document under review; only the first one is ever shown
    pub fn first_document(&self) -> Option<&ExtractedDocument> {
        self.extracted_data.documents.first()
    }

    pub fn analysis_pages(&self) -> &[AnalysisPage] {
        self.full_analysis
            .as_ref()
            .map(|analysis| analysis.pages.as_slice())
            .unwrap_or(&[])
    }

    pub fn analysis_page(&self, page_number: u32) -> Option<&AnalysisPage> {
        self.analysis_pages()
            .iter()
            .find(|page| page.page_number == page_number)
    }

    /// Identifier the uploader assigned to the stored PDF, if any
    pub fn uploaded_file_id(&self) -> Option<&str> {
        self.preap_metadata
            .as_ref()?
            .source
            .get("uploaded_file")?
            .get("file_id")?
            .as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ENVELOPE: &str = r#"{
        "preap_metadata": {
            "preap_version": "1.0",
            "preap_id": "4f1c",
            "timestamp": "2025-01-01T00:00:00Z",
            "source": {"file_name": "invoice.pdf", "uploaded_file": {"file_id": "abc123"}}
        },
        "extracted_data": {
            "documents": [
                {"document_number": 1, "fields": {"InvoiceId": {"content": "INV-100"}}}
            ]
        },
        "full_analysis": {
            "metadata": {"modelId": "prebuilt-invoice"},
            "pages": [{"pageNumber": 1, "width": 8.5, "height": 11, "unit": "inch", "words": []}]
        }
    }"#;

    #[test]
    fn test_envelope_parses() {
        let envelope = ReviewEnvelope::from_json(ENVELOPE).unwrap();
        let doc = envelope.first_document().unwrap();
        assert_eq!(doc.field("InvoiceId").unwrap().display_text(), "INV-100");
        assert_eq!(envelope.uploaded_file_id(), Some("abc123"));

        let page = envelope.analysis_page(1).unwrap();
        assert_eq!(page.width, Some(8.5));
        assert_eq!(page.unit.as_deref(), Some("inch"));
        assert!(envelope.analysis_page(2).is_none());
    }

    #[test]
    fn test_empty_envelope_has_no_document() {
        let envelope = ReviewEnvelope::from_json(r#"{"extracted_data": {"documents": []}}"#).unwrap();
        assert!(envelope.first_document().is_none());
        assert!(envelope.analysis_pages().is_empty());
        assert_eq!(envelope.uploaded_file_id(), None);
    }

    #[test]
    fn test_from_document() {
        let envelope = ReviewEnvelope::from_document(ExtractedDocument::default());
        assert_eq!(envelope.extracted_data.documents.len(), 1);
    }
}
