//! Bounding region shapes as delivered by upstream extraction
//!
//! The extraction service is inconsistent: depending on the SDK version a
//! region arrives as a JSON record or as the printed form of a record
//! (`"{'pageNumber': 1, 'polygon': [...]}"`). Both are kept as-is here and
//! normalised by the overlay engine.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A region exactly as received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawBoundingRegion {
    Structured(StructuredRegion),
    Encoded(String),
    /// Anything else; never yields a highlight
    Other(serde_json::Value),
}

/// The record form of a region
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredRegion {
    #[serde(
        rename = "pageNumber",
        alias = "page_number",
        default,
        deserialize_with = "lenient_page_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub page_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<PolygonRepr>,
}

/// The polygon of a structured region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PolygonRepr {
    /// `[x1, y1, x2, y2, ...]`
    Numbers(Vec<f64>),
    /// `[{"x": .., "y": ..}, ...]`
    Points(Vec<PolygonPoint>),
    /// `["x1", y1, "x2", ...]`, numbers mixed with numeric text
    Tokens(Vec<PolygonToken>),
    /// `"x1, y1, x2, y2, ..."`
    Joined(String),
}

/// One element of a [`PolygonRepr::Tokens`] polygon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PolygonToken {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolygonPoint {
    pub x: f64,
    pub y: f64,
}

/// Canonical region: a 1-based page number and four corner points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingRegion {
    pub page_number: u32,
    pub polygon: [f64; 8],
}

impl BoundingRegion {
    /// Corner points in input order
    pub fn corners(&self) -> [(f64, f64); 4] {
        let p = &self.polygon;
        [(p[0], p[1]), (p[2], p[3]), (p[4], p[5]), (p[6], p[7])]
    }
}

/// Page number from a loosely typed JSON value.
///
/// Accepts integers, integral floats (`2.0`) and numeric strings (`"2"`).
/// Anything else, including negative or fractional numbers, yields `None`.
pub fn page_number_from_value(value: &Value) -> Option<u32> {
    let page = match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }?;
    u32::try_from(page).ok()
}

fn integral(n: f64) -> Option<u64> {
    (n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64).then_some(n as u64)
}

fn lenient_page_number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(page_number_from_value))
}

impl RawBoundingRegion {
    pub fn structured(page_number: u32, polygon: Vec<f64>) -> Self {
        RawBoundingRegion::Structured(StructuredRegion {
            page_number: Some(page_number),
            polygon: Some(PolygonRepr::Numbers(polygon)),
        })
    }
}
