pub mod envelope;
pub mod region;
pub mod types;

pub use envelope::{AnalysisPage, EnvelopeMetadata, ExtractedData, FullAnalysis, ReviewEnvelope};
pub use region::{
    page_number_from_value, BoundingRegion, PolygonPoint, PolygonRepr, PolygonToken,
    RawBoundingRegion, StructuredRegion,
};
pub use types::{ExtractedDocument, ExtractedField, FieldKey, LineItem};

use serde::{Deserialize, Deserializer};

/// Deserialize `null` the same way as a missing key.
///
/// Upstream extraction emits `null` for empty collections in some SDK
/// versions, which would otherwise fail the whole document.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
