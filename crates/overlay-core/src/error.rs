use thiserror::Error;

/// Why a bounding region could not be normalised
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegionError {
    #[error("region has no polygon")]
    MissingPolygon,

    #[error("invalid polygon coordinate: {0:?}")]
    InvalidNumber(String),

    #[error("polygon has {0} numbers, expected 8")]
    WrongArity(usize),

    #[error("unrecognised region shape")]
    UnknownShape,
}

/// Why a polygon could not be projected onto a page
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("polygon has {0} numbers, expected 8")]
    WrongArity(usize),

    #[error("invalid page size {width}x{height}")]
    InvalidPageSize { width: f64, height: f64 },

    #[error("polygon contains a non-finite coordinate")]
    NonFinite,
}

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("envelope contains no extracted document")]
    NoDocument,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse extraction JSON: {0}")]
    Json(#[from] serde_json::Error),
}
