//! Projection of page-space polygons onto percentage-based overlay boxes
//!
//! Overlays are positioned in percent of the page so they stay aligned with
//! the rendered page under any zoom or rotation applied to the container.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shared_types::{AnalysisPage, ReviewEnvelope};

use crate::error::GeometryError;
use crate::region::POLYGON_LEN;

const POINTS_PER_INCH: f64 = 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Inch,
    Point,
    Pixel,
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inch" | "in" => Ok(LengthUnit::Inch),
            "point" | "pt" => Ok(LengthUnit::Point),
            "pixel" | "px" => Ok(LengthUnit::Pixel),
            other => Err(format!("unknown length unit: {}", other)),
        }
    }
}

/// Native size of a page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
    pub unit: LengthUnit,
}

impl PageSize {
    /// US Letter, the reference size when nothing better is known
    pub const LETTER: PageSize = PageSize {
        width: 8.5,
        height: 11.0,
        unit: LengthUnit::Inch,
    };

    pub fn new(width: f64, height: f64, unit: LengthUnit) -> Self {
        Self {
            width,
            height,
            unit,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Express this size in another unit.
    ///
    /// Pixel sizes have no known resolution and only convert to pixels.
    pub fn to_unit(&self, unit: LengthUnit) -> Option<PageSize> {
        let (width, height) = match (self.unit, unit) {
            (from, to) if from == to => (self.width, self.height),
            (LengthUnit::Inch, LengthUnit::Point) => {
                (self.width * POINTS_PER_INCH, self.height * POINTS_PER_INCH)
            }
            (LengthUnit::Point, LengthUnit::Inch) => {
                (self.width / POINTS_PER_INCH, self.height / POINTS_PER_INCH)
            }
            _ => return None,
        };
        Some(PageSize::new(width, height, unit))
    }

    /// Size reported by the layout analysis, when complete and valid
    pub fn from_analysis(page: &AnalysisPage) -> Option<PageSize> {
        let unit = match page.unit.as_deref() {
            Some(unit) => unit.parse().ok()?,
            None => LengthUnit::Inch,
        };
        let size = PageSize::new(page.width?, page.height?, unit);
        size.is_valid().then_some(size)
    }

    pub fn project(&self, polygon: &[f64]) -> Option<OverlayRect> {
        project(polygon, self.width, self.height)
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::LETTER
    }
}

/// Highlight box in percent of the page's width and height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayRect {
    pub left_pct: f64,
    pub top_pct: f64,
    pub width_pct: f64,
    pub height_pct: f64,
}

impl OverlayRect {
    /// CSS properties positioning the overlay inside a relatively positioned page
    pub fn to_css(&self) -> [(&'static str, String); 4] {
        [
            ("left", format!("{}%", self.left_pct)),
            ("top", format!("{}%", self.top_pct)),
            ("width", format!("{}%", self.width_pct)),
            ("height", format!("{}%", self.height_pct)),
        ]
    }
}

/// Project a polygon onto a page of the given size.
///
/// Returns `None` for anything but exactly 8 finite numbers or for a
/// degenerate page size.
pub fn project(polygon: &[f64], page_width: f64, page_height: f64) -> Option<OverlayRect> {
    try_project(polygon, page_width, page_height).ok()
}

/// Strict form of [`project`].
///
/// The result is the axis-aligned box enclosing the quadrilateral, so a
/// rotated text region gets a looser highlight than its true outline.
pub fn try_project(
    polygon: &[f64],
    page_width: f64,
    page_height: f64,
) -> Result<OverlayRect, GeometryError> {
    if polygon.len() != POLYGON_LEN {
        return Err(GeometryError::WrongArity(polygon.len()));
    }
    if !PageSize::new(page_width, page_height, LengthUnit::Inch).is_valid() {
        return Err(GeometryError::InvalidPageSize {
            width: page_width,
            height: page_height,
        });
    }
    if polygon.iter().any(|n| !n.is_finite()) {
        return Err(GeometryError::NonFinite);
    }

    let xs = polygon.iter().step_by(2).copied();
    let ys = polygon.iter().skip(1).step_by(2).copied();

    let (min_x, max_x) = min_max(xs);
    let (min_y, max_y) = min_max(ys);

    Ok(OverlayRect {
        left_pct: min_x / page_width * 100.0,
        top_pct: min_y / page_height * 100.0,
        width_pct: (max_x - min_x) / page_width * 100.0,
        height_pct: (max_y - min_y) / page_height * 100.0,
    })
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Reference page sizes used to project each page's polygons.
///
/// Resolution order: size reported by the page view after rendering, size
/// from the upstream layout analysis, configured default. The rendered size
/// belongs to the page view; callers pass it in when resolving.
#[derive(Debug, Clone)]
pub struct ReferenceSizes {
    default: PageSize,
    polygon_unit: LengthUnit,
    analysis: BTreeMap<u32, PageSize>,
}

impl ReferenceSizes {
    pub fn new(default: PageSize) -> Self {
        Self {
            default,
            polygon_unit: default.unit,
            analysis: BTreeMap::new(),
        }
    }

    /// Seed from the envelope's layout analysis; its unit becomes the polygon unit
    pub fn from_envelope(envelope: &ReviewEnvelope, default: PageSize) -> Self {
        let mut sizes = Self::new(default);
        for page in envelope.analysis_pages() {
            if let Some(size) = PageSize::from_analysis(page) {
                sizes.analysis.insert(page.page_number, size);
            }
        }
        if let Some(first) = sizes.analysis.values().next() {
            sizes.polygon_unit = first.unit;
        }
        sizes
    }

    pub fn polygon_unit(&self) -> LengthUnit {
        self.polygon_unit
    }

    /// Express a size reported by the page view in the polygon unit.
    ///
    /// `None` when the size is unusable or cannot be converted.
    pub fn accept_rendered(&self, size: PageSize) -> Option<PageSize> {
        size.to_unit(self.polygon_unit).filter(PageSize::is_valid)
    }

    /// Reference size for a page, always in the polygon unit when convertible
    pub fn resolve(&self, page: u32, rendered: Option<PageSize>) -> PageSize {
        if let Some(size) = rendered.and_then(|size| self.accept_rendered(size)) {
            return size;
        }
        if let Some(size) = self.analysis.get(&page) {
            return *size;
        }
        self.default
            .to_unit(self.polygon_unit)
            .unwrap_or(self.default)
    }
}

impl Default for ReferenceSizes {
    fn default() -> Self {
        Self::new(PageSize::LETTER)
    }
}
