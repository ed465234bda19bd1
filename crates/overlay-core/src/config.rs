//! Review configuration
//!
//! Loaded from TOML. Every section is optional; an empty file yields the
//! stock invoice layout.
//!
//! ```toml
//! [fields]
//! display = ["VendorName", "InvoiceId", "InvoiceTotal"]
//! line_items = ["Description", "Amount"]
//!
//! [page]
//! default_width = 8.5
//! default_height = 11.0
//! unit = "inch"
//!
//! [viewer]
//! zoom_min = 0.5
//! zoom_max = 3.0
//! zoom_step = 0.2
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::OverlayError;
use crate::index::{FieldSelection, IndexSpec};
use crate::projection::{LengthUnit, PageSize};
use crate::viewport::ZoomLimits;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewConfig {
    #[serde(default)]
    pub fields: FieldsConfig,
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub viewer: ViewerConfig,
}

impl ReviewConfig {
    /// Load and validate a TOML configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed,
    /// or the values fail [`ReviewConfig::validate`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse and validate configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: ReviewConfig = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), OverlayError> {
        let page = &self.page;
        if !(page.default_width.is_finite() && page.default_width > 0.0)
            || !(page.default_height.is_finite() && page.default_height > 0.0)
        {
            return Err(OverlayError::InvalidConfig(format!(
                "page size must be positive, got {}x{}",
                page.default_width, page.default_height
            )));
        }
        page.unit
            .parse::<LengthUnit>()
            .map_err(OverlayError::InvalidConfig)?;

        let viewer = &self.viewer;
        if viewer.zoom_min <= 0.0 || viewer.zoom_min > viewer.zoom_max {
            return Err(OverlayError::InvalidConfig(format!(
                "zoom range {}..{} is invalid",
                viewer.zoom_min, viewer.zoom_max
            )));
        }
        if viewer.zoom_step <= 0.0 {
            return Err(OverlayError::InvalidConfig(format!(
                "zoom step must be positive, got {}",
                viewer.zoom_step
            )));
        }
        Ok(())
    }

    pub fn index_spec(&self) -> IndexSpec {
        IndexSpec {
            document_fields: FieldSelection::only(&self.fields.display),
            item_fields: FieldSelection::only(&self.fields.line_items),
        }
    }

    pub fn zoom_limits(&self) -> ZoomLimits {
        ZoomLimits {
            min: self.viewer.zoom_min,
            max: self.viewer.zoom_max,
            step: self.viewer.zoom_step,
        }
    }

    /// Fallback reference size; an unparseable unit falls back to inches
    pub fn default_page_size(&self) -> PageSize {
        let unit = self.page.unit.parse().unwrap_or(LengthUnit::Inch);
        PageSize::new(self.page.default_width, self.page.default_height, unit)
    }
}

/// Which fields the form shows and the page highlights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldsConfig {
    /// Document-level fields, in display order
    #[serde(default = "default_display_fields")]
    pub display: Vec<String>,
    /// Fields tracked for every line item
    #[serde(default = "default_line_item_fields")]
    pub line_items: Vec<String>,
}

impl Default for FieldsConfig {
    fn default() -> Self {
        Self {
            display: default_display_fields(),
            line_items: default_line_item_fields(),
        }
    }
}

fn default_display_fields() -> Vec<String> {
    [
        "VendorName",
        "VendorAddress",
        "VendorPhoneNumber",
        "CustomerName",
        "CustomerId",
        "InvoiceId",
        "InvoiceDate",
        "InvoiceTotal",
        "DueDate",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_line_item_fields() -> Vec<String> {
    vec!["Description".to_string(), "Amount".to_string()]
}

/// Reference page size used when nothing better is known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_page_width")]
    pub default_width: f64,
    #[serde(default = "default_page_height")]
    pub default_height: f64,
    #[serde(default = "default_page_unit")]
    pub unit: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            default_width: default_page_width(),
            default_height: default_page_height(),
            unit: default_page_unit(),
        }
    }
}

fn default_page_width() -> f64 {
    8.5
}

fn default_page_height() -> f64 {
    11.0
}

fn default_page_unit() -> String {
    "inch".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default = "default_zoom_min")]
    pub zoom_min: f64,
    #[serde(default = "default_zoom_max")]
    pub zoom_max: f64,
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            zoom_min: default_zoom_min(),
            zoom_max: default_zoom_max(),
            zoom_step: default_zoom_step(),
        }
    }
}

fn default_zoom_min() -> f64 {
    0.5
}

fn default_zoom_max() -> f64 {
    3.0
}

fn default_zoom_step() -> f64 {
    0.2
}
