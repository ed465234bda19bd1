//! Highlight boxes to draw over one rendered page

use serde::Serialize;
use shared_types::FieldKey;

use crate::hover::HoverState;
use crate::index::{FieldEntry, FieldIndex};
use crate::projection::{OverlayRect, PageSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HighlightKind {
    /// Document-level field
    Field,
    /// Field of a line item
    LineItem,
}

/// Visual style of a highlight box
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightStyle {
    pub fill: &'static str,
    pub border: &'static str,
    pub radius_px: u8,
}

impl HighlightKind {
    pub fn of(entry: &FieldEntry) -> Self {
        if entry.is_line_item() {
            HighlightKind::LineItem
        } else {
            HighlightKind::Field
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            HighlightKind::Field => "pdf-highlight field-highlight",
            HighlightKind::LineItem => "pdf-highlight item-highlight",
        }
    }

    pub fn style(&self, is_active: bool) -> HighlightStyle {
        match (self, is_active) {
            (HighlightKind::Field, false) => HighlightStyle {
                fill: "rgba(255, 0, 0, 0.3)",
                border: "2px solid #ff0000",
                radius_px: 3,
            },
            (HighlightKind::Field, true) => HighlightStyle {
                fill: "rgba(255, 0, 0, 0.6)",
                border: "2px solid #ff0000",
                radius_px: 3,
            },
            (HighlightKind::LineItem, false) => HighlightStyle {
                fill: "rgba(0, 100, 255, 0.3)",
                border: "2px solid #0064ff",
                radius_px: 2,
            },
            (HighlightKind::LineItem, true) => HighlightStyle {
                fill: "rgba(0, 100, 255, 0.6)",
                border: "2px solid #0064ff",
                radius_px: 2,
            },
        }
    }
}

/// One highlight box on the displayed page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayItem {
    pub key: FieldKey,
    pub rect: OverlayRect,
    pub is_active: bool,
    pub kind: HighlightKind,
    /// Tooltip: `"{name}: {value}"`
    pub title: String,
}

impl OverlayItem {
    pub fn style(&self) -> HighlightStyle {
        self.kind.style(self.is_active)
    }
}

/// Overlays for `page`, in index order.
///
/// Entries on other pages and entries without a projectable region are
/// skipped; they still appear in the form.
pub fn plan_page(
    index: &FieldIndex,
    page: u32,
    reference: PageSize,
    hover: &HoverState,
) -> Vec<OverlayItem> {
    index
        .on_page(page)
        .filter_map(|entry| {
            let region = entry.region.as_ref()?;
            let rect = reference.project(&region.polygon)?;
            Some(OverlayItem {
                key: entry.key.clone(),
                rect,
                is_active: hover.is_active(&entry.key),
                kind: HighlightKind::of(entry),
                title: format!("{}: {}", entry.name, entry.display_value()),
            })
        })
        .collect()
}
