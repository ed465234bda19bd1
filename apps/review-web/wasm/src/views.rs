//! JSON shapes handed to the front-end

use overlay_core::{
    CorrelationTable, HighlightStyle, HoverState, HoverTransition, LengthUnit, OverlayItem,
    OverlayRect, PageSize, ReviewConfig, ReviewSession,
};
use serde::Serialize;
use shared_types::FieldKey;

/// Overlay box with everything needed to style it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayView {
    pub key: FieldKey,
    /// DOM id of the highlight element
    pub element_id: String,
    pub title: String,
    pub rect: OverlayRect,
    pub is_active: bool,
    pub class_name: &'static str,
    pub style: HighlightStyle,
}

impl From<OverlayItem> for OverlayView {
    fn from(item: OverlayItem) -> Self {
        Self {
            element_id: overlay_element_id(&item.key),
            class_name: item.kind.class_name(),
            style: item.style(),
            key: item.key,
            title: item.title,
            rect: item.rect,
            is_active: item.is_active,
        }
    }
}

/// Arrow from the active form row to its highlight
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectorView {
    pub from: String,
    pub to: String,
}

pub fn form_element_id(key: &FieldKey) -> String {
    format!("json-{}", key)
}

pub fn overlay_element_id(key: &FieldKey) -> String {
    format!("pdf-{}", key)
}

pub fn load_session(envelope_json: &str, config_toml: Option<&str>) -> Result<ReviewSession, String> {
    let config = match config_toml {
        Some(toml) => ReviewConfig::from_str(toml).map_err(|e| format!("Invalid config: {:#}", e))?,
        None => ReviewConfig::default(),
    };
    ReviewSession::from_json(envelope_json, &config).map_err(|e| format!("Failed to load document: {}", e))
}

pub fn overlays_json(items: Vec<OverlayItem>) -> Result<String, String> {
    let views: Vec<OverlayView> = items.into_iter().map(OverlayView::from).collect();
    serde_json::to_string(&views).map_err(|e| format!("Failed to serialize overlays: {}", e))
}

pub fn hover_json(state: &HoverState) -> Result<String, String> {
    serde_json::to_string(state).map_err(|e| format!("Failed to serialize hover state: {}", e))
}

/// Hand the serialized hover state to a listener.
///
/// Both a serialization failure and a listener failure come back as a
/// message for the console.
pub fn notify_hover_listener<E, F>(state: &HoverState, listener: F) -> Result<(), String>
where
    E: std::fmt::Debug,
    F: FnOnce(&str) -> Result<(), E>,
{
    let json = hover_json(state)?;
    listener(&json).map_err(|e| format!("Hover listener failed: {:?}", e))
}

pub fn transition_name(transition: HoverTransition) -> &'static str {
    match transition {
        HoverTransition::Activated { navigated_to: Some(_) } => "navigated",
        HoverTransition::Activated { navigated_to: None } => "activated",
        HoverTransition::Cleared => "cleared",
        HoverTransition::Unchanged => "unchanged",
        HoverTransition::Rejected => "rejected",
    }
}

pub fn page_size(width: f64, height: f64, unit: &str) -> Result<PageSize, String> {
    let unit: LengthUnit = unit.parse()?;
    Ok(PageSize::new(width, height, unit))
}

pub fn connector(table: &CorrelationTable<String>, state: &HoverState) -> Option<ConnectorView> {
    table.connector(state).map(|(from, to)| ConnectorView {
        from: from.clone(),
        to: to.clone(),
    })
}
