//! Browser bindings for invoice review
//!
//! The page view (pdf.js) and the form are rendered in JavaScript; this
//! module owns the review state and answers with JSON.

use overlay_core::{CorrelationTable, ReviewSession, SubscriptionId};
use shared_types::FieldKey;
use wasm_bindgen::prelude::*;

pub mod views;

pub use views::{ConnectorView, OverlayView};

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"Invoice review WASM initialized".into());
}

fn js_err(message: String) -> JsValue {
    JsValue::from_str(&message)
}

/// Review state for one uploaded invoice
#[wasm_bindgen]
pub struct WasmReviewSession {
    session: ReviewSession,
    anchors: CorrelationTable<String>,
    hover_listener: Option<SubscriptionId>,
}

#[wasm_bindgen]
impl WasmReviewSession {
    /// Load an extraction envelope, optionally with a TOML review config
    #[wasm_bindgen(constructor)]
    pub fn new(envelope_json: &str, config_toml: Option<String>) -> Result<WasmReviewSession, JsValue> {
        let session = views::load_session(envelope_json, config_toml.as_deref()).map_err(js_err)?;
        let anchors = CorrelationTable::from_index(session.index());
        Ok(Self {
            session,
            anchors,
            hover_listener: None,
        })
    }

    /// Form rows in display order
    #[wasm_bindgen(js_name = getFormRowsJson)]
    pub fn get_form_rows_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.form_rows())
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize form: {}", e)))
    }

    #[wasm_bindgen(js_name = getItemTitle)]
    pub fn get_item_title(&self, item_index: usize) -> String {
        self.session.item_title(item_index)
    }

    /// Overlays for the displayed page
    #[wasm_bindgen(js_name = getOverlaysJson)]
    pub fn get_overlays_json(&self) -> Result<String, JsValue> {
        views::overlays_json(self.session.overlays()).map_err(js_err)
    }

    #[wasm_bindgen(js_name = getOverlaysForPageJson)]
    pub fn get_overlays_for_page_json(&self, page: u32) -> Result<String, JsValue> {
        views::overlays_json(self.session.overlays_for_page(page)).map_err(js_err)
    }

    // ============================================================
    // Hover
    // ============================================================

    /// Pointer entered a form row or highlight.
    ///
    /// Returns `"activated"`, `"navigated"`, `"cleared"`, `"unchanged"` or
    /// `"rejected"`.
    #[wasm_bindgen(js_name = setHoveredKey)]
    pub fn set_hovered_key(&mut self, key: &str, page_num: Option<u32>) -> String {
        let transition = self.session.set_hovered_key(key, page_num);
        if matches!(
            transition,
            overlay_core::HoverTransition::Activated {
                navigated_to: Some(_)
            }
        ) {
            self.anchors.unbind_overlays();
        }
        views::transition_name(transition).to_string()
    }

    #[wasm_bindgen(js_name = clearHoveredKey)]
    pub fn clear_hovered_key(&mut self) -> String {
        views::transition_name(self.session.clear_hovered_key()).to_string()
    }

    #[wasm_bindgen(js_name = getHoverStateJson)]
    pub fn get_hover_state_json(&self) -> Result<String, JsValue> {
        views::hover_json(self.session.hover_state()).map_err(js_err)
    }

    /// Call `callback(hoverStateJson)` on every hover change; replaces any
    /// previous callback
    #[wasm_bindgen(js_name = onHoverChange)]
    pub fn on_hover_change(&mut self, callback: js_sys::Function) {
        if let Some(previous) = self.hover_listener.take() {
            self.session.unsubscribe(previous);
        }
        let id = self.session.subscribe(move |state: &overlay_core::HoverState| {
            let delivered = views::notify_hover_listener(state, |json| {
                callback.call1(&JsValue::NULL, &JsValue::from_str(json)).map(|_| ())
            });
            if let Err(message) = delivered {
                web_sys::console::error_1(&message.into());
            }
        });
        self.hover_listener = Some(id);
    }

    // ============================================================
    // Form/overlay connector
    // ============================================================

    #[wasm_bindgen(js_name = bindFormElement)]
    pub fn bind_form_element(&mut self, key: &str, element_id: String) -> bool {
        self.anchors.bind_form(&FieldKey::from(key), element_id)
    }

    #[wasm_bindgen(js_name = bindOverlayElement)]
    pub fn bind_overlay_element(&mut self, key: &str, element_id: String) -> bool {
        self.anchors.bind_overlay(&FieldKey::from(key), element_id)
    }

    /// Connector endpoints for the active key, or `undefined`
    #[wasm_bindgen(js_name = getConnectorJson)]
    pub fn get_connector_json(&self) -> Option<String> {
        let view = views::connector(&self.anchors, self.session.hover_state())?;
        serde_json::to_string(&view).ok()
    }

    // ============================================================
    // Page view
    // ============================================================

    /// The page view rendered `page`; `unit` is `"pt"`, `"in"` or `"px"`
    #[wasm_bindgen(js_name = reportPageSize)]
    pub fn report_page_size(&mut self, page: u32, width: f64, height: f64, unit: &str) -> Result<bool, JsValue> {
        let size = views::page_size(width, height, unit).map_err(js_err)?;
        Ok(self.session.report_page_size(page, size))
    }

    #[wasm_bindgen(js_name = setPageCount)]
    pub fn set_page_count(&mut self, count: u32) {
        self.change_page(|session| {
            session.set_page_count(count);
            session.viewer().page()
        });
    }

    #[wasm_bindgen(js_name = currentPage)]
    pub fn current_page(&self) -> u32 {
        self.session.viewer().page()
    }

    #[wasm_bindgen(js_name = nextPage)]
    pub fn next_page(&mut self) -> u32 {
        self.change_page(|session| session.next_page())
    }

    #[wasm_bindgen(js_name = previousPage)]
    pub fn previous_page(&mut self) -> u32 {
        self.change_page(|session| session.previous_page())
    }

    #[wasm_bindgen(js_name = goToPage)]
    pub fn go_to_page(&mut self, page: u32) -> u32 {
        self.change_page(|session| session.go_to_page(page))
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&mut self) -> f64 {
        self.session.viewer_mut().zoom_in()
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&mut self) -> f64 {
        self.session.viewer_mut().zoom_out()
    }

    pub fn rotate(&mut self) -> u16 {
        self.session.viewer_mut().rotate()
    }

    #[wasm_bindgen(js_name = togglePan)]
    pub fn toggle_pan(&mut self) -> bool {
        self.session.viewer_mut().toggle_pan()
    }

    #[wasm_bindgen(js_name = panBy)]
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> bool {
        self.session.viewer_mut().pan_by(dx, dy)
    }

    #[wasm_bindgen(js_name = resetView)]
    pub fn reset_view(&mut self) {
        self.session.viewer_mut().reset();
    }

    #[wasm_bindgen(js_name = showReset)]
    pub fn show_reset(&self) -> bool {
        self.session.viewer().show_reset()
    }

    #[wasm_bindgen(js_name = cssTransform)]
    pub fn css_transform(&self) -> String {
        self.session.viewer().css_transform()
    }

    // ============================================================
    // Edits
    // ============================================================

    #[wasm_bindgen(js_name = setValue)]
    pub fn set_value(&mut self, key: &str, value: String) -> bool {
        self.session.set_value(&FieldKey::from(key), value)
    }

    pub fn revert(&mut self, key: &str) -> bool {
        self.session.revert(&FieldKey::from(key))
    }

    /// Extracted document with the reviewer's edits applied
    #[wasm_bindgen(js_name = getEditedDocumentJson)]
    pub fn get_edited_document_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.edited_document())
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize document: {}", e)))
    }

    /// Document is being closed
    pub fn unload(&mut self) {
        self.session.unload();
        self.anchors.unbind_overlays();
    }
}

impl WasmReviewSession {
    /// Navigate and drop overlay anchors if the displayed page changed
    fn change_page(&mut self, navigate: impl FnOnce(&mut ReviewSession) -> u32) -> u32 {
        let before = self.session.viewer().page();
        let after = navigate(&mut self.session);
        if after != before {
            self.anchors.unbind_overlays();
        }
        after
    }
}
