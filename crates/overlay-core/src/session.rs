//! Review session: one document under review
//!
//! Owns every piece of review state and wires them together. Front-ends
//! forward their events here and render from what it returns.

use std::sync::Arc;

use serde::Serialize;
use shared_types::{ExtractedDocument, FieldKey, ReviewEnvelope};
use tracing::{debug, info};

use crate::config::ReviewConfig;
use crate::error::OverlayError;
use crate::form::{self, ReviewForm};
use crate::hover::{HoverLinkController, HoverObserver, HoverState, HoverTransition, SubscriptionId};
use crate::index::{FieldEntry, FieldIndex};
use crate::overlay::{self, OverlayItem};
use crate::projection::{PageSize, ReferenceSizes};
use crate::viewport::{PageViewport, ViewerState};

/// One input of the review form, ready to render
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRow {
    pub key: FieldKey,
    pub label: String,
    pub value: String,
    pub page_num: u32,
    pub page_hint: Option<String>,
    pub item_index: Option<usize>,
    pub is_edited: bool,
    pub is_active: bool,
}

pub struct ReviewSession {
    index: FieldIndex,
    form: ReviewForm,
    hover: HoverLinkController,
    viewer: ViewerState,
    sizes: ReferenceSizes,
    file_id: Option<String>,
}

impl ReviewSession {
    /// Start reviewing the first document of `envelope`
    pub fn new(envelope: &ReviewEnvelope, config: &ReviewConfig) -> Result<Self, OverlayError> {
        config.validate()?;
        let document = envelope
            .first_document()
            .cloned()
            .ok_or(OverlayError::NoDocument)?;
        let document = Arc::new(document);

        let index = FieldIndex::build(&document, &config.index_spec());
        let sizes = ReferenceSizes::from_envelope(envelope, config.default_page_size());
        let mut viewer = ViewerState::new(config.zoom_limits());
        // Without layout analysis the highest referenced page bounds navigation
        // until the renderer reports the real count
        let pages = envelope
            .analysis_pages()
            .iter()
            .map(|p| p.page_number)
            .max()
            .unwrap_or_else(|| index.page_count_hint());
        viewer.set_page_count(pages);

        info!(
            fields = index.len(),
            items = index.item_count(),
            file_id = envelope.uploaded_file_id(),
            "review session started"
        );

        Ok(Self {
            index,
            form: ReviewForm::new(document),
            hover: HoverLinkController::new(),
            viewer,
            sizes,
            file_id: envelope.uploaded_file_id().map(str::to_string),
        })
    }

    /// Parse an extraction envelope and start reviewing it
    pub fn from_json(json: &str, config: &ReviewConfig) -> Result<Self, OverlayError> {
        let envelope = ReviewEnvelope::from_json(json)?;
        Self::new(&envelope, config)
    }

    pub fn file_id(&self) -> Option<&str> {
        self.file_id.as_deref()
    }

    pub fn document(&self) -> &ExtractedDocument {
        self.form.source()
    }

    pub fn index(&self) -> &FieldIndex {
        &self.index
    }

    pub fn form_entries(&self) -> &[FieldEntry] {
        self.index.entries()
    }

    /// Form rows in display order with their current values and styling
    pub fn form_rows(&self) -> Vec<FormRow> {
        let state = self.hover.state();
        self.index
            .entries()
            .iter()
            .map(|entry| FormRow {
                key: entry.key.clone(),
                label: form::field_label(&entry.name),
                value: self.form.value(entry),
                page_num: entry.page_num,
                page_hint: form::page_hint(entry),
                item_index: entry.item_index,
                is_edited: self.form.is_edited(&entry.key),
                is_active: state.is_active(&entry.key),
            })
            .collect()
    }

    /// Heading of a line item section
    pub fn item_title(&self, item_index: usize) -> String {
        form::item_title(self.form.source(), item_index)
    }

    pub fn form(&self) -> &ReviewForm {
        &self.form
    }

    /// Edit a field; unknown keys are ignored
    pub fn set_value(&mut self, key: &FieldKey, text: impl Into<String>) -> bool {
        if !self.index.contains(key) {
            debug!(key = %key, "edit for unindexed key ignored");
            return false;
        }
        self.form.set_value(key, text);
        true
    }

    pub fn revert(&mut self, key: &FieldKey) -> bool {
        self.form.revert(key)
    }

    pub fn edited_document(&self) -> ExtractedDocument {
        self.form.edited_document()
    }

    /// Pointer entered a form row or overlay box
    pub fn set_hovered_key(&mut self, key: &str, page_num: Option<u32>) -> HoverTransition {
        self.hover.enter(key, page_num, &mut self.viewer)
    }

    /// Pointer left a form row or overlay box
    pub fn clear_hovered_key(&mut self) -> HoverTransition {
        self.hover.leave()
    }

    pub fn hover_state(&self) -> &HoverState {
        self.hover.state()
    }

    pub fn subscribe<O>(&mut self, observer: O) -> SubscriptionId
    where
        O: HoverObserver + 'static,
    {
        self.hover.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.hover.unsubscribe(id)
    }

    /// The page view rendered `page` at its native `size`.
    ///
    /// Returns false when the report is for a page no longer displayed or
    /// when the size cannot serve as a projection reference.
    pub fn report_page_size(&mut self, page: u32, size: PageSize) -> bool {
        if page != self.viewer.current_page() {
            debug!(page, displayed = self.viewer.current_page(), "stale page size report ignored");
            return false;
        }
        self.viewer.page_rendered(Some(size));
        self.sizes.accept_rendered(size).is_some()
    }

    /// Overlays for the displayed page
    pub fn overlays(&self) -> Vec<OverlayItem> {
        self.overlays_for_page(self.viewer.page())
    }

    pub fn overlays_for_page(&self, page: u32) -> Vec<OverlayItem> {
        overlay::plan_page(&self.index, page, self.reference_size(page), self.hover.state())
    }

    /// Projection reference for `page`; the rendered size only counts for the displayed page
    pub fn reference_size(&self, page: u32) -> PageSize {
        let rendered = if page == self.viewer.current_page() {
            self.viewer.rendered_page_size()
        } else {
            None
        };
        self.sizes.resolve(page, rendered)
    }

    pub fn viewer(&self) -> &ViewerState {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut ViewerState {
        &mut self.viewer
    }

    /// Page count reported by the renderer once the PDF is loaded
    pub fn set_page_count(&mut self, count: u32) {
        self.viewer.set_page_count(count);
    }

    pub fn next_page(&mut self) -> u32 {
        self.viewer.next_page()
    }

    pub fn previous_page(&mut self) -> u32 {
        self.viewer.previous_page()
    }

    pub fn go_to_page(&mut self, page: u32) -> u32 {
        self.viewer.go_to_page(page)
    }

    /// The document is going away; drop transient view state
    pub fn unload(&mut self) {
        self.hover.reset();
        self.viewer.invalidate_render();
        debug!("review session unloaded");
    }
}

impl std::fmt::Debug for ReviewSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewSession")
            .field("fields", &self.index.len())
            .field("page", &self.viewer.page())
            .field("hover", self.hover.state())
            .finish()
    }
}
