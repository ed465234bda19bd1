//! Page view state: current page, zoom, rotation and pan
//!
//! The engine only needs [`PageViewport`]; [`ViewerState`] is the stock
//! implementation used by the web front-end.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::projection::PageSize;

/// What the hover controller needs from the page view
pub trait PageViewport {
    /// Page currently displayed (1-based)
    fn current_page(&self) -> u32;

    /// Request navigation to `page`
    fn set_page(&mut self, page: u32);

    /// Native size of the displayed page, once it has been rendered
    fn rendered_page_size(&self) -> Option<PageSize>;
}

/// Zoom bounds and increment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: 0.5,
            max: 3.0,
            step: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerState {
    page: u32,
    page_count: Option<u32>,
    zoom: f64,
    rotation: u16,
    panning: bool,
    offset: (f64, f64),
    render_ready: bool,
    rendered_size: Option<PageSize>,
    #[serde(skip)]
    limits: ZoomLimits,
}

impl ViewerState {
    pub fn new(limits: ZoomLimits) -> Self {
        Self {
            page: 1,
            page_count: None,
            zoom: 1.0,
            rotation: 0,
            panning: false,
            offset: (0.0, 0.0),
            render_ready: false,
            rendered_size: None,
            limits,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_count(&self) -> Option<u32> {
        self.page_count
    }

    /// Set once the renderer has loaded the document
    pub fn set_page_count(&mut self, count: u32) {
        self.page_count = Some(count.max(1));
        if let Some(count) = self.page_count {
            if self.page > count {
                self.change_page(count);
            }
        }
    }

    /// Go to `page`, clamped to the known page range.
    ///
    /// Returns the page actually displayed.
    pub fn go_to_page(&mut self, page: u32) -> u32 {
        let upper = self.page_count.unwrap_or(u32::MAX);
        self.change_page(page.clamp(1, upper));
        self.page
    }

    pub fn next_page(&mut self) -> u32 {
        // Unknown page count pins navigation to the first page
        let upper = self.page_count.unwrap_or(1);
        self.change_page((self.page + 1).min(upper));
        self.page
    }

    pub fn previous_page(&mut self) -> u32 {
        self.change_page(self.page.saturating_sub(1).max(1));
        self.page
    }

    fn change_page(&mut self, page: u32) {
        if page == self.page {
            return;
        }
        debug!(from = self.page, to = page, "page changed");
        self.page = page;
        self.invalidate_render();
    }

    /// The page view finished rendering the current page
    pub fn page_rendered(&mut self, native_size: Option<PageSize>) {
        self.render_ready = true;
        self.rendered_size = native_size;
    }

    /// Forget the render of the current page until the page view reports again
    pub fn invalidate_render(&mut self) {
        self.render_ready = false;
        self.rendered_size = None;
    }

    pub fn is_render_ready(&self) -> bool {
        self.render_ready
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.zoom = (self.zoom + self.limits.step).min(self.limits.max);
        self.zoom
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.zoom = (self.zoom - self.limits.step).max(self.limits.min);
        self.zoom
    }

    pub fn rotation(&self) -> u16 {
        self.rotation
    }

    /// Rotate clockwise by a quarter turn
    pub fn rotate(&mut self) -> u16 {
        self.rotation = (self.rotation + 90) % 360;
        self.rotation
    }

    pub fn is_panning(&self) -> bool {
        self.panning
    }

    pub fn toggle_pan(&mut self) -> bool {
        self.panning = !self.panning;
        self.panning
    }

    pub fn offset(&self) -> (f64, f64) {
        self.offset
    }

    /// Drag the page while pan mode is on; ignored otherwise
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> bool {
        if !self.panning {
            return false;
        }
        self.offset = (self.offset.0 + dx, self.offset.1 + dy);
        true
    }

    /// Restore zoom, rotation and pan (the page is kept)
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.rotation = 0;
        self.offset = (0.0, 0.0);
        self.panning = false;
    }

    /// Whether any view transform differs from the defaults
    pub fn show_reset(&self) -> bool {
        self.zoom != 1.0 || self.rotation != 0 || self.offset != (0.0, 0.0)
    }

    /// CSS transform for the page container (origin: top center)
    pub fn css_transform(&self) -> String {
        format!(
            "scale({}) rotate({}deg) translate({}px, {}px)",
            self.zoom, self.rotation, self.offset.0, self.offset.1
        )
    }
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new(ZoomLimits::default())
    }
}

impl PageViewport for ViewerState {
    fn current_page(&self) -> u32 {
        self.page
    }

    fn set_page(&mut self, page: u32) {
        self.go_to_page(page);
    }

    fn rendered_page_size(&self) -> Option<PageSize> {
        if self.render_ready {
            self.rendered_size
        } else {
            None
        }
    }
}
