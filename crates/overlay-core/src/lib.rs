//! Spatial correlation between extracted invoice fields and the page
//!
//! This crate normalises bounding regions, projects them onto the rendered
//! page as percentage boxes, and keeps the review form and the page
//! highlights linked through a single hover state.

pub mod config;
pub mod correlation;
pub mod error;
pub mod form;
pub mod hover;
pub mod index;
pub mod overlay;
pub mod projection;
pub mod region;
pub mod session;
pub mod viewport;

pub use config::ReviewConfig;
pub use correlation::CorrelationTable;
pub use error::{GeometryError, OverlayError, RegionError};
pub use hover::{HoverLinkController, HoverObserver, HoverState, HoverTransition, SubscriptionId};
pub use index::{FieldEntry, FieldIndex, FieldSelection, IndexSpec};
pub use overlay::{plan_page, HighlightKind, HighlightStyle, OverlayItem};
pub use projection::{project, LengthUnit, OverlayRect, PageSize, ReferenceSizes};
pub use session::{FormRow, ReviewSession};
pub use viewport::{PageViewport, ViewerState, ZoomLimits};
