//! Hover link between the structured form and the page overlays
//!
//! [`HoverLinkController`] is the only writer of [`HoverState`]. Form rows
//! and overlay boxes forward pointer enter/leave events to it; both views
//! observe the published state and restyle their own elements by comparing
//! keys. Neither view looks the other up.
//!
//! Ordering guarantee: when a hover targets another page, the viewport is
//! moved *before* observers are notified, so the overlays being filtered for
//! display already belong to the hovered page.

use serde::{Deserialize, Serialize};
use shared_types::FieldKey;
use tracing::{debug, warn};

use crate::viewport::PageViewport;

/// The single shared hover value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverState {
    pub key: Option<FieldKey>,
    pub page_num: Option<u32>,
}

impl HoverState {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.key.is_none()
    }

    /// Whether the element identified by `key` should render its active style
    pub fn is_active(&self, key: &FieldKey) -> bool {
        self.key.as_ref() == Some(key)
    }
}

/// Outcome of a hover event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTransition {
    /// A new key became active; `navigated_to` is set when the page changed
    Activated { navigated_to: Option<u32> },
    /// The hover was cleared
    Cleared,
    /// The event did not change the state; nothing was published
    Unchanged,
    /// Entering without a page number, or for a page the viewport cannot
    /// display, is refused
    Rejected,
}

/// Receives every published hover state
pub trait HoverObserver {
    fn hover_changed(&mut self, state: &HoverState);
}

impl<F> HoverObserver for F
where
    F: FnMut(&HoverState),
{
    fn hover_changed(&mut self, state: &HoverState) {
        self(state)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Owner of the hover state
#[derive(Default)]
pub struct HoverLinkController {
    state: HoverState,
    revision: u64,
    next_subscription: u64,
    observers: Vec<(SubscriptionId, Box<dyn HoverObserver>)>,
}

impl HoverLinkController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &HoverState {
        &self.state
    }

    /// Number of published changes so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_active(&self, key: &FieldKey) -> bool {
        self.state.is_active(key)
    }

    /// Pointer entered the element for `key`.
    ///
    /// An empty key counts as leaving. A missing page number is rejected
    /// because page navigation depends on it, and so is a page the viewport
    /// does not reach.
    pub fn enter<V>(&mut self, key: &str, page_num: Option<u32>, viewport: &mut V) -> HoverTransition
    where
        V: PageViewport + ?Sized,
    {
        if key.is_empty() {
            return self.leave();
        }
        let Some(page_num) = page_num else {
            warn!(key, "hover without a page number ignored");
            return HoverTransition::Rejected;
        };

        let next = HoverState {
            key: Some(FieldKey::from(key)),
            page_num: Some(page_num),
        };

        let displayed = viewport.current_page();
        let navigated_to = if displayed != page_num {
            viewport.set_page(page_num);
            let reached = viewport.current_page();
            if reached != page_num {
                // The published page must be the displayed one
                if reached != displayed {
                    viewport.set_page(displayed);
                }
                warn!(key, page = page_num, reached, "hover page cannot be displayed");
                return HoverTransition::Rejected;
            }
            debug!(key, page = page_num, "hover moved viewport");
            Some(page_num)
        } else {
            None
        };

        if next == self.state && navigated_to.is_none() {
            return HoverTransition::Unchanged;
        }

        self.publish(next);
        HoverTransition::Activated { navigated_to }
    }

    /// Pointer left a tracked element
    pub fn leave(&mut self) -> HoverTransition {
        if self.state == HoverState::idle() {
            return HoverTransition::Unchanged;
        }
        self.publish(HoverState::idle());
        HoverTransition::Cleared
    }

    /// Document unloaded or the reviewer navigated away
    pub fn reset(&mut self) -> HoverTransition {
        self.leave()
    }

    pub fn subscribe<O>(&mut self, observer: O) -> SubscriptionId
    where
        O: HoverObserver + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    fn publish(&mut self, next: HoverState) {
        self.state = next;
        self.revision += 1;
        debug!(
            key = self.state.key.as_ref().map(FieldKey::as_str),
            page = self.state.page_num,
            revision = self.revision,
            "hover state published"
        );
        for (_, observer) in self.observers.iter_mut() {
            observer.hover_changed(&self.state);
        }
    }
}

impl std::fmt::Debug for HoverLinkController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoverLinkController")
            .field("state", &self.state)
            .field("revision", &self.revision)
            .field("observers", &self.observers.len())
            .finish()
    }
}
