//! Property-based tests for the hover link
//!
//! Drives a review session with arbitrary pointer event sequences.

use overlay_core::{HoverTransition, ReviewConfig, ReviewSession};
use proptest::prelude::*;
use shared_types::{ExtractedDocument, FieldKey, ReviewEnvelope};

#[derive(Debug, Clone)]
enum PointerEvent {
    Enter(String, Option<u32>),
    Leave,
}

fn key() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("InvoiceId".to_string()),
        Just("InvoiceTotal".to_string()),
        Just("Amount-0".to_string()),
        Just("Amount-1".to_string()),
        Just(String::new()),
        "[A-Za-z]{1,12}(-[0-9])?",
    ]
}

fn event() -> impl Strategy<Value = PointerEvent> {
    prop_oneof![
        // Page 4 lies past the page count
        3 => (key(), prop::option::of(1u32..=4)).prop_map(|(k, p)| PointerEvent::Enter(k, p)),
        1 => Just(PointerEvent::Leave),
    ]
}

fn session() -> ReviewSession {
    let document: ExtractedDocument = serde_json::from_value(serde_json::json!({
        "fields": {
            "InvoiceId": {"content": "INV-100", "bounding_regions": [{"pageNumber": 1, "polygon": [1,1,2,1,2,2,1,2]}]},
            "InvoiceTotal": {"content": "$110.00", "bounding_regions": ["{'pageNumber': 2, 'polygon': [1,1,2,1,2,2,1,2]}"]}
        },
        "items": [
            {"fields": {"Amount": {"content": "$60.00", "bounding_regions": [{"pageNumber": 1, "polygon": [5,3,6,3,6,4,5,4]}]}}},
            {"fields": {"Amount": {"content": "$50.00", "bounding_regions": [{"pageNumber": 3, "polygon": [5,3,6,3,6,4,5,4]}]}}}
        ]
    }))
    .unwrap();
    let mut session =
        ReviewSession::new(&ReviewEnvelope::from_document(document), &ReviewConfig::default()).unwrap();
    session.set_page_count(3);
    session
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn at_most_one_overlay_is_active(events in prop::collection::vec(event(), 0..30)) {
        let mut session = session();
        for event in events {
            match event {
                PointerEvent::Enter(key, page) => { session.set_hovered_key(&key, page); }
                PointerEvent::Leave => { session.clear_hovered_key(); }
            }
            for page in 1..=3 {
                let active = session.overlays_for_page(page).iter().filter(|o| o.is_active).count();
                prop_assert!(active <= 1);
            }
            let rows = session.form_rows();
            prop_assert!(rows.iter().filter(|r| r.is_active).count() <= 1);
        }
    }

    #[test]
    fn published_page_is_the_displayed_page(events in prop::collection::vec(event(), 0..30)) {
        let mut session = session();
        for event in events {
            match event {
                PointerEvent::Enter(key, page) => { session.set_hovered_key(&key, page); }
                PointerEvent::Leave => { session.clear_hovered_key(); }
            }
            if let Some(page) = session.hover_state().page_num {
                prop_assert_eq!(page, session.viewer().page());
            }
        }
    }

    #[test]
    fn enter_without_page_never_changes_state(
        events in prop::collection::vec(event(), 0..20),
        probe in key(),
    ) {
        let mut session = session();
        for event in events {
            match event {
                PointerEvent::Enter(key, page) => { session.set_hovered_key(&key, page); }
                PointerEvent::Leave => { session.clear_hovered_key(); }
            }
        }
        let before = session.hover_state().clone();
        let page = session.viewer().page();

        let transition = session.set_hovered_key(&probe, None);
        if probe.is_empty() {
            prop_assert!(session.hover_state().is_idle());
        } else {
            prop_assert_eq!(transition, HoverTransition::Rejected);
            prop_assert_eq!(session.hover_state(), &before);
        }
        prop_assert_eq!(session.viewer().page(), page);
    }

    #[test]
    fn hovered_page_is_displayed(key in key(), page in 1u32..=3) {
        prop_assume!(!key.is_empty());
        let mut session = session();
        session.set_hovered_key(&key, Some(page));
        prop_assert_eq!(session.viewer().page(), page);
        prop_assert_eq!(session.hover_state().key.clone(), Some(FieldKey::from(key.as_str())));
    }

    #[test]
    fn leave_twice_equals_leave_once(events in prop::collection::vec(event(), 0..20)) {
        let mut session = session();
        for event in events {
            match event {
                PointerEvent::Enter(key, page) => { session.set_hovered_key(&key, page); }
                PointerEvent::Leave => { session.clear_hovered_key(); }
            }
        }
        session.clear_hovered_key();
        let once = session.hover_state().clone();
        prop_assert_eq!(session.clear_hovered_key(), HoverTransition::Unchanged);
        prop_assert_eq!(session.hover_state(), &once);
    }
}

#[test]
fn hover_past_last_page_is_rejected() {
    let mut session = session();
    session.set_page_count(2);
    session.set_hovered_key("InvoiceId", Some(1));

    for _ in 0..2 {
        assert_eq!(session.set_hovered_key("Amount-1", Some(3)), HoverTransition::Rejected);
        assert_eq!(session.viewer().page(), 1);
        assert_eq!(session.hover_state().key, Some(FieldKey::from("InvoiceId")));
        assert_eq!(session.hover_state().page_num, Some(1));
    }
}
