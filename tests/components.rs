/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Tests for the building blocks the host is composed of: the frame
//! registry, the response manager, the message queue, the destruction
//! tracker, the pending slot and the browser registry.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use browser_host::destruction::DestructionTracker;
use browser_host::frame::FrameRegistry;
use browser_host::host::fixup_url;
use browser_host::input::{InputEvent, KeyEvent, KeyEventKind, MouseButton, MouseEvent};
use browser_host::ipc::{RequestParams, ResponseParams};
use browser_host::pending::PendingSlot;
use browser_host::queue::{MessageQueue, MessageSink};
use browser_host::registry;
use browser_host::response::ResponseManager;
use browser_host::{
    DestructionState, FrameHandle, FrameId, HostError, IpcMessage, RequestId, RequestInfo,
    ResponseOutcome,
};

/// Collects everything sent through it.
#[derive(Default)]
struct VecSink {
    sent: Vec<IpcMessage>,
}

impl MessageSink for VecSink {
    fn send(&mut self, message: IpcMessage) {
        self.sent.push(message);
    }
}

fn acks(sink: &VecSink) -> usize {
    sink.sent
        .iter()
        .filter(|m| matches!(m, IpcMessage::ResponseAck { .. }))
        .count()
}

fn response(request_id: RequestId, body: &str) -> ResponseParams {
    ResponseParams {
        request_id,
        name: "execute-command".into(),
        success: true,
        response: body.into(),
        expect_response_ack: false,
    }
}

// ---------------------------------------------------------------------------
// Frame registry
// ---------------------------------------------------------------------------

#[test]
fn test_get_or_create_returns_same_frame() {
    let mut frames = FrameRegistry::new();
    let first = frames.get_or_create(FrameId(5), FrameId::UNSPECIFIED, true, "", "");
    let second = frames.get_or_create(FrameId(5), FrameId::UNSPECIFIED, false, "main", "");
    let third = frames.get_or_create(FrameId(5), FrameId::UNSPECIFIED, false, "", "http://a/");

    assert_eq!(first, second);
    assert_eq!(second, third);
    assert_eq!(frames.frame_count(), 1);

    let frame = frames.resolve(third);
    assert_eq!(frame.id(), FrameId(5));
    assert_eq!(frame.name(), "main");
    assert_eq!(frame.url(), "http://a/");
    assert!(frame.is_main());
}

#[test]
fn test_get_or_create_refreshes_parent_only_when_specified() {
    let mut frames = FrameRegistry::new();
    frames.get_or_create(FrameId(2), FrameId(1), false, "child", "");
    frames.get_or_create(FrameId(2), FrameId::UNSPECIFIED, false, "", "");
    assert_eq!(frames.frame(FrameId(2)).parent_id(), FrameId(1));

    frames.get_or_create(FrameId(2), FrameId(9), false, "", "");
    assert_eq!(frames.frame(FrameId(2)).parent_id(), FrameId(9));
    assert_eq!(frames.frame(FrameId(2)).name(), "child");
}

#[test]
fn test_main_frame_designation_moves() {
    let mut frames = FrameRegistry::new();
    frames.get_or_create(FrameId(1), FrameId::UNSPECIFIED, true, "", "");
    frames.get_or_create(FrameId(2), FrameId::UNSPECIFIED, true, "", "");

    assert_eq!(frames.main_frame_id(), FrameId(2));
    assert_eq!(frames.main_frame().id(), FrameId(2));
    assert!(!frames.frame(FrameId(1)).is_main());
}

#[test]
fn test_detach_all_keeps_frames_resolvable() {
    let mut frames = FrameRegistry::new();
    let main = frames.get_or_create(FrameId(1), FrameId::UNSPECIFIED, true, "top", "");
    frames.get_or_create(FrameId(2), FrameId(1), false, "child", "");

    frames.detach_all();

    for id in [FrameId(1), FrameId(2)] {
        let frame = frames.frame(id);
        assert_eq!(frame.id(), id);
        assert!(!frame.is_attached());
    }
    assert!(!frames.resolve(main).is_attached());
    assert_eq!(frames.frame_count(), 0);
    assert!(frames.frame_identifiers().is_empty());
    assert!(frames.frame_by_name("child").is_some());
}

#[test]
fn test_detach_single_frame() {
    let mut frames = FrameRegistry::new();
    frames.get_or_create(FrameId(1), FrameId::UNSPECIFIED, true, "", "");
    frames.get_or_create(FrameId(2), FrameId(1), false, "ad", "");
    frames.detach(FrameId(2));
    frames.detach(FrameId(77));

    assert_eq!(frames.frame_identifiers(), vec![FrameId(1)]);
    assert!(!frames.frame(FrameId(2)).is_attached());
}

#[test]
fn test_frame_by_name_prefers_attached() {
    let mut frames = FrameRegistry::new();
    frames.get_or_create(FrameId(2), FrameId(1), false, "slot", "");
    frames.detach(FrameId(2));
    frames.get_or_create(FrameId(3), FrameId(1), false, "slot", "");

    assert_eq!(frames.frame_by_name("slot").map(|f| f.id()), Some(FrameId(3)));
    assert!(frames.frame_by_name("missing").is_none());
}

#[test]
fn test_unknown_frame_yields_placeholder() {
    let frames = FrameRegistry::new();
    assert!(frames.frame(FrameId(99)).is_placeholder());
    assert!(frames.main_frame().is_placeholder());
    assert!(frames.handle(FrameId(99)).is_none());
    assert!(frames.resolve(FrameHandle::PLACEHOLDER).is_placeholder());
}

#[test]
fn test_focused_frame_falls_back_to_main() {
    let mut frames = FrameRegistry::new();
    frames.get_or_create(FrameId(1), FrameId::UNSPECIFIED, true, "", "");
    assert_eq!(frames.focused_frame().id(), FrameId(1));

    frames.get_or_create(FrameId(2), FrameId(1), false, "", "");
    frames.set_focused(FrameId(2));
    assert_eq!(frames.focused_frame().id(), FrameId(2));
    assert_eq!(frames.resolve_target(FrameId::FOCUSED), FrameId(2));
}

#[test]
fn test_focus_on_unknown_frame_applies_once_created() {
    let mut frames = FrameRegistry::new();
    frames.get_or_create(FrameId(1), FrameId::UNSPECIFIED, true, "", "");
    frames.set_focused(FrameId(8));
    assert!(frames.focused_frame().is_placeholder());

    frames.get_or_create(FrameId(8), FrameId(1), false, "", "");
    assert_eq!(frames.focused_frame().id(), FrameId(8));
}

#[test]
fn test_handles_from_another_registry_resolve_to_placeholder() {
    let mut a = FrameRegistry::new();
    let mut b = FrameRegistry::new();
    a.get_or_create(FrameId(1), FrameId::UNSPECIFIED, true, "", "");
    let handle = b.get_or_create(FrameId(4), FrameId::UNSPECIFIED, true, "", "");

    assert!(a.resolve(handle).is_placeholder());
}

// ---------------------------------------------------------------------------
// Response manager
// ---------------------------------------------------------------------------

#[test]
fn test_round_trip_runs_handler_once_and_acks_once() {
    let mut responses = ResponseManager::new();
    let mut sink = VecSink::default();
    let calls = Rc::new(RefCell::new(Vec::new()));

    let seen = calls.clone();
    let id = responses.send_request(
        &mut sink,
        RequestParams::new("execute-command", FrameId(1)),
        Box::new(move |outcome| seen.borrow_mut().push(outcome)),
    );

    match &sink.sent[0] {
        IpcMessage::Request(params) => {
            assert_eq!(params.request_id, Some(id));
            assert!(params.expect_response);
        }
        other => panic!("expected a request, got {other:?}"),
    }

    assert!(responses.on_response(&mut sink, response(id, "ok")));
    assert!(!responses.on_response(&mut sink, response(id, "ok")));

    assert_eq!(calls.borrow().len(), 1);
    assert_eq!(
        calls.borrow()[0],
        ResponseOutcome::Completed(response(id, "ok"))
    );
    assert_eq!(acks(&sink), 1);
    assert_eq!(responses.pending_count(), 0);
}

#[test]
fn test_unknown_response_is_discarded() {
    let mut responses = ResponseManager::new();
    let mut sink = VecSink::default();
    assert!(!responses.on_response(&mut sink, response(RequestId(3), "")));
    assert!(sink.sent.is_empty());
}

#[test]
fn test_request_ids_are_distinct() {
    let mut responses = ResponseManager::new();
    let mut sink = VecSink::default();
    let a = responses.send_request(
        &mut sink,
        RequestParams::new("a", FrameId(1)),
        Box::new(|_| {}),
    );
    let b = responses.send_request(
        &mut sink,
        RequestParams::new("b", FrameId(1)),
        Box::new(|_| {}),
    );
    assert_ne!(a, b);
    assert_eq!(responses.pending_count(), 2);
}

#[test]
fn test_cancel_all_cancels_request_42() {
    let mut responses = ResponseManager::new();
    let mut sink = VecSink::default();
    let outcomes = Rc::new(RefCell::new(Vec::new()));

    let mut tracked = None;
    while tracked.is_none() {
        let seen = outcomes.clone();
        let handler_for_42 = Rc::new(RefCell::new(false));
        let flag = handler_for_42.clone();
        let id = responses.send_request(
            &mut sink,
            RequestParams::new("GetSource", FrameId(1)),
            Box::new(move |outcome| {
                if *flag.borrow() {
                    seen.borrow_mut().push(outcome);
                }
            }),
        );
        if id == RequestId(42) {
            *handler_for_42.borrow_mut() = true;
            tracked = Some(id);
        }
    }

    assert_eq!(responses.cancel_all(), 43);
    assert_eq!(*outcomes.borrow(), vec![ResponseOutcome::Cancelled]);
    assert_eq!(responses.pending_count(), 0);

    // A response arriving after cancellation is a no-op.
    assert!(!responses.on_response(&mut sink, response(RequestId(42), "late")));
    assert_eq!(outcomes.borrow().len(), 1);
}

#[test]
fn test_response_ack_bookkeeping() {
    let mut responses = ResponseManager::new();
    let mut sink = VecSink::default();
    let acked = Rc::new(RefCell::new(0));

    let counter = acked.clone();
    let mut params = response(RequestId(9), "done");
    params.expect_response_ack = true;
    responses.send_response(
        &mut sink,
        params,
        Some(Box::new(move || *counter.borrow_mut() += 1)),
    );
    assert_eq!(responses.awaiting_ack_count(), 1);

    assert!(responses.on_response_ack(RequestId(9)));
    assert!(!responses.on_response_ack(RequestId(9)));
    assert_eq!(*acked.borrow(), 1);
    assert_eq!(responses.awaiting_ack_count(), 0);
}

#[test]
fn test_response_without_ack_request_is_not_tracked() {
    let mut responses = ResponseManager::new();
    let mut sink = VecSink::default();
    responses.send_response(&mut sink, response(RequestId(1), ""), None);
    assert_eq!(responses.awaiting_ack_count(), 0);
    assert_eq!(sink.sent.len(), 1);
}

// ---------------------------------------------------------------------------
// Message queue
// ---------------------------------------------------------------------------

#[test]
fn test_queue_flush_preserves_fifo_order() {
    let mut queue = MessageQueue::new();
    assert!(queue.offer("A").is_none());
    assert!(queue.offer("B").is_none());
    assert!(queue.offer("C").is_none());
    assert_eq!(queue.len(), 3);

    let mut delivered = Vec::new();
    queue.flush(|m| delivered.push(m));
    assert_eq!(delivered, vec!["A", "B", "C"]);
    assert!(queue.is_empty());

    // Ready: no more buffering, and a second flush delivers nothing.
    assert_eq!(queue.offer("D"), Some("D"));
    queue.flush(|m| delivered.push(m));
    assert_eq!(delivered, vec!["A", "B", "C"]);
}

#[test]
fn test_queue_rearm_buffers_again() {
    let mut queue = MessageQueue::new();
    queue.flush(|_: u32| {});
    assert!(!queue.is_queueing());

    queue.rearm();
    assert!(queue.offer(1).is_none());
    assert_eq!(queue.clear(), 1);
    assert!(queue.is_empty());
}

// ---------------------------------------------------------------------------
// Destruction tracker
// ---------------------------------------------------------------------------

#[test]
fn test_destruction_states_are_ordered() {
    assert!(DestructionState::None < DestructionState::Pending);
    assert!(DestructionState::Pending < DestructionState::Accepted);
    assert!(DestructionState::Accepted < DestructionState::Completed);
}

#[test]
fn test_destruction_only_moves_forward() {
    let mut tracker = DestructionTracker::new();
    assert_eq!(tracker.state(), DestructionState::None);

    assert!(tracker.request_close(false));
    assert_eq!(tracker.state(), DestructionState::Pending);
    assert!(tracker.request_close(false));
    assert_eq!(tracker.state(), DestructionState::Pending);

    assert!(tracker.accept());
    assert!(!tracker.accept());
    assert!(!tracker.request_close(false));
    assert!(!tracker.request_close(true));
    assert_eq!(tracker.state(), DestructionState::Accepted);

    assert!(tracker.complete());
    assert_eq!(tracker.state(), DestructionState::Completed);
    assert!(!tracker.request_close(true));
    assert!(!tracker.accept());
    assert_eq!(tracker.state(), DestructionState::Completed);
}

#[test]
fn test_forced_close_skips_pending() {
    let mut tracker = DestructionTracker::new();
    assert!(tracker.request_close(true));
    assert_eq!(tracker.state(), DestructionState::Accepted);
}

// ---------------------------------------------------------------------------
// Pending slot
// ---------------------------------------------------------------------------

#[test]
fn test_pending_slot_rejects_second_value() {
    let slot = PendingSlot::new();
    assert!(slot.set(1).is_ok());
    assert_eq!(slot.set(2), Err(2));
    assert!(slot.is_pending());

    assert_eq!(slot.take(), Some(1));
    assert!(!slot.is_pending());
    assert!(slot.set(3).is_ok());
    assert_eq!(slot.take(), Some(3));
    assert_eq!(slot.take(), None);
}

// ---------------------------------------------------------------------------
// Browser registry
// ---------------------------------------------------------------------------

#[test]
fn test_browser_ids_grow() {
    let a = registry::create_browser_info(false, false);
    let b = registry::create_browser_info(true, true);
    assert!(a.browser_id() >= 1);
    assert!(b.browser_id() > a.browser_id());
    assert!(b.is_popup());
    assert!(b.is_windowless());
}

#[test]
fn test_registry_lookups() {
    let mut fixture = common::fixture();
    let id = fixture.host.browser_id();
    fixture.host.render_view_created(1001, 5);
    fixture.host.render_frame_created(1001, 6);

    let found = registry::browser_by_id(id).expect("registered browser");
    assert!(found.is_same(fixture.host.handle()));
    assert!(
        registry::browser_for_view(1001, 5)
            .is_some_and(|b| b.is_same(fixture.host.handle()))
    );
    let request = RequestInfo {
        render_process_id: 1001,
        render_frame_id: 6,
        frame_id: FrameId(1),
        parent_frame_id: FrameId::UNSPECIFIED,
        is_main_frame: true,
    };
    assert!(
        registry::browser_for_request(&request).is_some_and(|b| b.browser_id() == id)
    );
    assert!(
        registry::browser_for_request(&RequestInfo {
            render_process_id: -1,
            ..request.clone()
        })
        .is_none()
    );

    fixture.host.render_view_deleted(1001, 5);
    assert!(registry::browser_for_view(1001, 5).is_none());

    fixture.host.close_browser(true);
    fixture.host.window_destroyed();
    assert!(registry::browser_by_id(id).is_none());
    assert!(registry::browser_for_frame(1001, 6).is_none());
}

// ---------------------------------------------------------------------------
// URL fix-up and input validation
// ---------------------------------------------------------------------------

#[test]
fn test_fixup_url() {
    assert_eq!(
        fixup_url("example.com").map(|u| u.to_string()).ok(),
        Some("http://example.com/".to_string())
    );
    assert_eq!(
        fixup_url("  https://example.com/a ").map(|u| u.to_string()).ok(),
        Some("https://example.com/a".to_string())
    );
    assert!(matches!(fixup_url(""), Err(HostError::InvalidUrl(_))));
    assert!(matches!(fixup_url("http://[::1"), Err(HostError::InvalidUrl(_))));
}

#[test]
fn test_input_validation() {
    assert!(InputEvent::Key(KeyEvent::char('a')).validate().is_ok());
    assert!(
        InputEvent::Key(KeyEvent::new(KeyEventKind::Char, 65))
            .validate()
            .is_err()
    );
    assert!(
        InputEvent::MouseClick {
            event: MouseEvent::at(1, 1),
            button: MouseButton::Left,
            mouse_up: false,
            click_count: 0,
        }
        .validate()
        .is_err()
    );
    assert!(
        InputEvent::MouseWheel {
            event: MouseEvent::at(1, 1),
            delta_x: 0,
            delta_y: 0,
        }
        .validate()
        .is_err()
    );
}
