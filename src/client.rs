/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Embedding-application callbacks.
//!
//! A [`Client`] hands out one handler per capability. Every callback runs on
//! the UI role, in the order the content process produced the underlying
//! events. Handlers must not call back into the host synchronously; use
//! [`HostThread::post`](crate::HostThread::post) instead.

use crate::frame::Frame;
use crate::handle::BrowserHandle;
use crate::input::KeyEvent;
use crate::pending::PendingPopupInfo;
use crate::types::{
    ConsoleMessage, FileChooserParams, FocusSource, JsDialogParams, ProcessId, ProcessMessage,
    TerminationStatus,
};

pub trait Client: Send + Sync {
    fn life_span_handler(&self) -> Option<&dyn LifeSpanHandler> {
        None
    }

    fn load_handler(&self) -> Option<&dyn LoadHandler> {
        None
    }

    fn display_handler(&self) -> Option<&dyn DisplayHandler> {
        None
    }

    fn focus_handler(&self) -> Option<&dyn FocusHandler> {
        None
    }

    fn keyboard_handler(&self) -> Option<&dyn KeyboardHandler> {
        None
    }

    fn dialog_handler(&self) -> Option<&dyn DialogHandler> {
        None
    }

    fn js_dialog_handler(&self) -> Option<&dyn JsDialogHandler> {
        None
    }

    fn request_handler(&self) -> Option<&dyn RequestHandler> {
        None
    }

    /// A user-initiated message from the content process. Return true if
    /// handled.
    fn on_process_message_received(
        &self,
        _browser: &BrowserHandle,
        _source: ProcessId,
        _message: &ProcessMessage,
    ) -> bool {
        false
    }
}

pub trait LifeSpanHandler {
    /// A popup is about to be created. `popup` starts as a copy of the
    /// opener's settings and client and may be customised. Return true to
    /// cancel the popup.
    fn on_before_popup(
        &self,
        _browser: &BrowserHandle,
        _frame: &Frame,
        _target_url: &str,
        _target_frame_name: &str,
        _popup: &mut PendingPopupInfo,
    ) -> bool {
        false
    }

    fn on_after_created(&self, _browser: &BrowserHandle) {}

    /// The browser is about to close. Return true to take over closing the
    /// native window yourself.
    fn do_close(&self, _browser: &BrowserHandle) -> bool {
        false
    }

    /// Last callback before the browser is released.
    fn on_before_close(&self, _browser: &BrowserHandle) {}
}

pub trait LoadHandler {
    fn on_loading_state_change(
        &self,
        _browser: &BrowserHandle,
        _is_loading: bool,
        _can_go_back: bool,
        _can_go_forward: bool,
    ) {
    }

    fn on_load_start(&self, _browser: &BrowserHandle, _frame: &Frame) {}

    fn on_load_end(&self, _browser: &BrowserHandle, _frame: &Frame, _http_status_code: i32) {}

    /// Error code and text are passed through from the content process.
    fn on_load_error(
        &self,
        _browser: &BrowserHandle,
        _frame: &Frame,
        _error_code: i32,
        _error_text: &str,
        _failed_url: &str,
    ) {
    }
}

pub trait DisplayHandler {
    fn on_address_change(&self, _browser: &BrowserHandle, _frame: &Frame, _url: &str) {}

    fn on_title_change(&self, _browser: &BrowserHandle, _title: &str) {}

    fn on_status_message(&self, _browser: &BrowserHandle, _value: &str) {}

    /// Return true to stop the message from being logged further.
    fn on_console_message(&self, _browser: &BrowserHandle, _message: &ConsoleMessage) -> bool {
        false
    }
}

pub trait FocusHandler {
    /// Focus is leaving the browser; `next` is the tab direction.
    fn on_take_focus(&self, _browser: &BrowserHandle, _next: bool) {}

    /// Return true to cancel the focus change.
    fn on_set_focus(&self, _browser: &BrowserHandle, _source: FocusSource) -> bool {
        false
    }

    fn on_got_focus(&self, _browser: &BrowserHandle) {}
}

pub trait KeyboardHandler {
    /// Before the page sees the event. Return true if handled; set
    /// `is_keyboard_shortcut` to let the page see it first.
    fn on_pre_key_event(
        &self,
        _browser: &BrowserHandle,
        _event: &KeyEvent,
        _is_keyboard_shortcut: &mut bool,
    ) -> bool {
        false
    }

    /// After the page left the event unhandled. Return true if handled.
    fn on_key_event(&self, _browser: &BrowserHandle, _event: &KeyEvent) -> bool {
        false
    }
}

pub trait DialogHandler {
    /// Return true to run the dialog yourself and report the result through
    /// `BrowserHost::file_chooser_completed`.
    fn on_file_dialog(&self, _browser: &BrowserHandle, _params: &FileChooserParams) -> bool {
        false
    }
}

pub trait JsDialogHandler {
    /// Return true to run the dialog yourself and report the result through
    /// `BrowserHost::javascript_dialog_closed`. Set `suppress_message` to
    /// dismiss it silently.
    fn on_js_dialog(
        &self,
        _browser: &BrowserHandle,
        _params: &JsDialogParams,
        _suppress_message: &mut bool,
    ) -> bool {
        false
    }

    /// Same contract as [`Self::on_js_dialog`] for before-unload prompts.
    fn on_before_unload_dialog(
        &self,
        _browser: &BrowserHandle,
        _message_text: &str,
        _is_reload: bool,
    ) -> bool {
        false
    }

    /// Pending dialogs were dismissed.
    fn on_reset_dialog_state(&self, _browser: &BrowserHandle) {}
}

pub trait RequestHandler {
    /// An external protocol URL; set `allow_os_execution` to hand it to the
    /// platform.
    fn on_protocol_execution(
        &self,
        _browser: &BrowserHandle,
        _url: &str,
        _allow_os_execution: &mut bool,
    ) {
    }

    fn on_render_process_terminated(&self, _browser: &BrowserHandle, _status: TerminationStatus) {}

    fn on_plugin_crashed(&self, _browser: &BrowserHandle, _plugin_path: &str) {}
}
