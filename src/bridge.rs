/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Collaborators the host drives: the content process and the platform
//! window. Both are owned by the host and used from the UI role only.

use std::path::PathBuf;
use std::sync::Arc;

use dpi::PhysicalSize;
use url::Url;

use crate::client::Client;
use crate::input::{InputEvent, KeyEvent};
use crate::ipc::{IpcMessage, NavigateParams};
use crate::types::{
    BrowserSettings, ContextMenuParams, FileChooserParams, JsDialogParams, WindowHandle,
    WindowInfo,
};

/// A find-in-page request.
#[derive(Debug, Clone, PartialEq)]
pub struct FindRequest {
    pub identifier: i32,
    pub search_text: String,
    pub forward: bool,
    pub match_case: bool,
    pub find_next: bool,
}

/// Channel to the content process serving one view.
///
/// Only [`send`](Self::send) and the routing identity are mandatory; the
/// controller-level operations default to doing nothing.
pub trait ContentProcessBridge {
    /// Delivers a message to this view's routing id.
    fn send(&mut self, message: IpcMessage);

    fn routing_id(&self) -> i32;

    fn render_process_id(&self) -> i32;

    /// Starts a main-frame navigation through the navigation controller.
    fn load_url(&mut self, _params: NavigateParams) {}

    fn go_back(&mut self) {}

    fn go_forward(&mut self) {}

    fn reload(&mut self, _ignore_cache: bool) {}

    fn stop_load(&mut self) {}

    fn set_zoom_level(&mut self, _level: f64) {}

    fn find(&mut self, _request: FindRequest) {}

    fn stop_finding(&mut self, _clear_selection: bool) {}

    fn forward_input_event(&mut self, _event: InputEvent) {}

    fn set_focus(&mut self, _focused: bool) {}

    fn capture_lost(&mut self) {}

    /// True when the page has unload handlers that must run before closing.
    fn needs_before_unload(&self) -> bool {
        false
    }

    /// Runs the page's unload handlers. The answer arrives later through
    /// `BrowserHost::before_unload_fired`.
    fn dispatch_before_unload(&mut self) {}

    fn was_resized(&mut self) {}

    fn was_hidden(&mut self, _hidden: bool) {}

    fn notify_screen_info_changed(&mut self) {}

    /// Result of a content-initiated file chooser; empty when cancelled.
    fn files_selected(&mut self, _paths: &[PathBuf]) {}

    fn start_download(&mut self, _url: &Url) {}

    fn print(&mut self) {}
}

/// A DevTools frontend created for a browser.
pub trait DevToolsFrontend {
    fn focus(&mut self);

    /// Begins closing. The frontend reports its own destruction later
    /// through `BrowserHost::devtools_destroyed`.
    fn close(&mut self);
}

/// Native windowing, widgets and OS event translation.
pub trait PlatformWindow {
    fn create_window(&mut self, info: &WindowInfo) -> bool;

    /// Closes the native window. The platform reports completion through
    /// `BrowserHost::window_destroyed`.
    fn close_window(&mut self);

    fn resize(&mut self, _size: PhysicalSize<u32>) {}

    fn window_handle(&self) -> Option<WindowHandle>;

    fn translate_input_event(&self, event: InputEvent) -> InputEvent {
        event
    }

    fn set_focus(&mut self, _focused: bool) {}

    /// Runs a file chooser to completion. Empty when cancelled.
    fn run_file_chooser(&mut self, _params: &FileChooserParams) -> Vec<PathBuf> {
        Vec::new()
    }

    /// Runs a JavaScript dialog to completion, or `None` when the platform
    /// has no dialog to offer.
    fn run_javascript_dialog(&mut self, _params: &JsDialogParams) -> Option<(bool, String)> {
        None
    }

    fn run_before_unload_dialog(&mut self, _message: &str, _is_reload: bool) -> Option<bool> {
        None
    }

    /// Shows a context menu. Returns false when none was shown.
    fn run_context_menu(&mut self, _params: &ContextMenuParams) -> bool {
        false
    }

    fn cancel_context_menu(&mut self) {}

    /// Keyboard event the page and the client left unhandled.
    fn handle_keyboard_event(&mut self, _event: &KeyEvent) {}

    fn handle_external_protocol(&mut self, _url: &Url) {}

    fn view_text(&mut self, _text: &str) -> bool {
        false
    }

    fn show_devtools(
        &mut self,
        _info: &WindowInfo,
        _client: Option<Arc<dyn Client>>,
        _settings: &BrowserSettings,
    ) -> Option<Box<dyn DevToolsFrontend>> {
        None
    }
}
