/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Content lifecycle and browser destruction.
//!
//! A close runs `close_browser` -> (before-unload) -> `close_contents` ->
//! platform window close -> `window_destroyed` -> `destroy_browser`.
//! Windowless browsers have no native window and are destroyed as soon as
//! the close is accepted.

use log::{debug, warn};

use super::BrowserHost;
use crate::destruction::DestructionState;
use crate::registry;
use crate::types::TerminationStatus;

impl BrowserHost {
    pub fn destruction_state(&self) -> DestructionState {
        self.destruction.state()
    }

    // -----------------------------------------------------------------------
    // Close sequence
    // -----------------------------------------------------------------------

    /// Asks the browser to close. Unless `force` is set, the page's unload
    /// handlers run first and may veto. No-op once the close was accepted.
    pub fn close_browser(&mut self, force: bool) {
        if !self.destruction.request_close(force) {
            debug!(
                "close of browser {} ignored in state {:?}",
                self.browser_id(),
                self.destruction.state()
            );
            return;
        }

        if self.destruction.state() == DestructionState::Pending
            && self.outbox.bridge().needs_before_unload()
        {
            self.outbox.bridge().dispatch_before_unload();
        } else {
            self.close_contents();
        }
    }

    /// The page's unload handlers answered. Returns whether unload proceeds.
    ///
    /// A veto leaves the state at [`DestructionState::Pending`]; nothing
    /// further happens until the next close request.
    pub fn before_unload_fired(&mut self, proceed: bool) -> bool {
        let state = self.destruction.state();
        if state == DestructionState::Completed {
            return false;
        }
        if !proceed && state != DestructionState::Accepted {
            warn!("close of browser {} vetoed by the page", self.browser_id());
            return false;
        }
        if state == DestructionState::Pending {
            self.destruction.accept();
        }
        if state >= DestructionState::Pending {
            self.close_contents();
        }
        true
    }

    /// The content asked to close, or a close request was accepted.
    ///
    /// Unless the native window is already gone, the client's `do_close`
    /// may take over closing the window itself. A client that does so on a
    /// windowless browser reports completion through
    /// [`window_destroyed`](Self::window_destroyed).
    pub fn close_contents(&mut self) {
        if self.is_destroyed() {
            return;
        }

        if !self.window_destroyed {
            let client = self.client.clone();
            let client_closes = client
                .as_deref()
                .and_then(|c| c.life_span_handler())
                .is_some_and(|handler| handler.do_close(&self.handle));
            if client_closes {
                debug!("client closes browser {} itself", self.browser_id());
                return;
            }
        }

        self.destruction.accept();
        if !self.window_info.windowless && !self.window_destroyed {
            self.platform.close_window();
        } else {
            self.destroy_browser();
        }
    }

    /// The platform destroyed the native window.
    pub fn window_destroyed(&mut self) {
        // The menu goes with the window.
        self.context_menu_running = false;
        self.window_destroyed = true;
        if self.is_destroyed() {
            return;
        }
        self.destruction.request_close(true);
        self.close_contents();
    }

    /// Releases everything the browser owns and unregisters it.
    ///
    /// Runs exactly once. Calling it again is a programming error.
    pub fn destroy_browser(&mut self) {
        if !self.destruction.complete() {
            return;
        }

        let client = self.client.clone();
        if let Some(handler) = client.as_deref().and_then(|c| c.life_span_handler()) {
            handler.on_before_close(&self.handle);
        }

        if let Some(mut devtools) = self.devtools.take() {
            devtools.close();
        }

        let cancelled = self.responses.cancel_all();
        self.cancel_dialogs();
        if self.context_menu_running {
            self.context_menu_running = false;
            self.platform.cancel_context_menu();
        }

        self.frames.detach_all();
        let dropped = self.outbox.clear();
        registry::unregister(&self.handle);

        debug!(
            "browser {} destroyed ({cancelled} requests cancelled, {dropped} queued messages dropped)",
            self.browser_id()
        );
    }

    // -----------------------------------------------------------------------
    // Content process lifecycle
    // -----------------------------------------------------------------------

    pub fn render_view_created(&mut self, render_process_id: i32, render_routing_id: i32) {
        self.handle
            .info()
            .add_render_view_id(render_process_id, render_routing_id);
    }

    pub fn render_view_deleted(&mut self, render_process_id: i32, render_routing_id: i32) {
        self.handle
            .info()
            .remove_render_view_id(render_process_id, render_routing_id);
    }

    pub fn render_frame_created(&mut self, render_process_id: i32, render_routing_id: i32) {
        self.handle
            .info()
            .add_render_frame_id(render_process_id, render_routing_id);
    }

    pub fn render_frame_deleted(&mut self, render_process_id: i32, render_routing_id: i32) {
        self.handle
            .info()
            .remove_render_frame_id(render_process_id, render_routing_id);
    }

    /// The content-side observer exists: flush the queued messages.
    pub fn render_view_ready(&mut self) {
        self.outbox.flush();
    }

    /// The content process went away.
    ///
    /// Outstanding requests are cancelled and dialogs reset, and messages
    /// queue again until the replacement view is ready. The destruction
    /// state does not change: a crashed browser still needs an explicit
    /// close.
    pub fn render_process_gone(&mut self, status: TerminationStatus) {
        warn!("content process of browser {} gone: {status:?}", self.browser_id());
        self.outbox.rearm();
        self.responses.cancel_all();
        self.reset_dialog_state();

        if status == TerminationStatus::NormalTermination {
            return;
        }
        let client = self.client.clone();
        if let Some(handler) = client.as_deref().and_then(|c| c.request_handler()) {
            handler.on_render_process_terminated(&self.handle, status);
        }
    }

    pub fn plugin_crashed(&mut self, plugin_path: &str) {
        warn!("plugin crashed: {plugin_path}");
        let client = self.client.clone();
        if let Some(handler) = client.as_deref().and_then(|c| c.request_handler()) {
            handler.on_plugin_crashed(&self.handle, plugin_path);
        }
    }
}
