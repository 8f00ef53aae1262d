/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Popups, JavaScript dialogs, the file chooser, context menus and DevTools.
//!
//! At most one JavaScript dialog and one file chooser are pending at a time;
//! a second request while one is pending fails the same way a second popup
//! does.

use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, warn};

use super::{BrowserHost, HostParams};
use crate::bridge::{ContentProcessBridge, PlatformWindow};
use crate::client::Client;
use crate::pending::PendingPopupInfo;
use crate::types::{
    BrowserSettings, ContextMenuParams, FileChooserParams, FrameId, HostError, JsDialogParams,
    WindowInfo,
};

/// Result of an alert/confirm/prompt: accepted, and the prompt text.
pub type JsDialogCallback = Box<dyn FnOnce(bool, String)>;

/// Result of a before-unload prompt: true to leave the page.
pub type BeforeUnloadCallback = Box<dyn FnOnce(bool)>;

/// Selected paths; empty when the dialog was cancelled.
pub type FileDialogCallback = Box<dyn FnOnce(Vec<PathBuf>)>;

pub(super) enum PendingDialog {
    JavaScript(JsDialogCallback),
    BeforeUnload(BeforeUnloadCallback),
}

impl PendingDialog {
    fn complete(self, success: bool, user_input: String) {
        match self {
            PendingDialog::JavaScript(callback) => callback(success, user_input),
            PendingDialog::BeforeUnload(callback) => callback(success),
        }
    }
}

/// Who gets the file chooser result.
pub(super) enum FileChooserTarget {
    Embedder(FileDialogCallback),
    /// A chooser the page opened; the result goes back to the content.
    Content,
}

impl BrowserHost {
    // -----------------------------------------------------------------------
    // Popups
    // -----------------------------------------------------------------------

    /// Popup policy. Builds the default popup parameters from this
    /// browser, lets the client adjust or cancel them, and parks them in the
    /// pending slot. Returns false if the popup must not be created,
    /// including when another popup is still pending.
    pub fn on_before_popup(
        &mut self,
        source_frame_id: FrameId,
        target_url: &str,
        target_frame_name: &str,
    ) -> bool {
        if self.is_destroyed() {
            return false;
        }

        let mut popup = PendingPopupInfo {
            window_info: WindowInfo {
                windowless: self.window_info.windowless,
                parent: self.window_info.parent,
                ..WindowInfo::default()
            },
            settings: self.settings.clone(),
            client: self.client.clone(),
        };

        let client = self.client.clone();
        if let Some(handler) = client.as_deref().and_then(|c| c.life_span_handler()) {
            let frame = self.frames.frame(source_frame_id);
            if handler.on_before_popup(
                &self.handle,
                frame,
                target_url,
                target_frame_name,
                &mut popup,
            ) {
                debug!("popup for {target_url} cancelled by the client");
                return false;
            }
        }

        if !self.handle.set_pending_popup_info(popup) {
            warn!("popup for {target_url} refused: another popup is pending");
            return false;
        }
        true
    }

    /// The content wants to create a new view. Allowed only while popup
    /// parameters are pending.
    pub fn should_create_web_contents(&self) -> bool {
        self.handle.has_pending_popup()
    }

    /// The popup's view exists: consume the pending parameters and create
    /// its browser.
    pub fn web_contents_created(
        &mut self,
        bridge: Box<dyn ContentProcessBridge>,
        platform: Box<dyn PlatformWindow>,
    ) -> Result<BrowserHost, HostError> {
        let Some(popup) = self.handle.take_pending_popup_info() else {
            warn!("popup view created without pending popup parameters");
            return Err(HostError::InvalidTarget);
        };
        BrowserHost::create(HostParams {
            window_info: popup.window_info,
            settings: popup.settings,
            client: popup.client,
            url: None,
            opener: self.window_handle(),
            is_popup: true,
            request_context: self.request_context.clone(),
            bridge,
            platform,
        })
    }

    // -----------------------------------------------------------------------
    // JavaScript dialogs
    // -----------------------------------------------------------------------

    /// Runs an alert/confirm/prompt. The client may run it itself and answer
    /// later through [`javascript_dialog_closed`](Self::javascript_dialog_closed);
    /// otherwise the platform runs it now. Returns false if a dialog is
    /// already pending.
    pub fn run_javascript_dialog(
        &mut self,
        params: &JsDialogParams,
        callback: JsDialogCallback,
    ) -> bool {
        if self.dialog.is_pending() {
            warn!("javascript dialog refused: another dialog is pending");
            return false;
        }

        let client = self.client.clone();
        if let Some(handler) = client.as_deref().and_then(|c| c.js_dialog_handler()) {
            let mut suppress_message = false;
            let handled = handler.on_js_dialog(&self.handle, params, &mut suppress_message);
            if suppress_message {
                callback(false, String::new());
                return true;
            }
            if handled {
                self.park_dialog(PendingDialog::JavaScript(callback));
                return true;
            }
        }

        match self.platform.run_javascript_dialog(params) {
            Some((success, user_input)) => callback(success, user_input),
            None => callback(false, String::new()),
        }
        true
    }

    /// Runs a before-unload prompt. Without a dialog to show, the page is
    /// left.
    pub fn run_before_unload_dialog(
        &mut self,
        message_text: &str,
        is_reload: bool,
        callback: BeforeUnloadCallback,
    ) -> bool {
        if self.dialog.is_pending() {
            warn!("before-unload dialog refused: another dialog is pending");
            return false;
        }

        let client = self.client.clone();
        let handled = client
            .as_deref()
            .and_then(|c| c.js_dialog_handler())
            .is_some_and(|handler| {
                handler.on_before_unload_dialog(&self.handle, message_text, is_reload)
            });
        if handled {
            self.park_dialog(PendingDialog::BeforeUnload(callback));
            return true;
        }

        let proceed = self
            .platform
            .run_before_unload_dialog(message_text, is_reload)
            .unwrap_or(true);
        callback(proceed);
        true
    }

    /// The client finished a dialog it chose to run. Returns false when no
    /// dialog was pending.
    pub fn javascript_dialog_closed(&mut self, success: bool, user_input: &str) -> bool {
        match self.dialog.take() {
            Some(dialog) => {
                dialog.complete(success, user_input.to_string());
                true
            }
            None => {
                debug!("no javascript dialog pending");
                false
            }
        }
    }

    pub fn has_pending_dialog(&self) -> bool {
        self.dialog.is_pending()
    }

    /// Dismisses any pending dialog and tells the client.
    pub fn reset_dialog_state(&mut self) {
        self.cancel_pending_dialog();
        let client = self.client.clone();
        if let Some(handler) = client.as_deref().and_then(|c| c.js_dialog_handler()) {
            handler.on_reset_dialog_state(&self.handle);
        }
    }

    fn park_dialog(&mut self, dialog: PendingDialog) {
        if let Err(dialog) = self.dialog.set(dialog) {
            dialog.complete(false, String::new());
        }
    }

    fn cancel_pending_dialog(&mut self) {
        if let Some(dialog) = self.dialog.take() {
            debug!("cancelling pending dialog");
            dialog.complete(false, String::new());
        }
    }

    /// Dismisses every pending dialog and file chooser without notifying
    /// the client.
    pub(super) fn cancel_dialogs(&mut self) {
        self.cancel_pending_dialog();
        if let Some(target) = self.file_chooser.take() {
            self.finish_file_chooser(target, Vec::new());
        }
    }

    // -----------------------------------------------------------------------
    // File chooser
    // -----------------------------------------------------------------------

    /// Embedder-initiated file dialog.
    pub fn run_file_dialog(
        &mut self,
        params: &FileChooserParams,
        callback: FileDialogCallback,
    ) -> bool {
        self.start_file_chooser(params, FileChooserTarget::Embedder(callback))
    }

    /// Content-initiated file chooser; the result goes to the content
    /// process.
    pub fn run_file_chooser(&mut self, params: &FileChooserParams) -> bool {
        self.start_file_chooser(params, FileChooserTarget::Content)
    }

    /// Result of a file dialog the client chose to run. Returns false when
    /// none was pending.
    pub fn file_chooser_completed(&mut self, paths: Vec<PathBuf>) -> bool {
        match self.file_chooser.take() {
            Some(target) => {
                self.finish_file_chooser(target, paths);
                true
            }
            None => {
                debug!("no file chooser pending");
                false
            }
        }
    }

    pub fn has_pending_file_chooser(&self) -> bool {
        self.file_chooser.is_pending()
    }

    fn start_file_chooser(
        &mut self,
        params: &FileChooserParams,
        target: FileChooserTarget,
    ) -> bool {
        if self.is_destroyed() {
            self.finish_file_chooser(target, Vec::new());
            return false;
        }
        if let Err(target) = self.file_chooser.set(target) {
            warn!("file chooser refused: another one is pending");
            self.finish_file_chooser(target, Vec::new());
            return false;
        }

        let client = self.client.clone();
        let handled = client
            .as_deref()
            .and_then(|c| c.dialog_handler())
            .is_some_and(|handler| handler.on_file_dialog(&self.handle, params));
        if handled {
            return true;
        }

        let paths = self.platform.run_file_chooser(params);
        self.file_chooser_completed(paths);
        true
    }

    fn finish_file_chooser(&mut self, target: FileChooserTarget, paths: Vec<PathBuf>) {
        match target {
            FileChooserTarget::Embedder(callback) => callback(paths),
            FileChooserTarget::Content => self.outbox.bridge().files_selected(&paths),
        }
    }

    // -----------------------------------------------------------------------
    // Context menu
    // -----------------------------------------------------------------------

    /// Shows the platform context menu. Returns false when none was shown.
    pub fn handle_context_menu(&mut self, params: &ContextMenuParams) -> bool {
        if self.is_destroyed() || self.window_destroyed {
            return false;
        }
        if self.context_menu_running {
            self.platform.cancel_context_menu();
        }
        self.context_menu_running = self.platform.run_context_menu(params);
        self.context_menu_running
    }

    pub fn context_menu_closed(&mut self) {
        self.context_menu_running = false;
    }

    pub fn is_context_menu_running(&self) -> bool {
        self.context_menu_running
    }

    // -----------------------------------------------------------------------
    // DevTools
    // -----------------------------------------------------------------------

    /// Opens the DevTools frontend, or focuses it if already open.
    pub fn show_devtools(
        &mut self,
        window_info: &WindowInfo,
        client: Option<Arc<dyn Client>>,
        settings: &BrowserSettings,
    ) -> bool {
        if let Some(devtools) = self.devtools.as_mut() {
            devtools.focus();
            return true;
        }
        match self.platform.show_devtools(window_info, client, settings) {
            Some(frontend) => {
                debug!("devtools opened for browser {}", self.browser_id());
                self.devtools = Some(frontend);
                true
            }
            None => false,
        }
    }

    /// Asks the frontend to close; it reports back through
    /// [`devtools_destroyed`](Self::devtools_destroyed).
    pub fn close_devtools(&mut self) {
        if let Some(devtools) = self.devtools.as_mut() {
            devtools.close();
        }
    }

    /// The frontend was destroyed.
    pub fn devtools_destroyed(&mut self) {
        if self.devtools.take().is_some() {
            debug!("devtools closed for browser {}", self.browser_id());
        }
    }

    pub fn has_devtools(&self) -> bool {
        self.devtools.is_some()
    }
}
