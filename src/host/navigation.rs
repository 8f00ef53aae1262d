/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Embedder navigation and the navigation observer.
//!
//! Load callbacks for one navigation reach the client in the order the
//! content process emitted them: load start and address change on commit,
//! then either load end or load error.

use log::{debug, trace, warn};
use url::Url;

use super::BrowserHost;
use crate::frame::FrameHandle;
use crate::ipc::{IpcMessage, NavigateParams};
use crate::queue::MessageSink;
use crate::types::{ConsoleMessage, FrameId, HostError};

/// Parses user input as a URL, retrying scheme-less input as `http://`.
pub fn fixup_url(input: &str) -> Result<Url, HostError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(HostError::InvalidUrl(input.to_string()));
    }
    match Url::parse(trimmed) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("http://{trimmed}"))
            .map_err(|_| HostError::InvalidUrl(input.to_string())),
        Err(_) => Err(HostError::InvalidUrl(input.to_string())),
    }
}

impl BrowserHost {
    // -----------------------------------------------------------------------
    // Embedder navigation
    // -----------------------------------------------------------------------

    /// Loads `url` in a frame. Main-frame loads go through the navigation
    /// controller; sub-frame loads are sent to the content process.
    pub fn load_url(&mut self, frame_id: FrameId, url: &str) -> Result<(), HostError> {
        if self.is_destroyed() {
            return Err(HostError::Destroyed);
        }
        let url = fixup_url(url)?;
        let target = self.frames.resolve_target(frame_id);
        if frame_id == FrameId::MAIN || target == self.frames.main_frame_id() {
            self.navigate_main(url);
            return Ok(());
        }
        if !target.is_valid() {
            return Err(HostError::InvalidTarget);
        }
        self.outbox
            .send(IpcMessage::LoadRequest(NavigateParams::get(target, url)));
        Ok(())
    }

    /// Loads `string` as the content of a frame, reported under `url`.
    pub fn load_string(
        &mut self,
        frame_id: FrameId,
        string: &str,
        url: &str,
    ) -> Result<(), HostError> {
        let mut params = self.frame_request(frame_id, "load-string")?;
        let url = fixup_url(url)?;
        params.arguments = vec![
            serde_json::Value::from(string),
            serde_json::Value::from(url.as_str()),
        ];
        self.outbox.send(IpcMessage::Request(params));
        Ok(())
    }

    /// Sends a full navigation request (method, headers, body) for a frame.
    pub fn load_request(
        &mut self,
        frame_id: FrameId,
        mut params: NavigateParams,
    ) -> Result<(), HostError> {
        if self.is_destroyed() {
            return Err(HostError::Destroyed);
        }
        let target = self.frames.resolve_target(frame_id);
        if !target.is_valid() {
            return Err(HostError::InvalidTarget);
        }
        params.frame_id = target;
        self.outbox.send(IpcMessage::LoadRequest(params));
        Ok(())
    }

    pub(super) fn navigate_main(&mut self, url: Url) {
        debug!("browser {} loading {url}", self.browser_id());
        self.handle
            .update_navigation(|nav| nav.loading_url = Some(url.clone()));
        self.outbox
            .bridge()
            .load_url(NavigateParams::get(FrameId::MAIN, url));
    }

    pub fn go_back(&mut self) -> bool {
        if !self.handle.can_go_back() {
            return false;
        }
        self.outbox.bridge().go_back();
        true
    }

    pub fn go_forward(&mut self) -> bool {
        if !self.handle.can_go_forward() {
            return false;
        }
        self.outbox.bridge().go_forward();
        true
    }

    pub fn reload(&mut self) {
        self.outbox.bridge().reload(false);
    }

    pub fn reload_ignore_cache(&mut self) {
        self.outbox.bridge().reload(true);
    }

    pub fn stop_load(&mut self) {
        self.outbox.bridge().stop_load();
    }

    // -----------------------------------------------------------------------
    // Navigation observer
    // -----------------------------------------------------------------------

    pub fn loading_state_changed(
        &mut self,
        is_loading: bool,
        can_go_back: bool,
        can_go_forward: bool,
    ) {
        if self.observer_closed("loading state change") {
            return;
        }
        self.handle.update_navigation(|nav| {
            nav.is_loading = is_loading;
            nav.can_go_back = can_go_back;
            nav.can_go_forward = can_go_forward;
        });
        let client = self.client.clone();
        if let Some(handler) = client.as_deref().and_then(|c| c.load_handler()) {
            handler.on_loading_state_change(&self.handle, is_loading, can_go_back, can_go_forward);
        }
    }

    /// A navigation committed: load start, then address change for the
    /// main frame.
    pub fn did_commit_provisional_load(
        &mut self,
        frame_id: FrameId,
        parent_frame_id: FrameId,
        is_main_frame: bool,
        url: &str,
    ) {
        if self.observer_closed("commit") {
            return;
        }
        let frame = self
            .frames
            .get_or_create(frame_id, parent_frame_id, is_main_frame, "", url);
        if is_main_frame {
            if let Ok(url) = Url::parse(url) {
                self.handle
                    .update_navigation(|nav| nav.loading_url = Some(url));
            }
        }
        self.on_load_start(frame);
        if is_main_frame {
            self.on_address_change(frame, url);
        }
    }

    /// A navigation failed before committing.
    pub fn did_fail_provisional_load(
        &mut self,
        frame_id: FrameId,
        parent_frame_id: FrameId,
        is_main_frame: bool,
        validated_url: &str,
        error_code: i32,
        error_description: &str,
    ) {
        if self.observer_closed("provisional load failure") {
            return;
        }
        let frame = self
            .frames
            .get_or_create(frame_id, parent_frame_id, is_main_frame, "", "");
        self.on_load_error(frame, validated_url, error_code, error_description);
    }

    /// A committed load failed: load error, then load end.
    pub fn did_fail_load(
        &mut self,
        frame_id: FrameId,
        validated_url: &str,
        is_main_frame: bool,
        error_code: i32,
        error_description: &str,
    ) {
        if self.observer_closed("load failure") {
            return;
        }
        let frame = self.frames.get_or_create(
            frame_id,
            FrameId::UNSPECIFIED,
            is_main_frame,
            "",
            validated_url,
        );
        self.on_load_error(frame, validated_url, error_code, error_description);
        self.on_load_end(frame, error_code);
    }

    pub fn did_finish_load(
        &mut self,
        frame_id: FrameId,
        validated_url: &str,
        is_main_frame: bool,
        http_status_code: i32,
    ) {
        if self.observer_closed("finished load") {
            return;
        }
        let frame = self.frames.get_or_create(
            frame_id,
            FrameId::UNSPECIFIED,
            is_main_frame,
            "",
            validated_url,
        );
        self.on_load_end(frame, http_status_code);
    }

    pub fn document_available_in_main_frame(&mut self) {
        if self.observer_closed("document available") {
            return;
        }
        self.handle.update_navigation(|nav| nav.has_document = true);
    }

    /// The main frame committed a new document; it is not available until
    /// `document_available_in_main_frame`.
    pub fn did_navigate_main_frame_post_commit(&mut self) {
        if self.observer_closed("main frame post-commit") {
            return;
        }
        self.handle.update_navigation(|nav| nav.has_document = false);
    }

    pub fn title_changed(&mut self, title: &str) {
        if self.observer_closed("title change") {
            return;
        }
        self.title = title.to_string();
        let client = self.client.clone();
        if let Some(handler) = client.as_deref().and_then(|c| c.display_handler()) {
            handler.on_title_change(&self.handle, title);
        }
    }

    /// The URL under the mouse changed; reported as a status message.
    pub fn update_target_url(&mut self, url: &str) {
        if self.observer_closed("target url") {
            return;
        }
        let client = self.client.clone();
        if let Some(handler) = client.as_deref().and_then(|c| c.display_handler()) {
            handler.on_status_message(&self.handle, url);
        }
    }

    /// Returns true if the client consumed the message.
    pub fn add_message_to_console(&mut self, message: &ConsoleMessage) -> bool {
        if self.observer_closed("console message") {
            return false;
        }
        let client = self.client.clone();
        client
            .as_deref()
            .and_then(|c| c.display_handler())
            .is_some_and(|handler| handler.on_console_message(&self.handle, message))
    }

    /// Only a frame announced as the main frame takes the main designation;
    /// a missing parent id alone does not make one.
    pub fn frame_identified(
        &mut self,
        frame_id: FrameId,
        parent_frame_id: FrameId,
        is_main_frame: bool,
        name: &str,
    ) {
        if self.observer_closed("frame identity") {
            return;
        }
        self.frames
            .get_or_create(frame_id, parent_frame_id, is_main_frame, name, "");
    }

    pub fn loading_url_change(&mut self, pending_url: &str) {
        if self.observer_closed("loading url change") {
            return;
        }
        match Url::parse(pending_url) {
            Ok(url) => self
                .handle
                .update_navigation(|nav| nav.loading_url = Some(url)),
            Err(_) => warn!("ignoring unparsable pending url {pending_url:?}"),
        }
    }

    /// Content events arriving after destruction completed are dropped: the
    /// client has seen `on_before_close` and the frames are released.
    fn observer_closed(&self, event: &str) -> bool {
        if self.is_destroyed() {
            debug!("dropping {event} for destroyed browser {}", self.browser_id());
            return true;
        }
        false
    }

    // -----------------------------------------------------------------------
    // Client notifications
    // -----------------------------------------------------------------------

    fn on_load_start(&self, frame: FrameHandle) {
        let client = self.client.clone();
        if let Some(handler) = client.as_deref().and_then(|c| c.load_handler()) {
            handler.on_load_start(&self.handle, self.frames.resolve(frame));
        }
    }

    fn on_address_change(&self, frame: FrameHandle, url: &str) {
        let client = self.client.clone();
        if let Some(handler) = client.as_deref().and_then(|c| c.display_handler()) {
            handler.on_address_change(&self.handle, self.frames.resolve(frame), url);
        }
    }

    fn on_load_error(&self, frame: FrameHandle, url: &str, error_code: i32, error_text: &str) {
        trace!("load error {error_code} for {url}");
        let client = self.client.clone();
        if let Some(handler) = client.as_deref().and_then(|c| c.load_handler()) {
            handler.on_load_error(
                &self.handle,
                self.frames.resolve(frame),
                error_code,
                error_text,
                url,
            );
        }
    }

    fn on_load_end(&self, frame: FrameHandle, http_status_code: i32) {
        let client = self.client.clone();
        if let Some(handler) = client.as_deref().and_then(|c| c.load_handler()) {
            handler.on_load_end(&self.handle, self.frames.resolve(frame), http_status_code);
        }
    }
}
