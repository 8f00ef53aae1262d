/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! `BrowserHost`: the browser-side orchestrator for one content view.
//!
//! The host is UI-role only and is neither `Send` nor `Sync`. It composes
//! the frame registry, the response manager, the destruction tracker and
//! the pre-ready message queue, and is split by capability:
//!
//! - `navigation`: embedder navigation plus the navigation observer.
//! - `lifecycle`: content lifecycle signals and destruction.
//! - `input`: input delivery and focus.
//! - `dialogs`: popups, JavaScript dialogs, file chooser, context menu and
//!   DevTools.
//!
//! State shared with other roles lives on the [`BrowserHandle`].

mod dialogs;
mod input;
mod lifecycle;
mod navigation;

use std::sync::Arc;

use dpi::PhysicalSize;
use log::{debug, trace, warn};
use url::Url;

use crate::bridge::{ContentProcessBridge, DevToolsFrontend, FindRequest, PlatformWindow};
use crate::client::Client;
use crate::cookie::RequestContextProxy;
use crate::destruction::{DestructionState, DestructionTracker};
use crate::frame::{Frame, FrameHandle, FrameRegistry};
use crate::handle::BrowserHandle;
use crate::ipc::{IpcMessage, RequestParams, ResponseParams};
use crate::pending::PendingSlot;
use crate::queue::{MessageSink, Outbox};
use crate::registry;
use crate::response::{ResponseHandler, ResponseManager, ResponseOutcome};
use crate::types::{
    BrowserSettings, FrameId, HostError, ProcessId, ProcessMessage, RequestId, RequestInfo,
    WindowHandle, WindowInfo,
};

pub use dialogs::{BeforeUnloadCallback, FileDialogCallback, JsDialogCallback};
pub use navigation::fixup_url;

/// Receives the page source or text of a frame.
pub type StringVisitor = Box<dyn FnOnce(String)>;

/// Everything needed to create a browser.
pub struct HostParams {
    pub window_info: WindowInfo,
    pub settings: BrowserSettings,
    pub client: Option<Arc<dyn Client>>,
    /// Loaded into the main frame once the browser exists (default: none).
    pub url: Option<String>,
    /// Window of the browser that opened this one (default: none).
    pub opener: Option<WindowHandle>,
    pub is_popup: bool,
    pub request_context: Option<Arc<RequestContextProxy>>,
    pub bridge: Box<dyn ContentProcessBridge>,
    pub platform: Box<dyn PlatformWindow>,
}

impl HostParams {
    /// Default parameters around the two collaborators.
    pub fn new(bridge: Box<dyn ContentProcessBridge>, platform: Box<dyn PlatformWindow>) -> Self {
        Self {
            window_info: WindowInfo::default(),
            settings: BrowserSettings::default(),
            client: None,
            url: None,
            opener: None,
            is_popup: false,
            request_context: None,
            bridge,
            platform,
        }
    }
}

/// Browser host for one content view.
pub struct BrowserHost {
    handle: BrowserHandle,
    client: Option<Arc<dyn Client>>,
    window_info: WindowInfo,
    settings: BrowserSettings,
    request_context: Option<Arc<RequestContextProxy>>,
    opener: Option<WindowHandle>,

    outbox: Outbox,
    platform: Box<dyn PlatformWindow>,

    frames: FrameRegistry,
    responses: ResponseManager,
    destruction: DestructionTracker,

    zoom_level: f64,
    title: String,
    mouse_cursor_change_disabled: bool,
    focus_on_editable_field: bool,
    window_destroyed: bool,

    dialog: PendingSlot<dialogs::PendingDialog>,
    file_chooser: PendingSlot<dialogs::FileChooserTarget>,
    context_menu_running: bool,
    devtools: Option<Box<dyn DevToolsFrontend>>,
}

impl BrowserHost {
    /// Creates a browser: the native window (unless windowless), the
    /// registry entry, `on_after_created`, then the initial navigation.
    pub fn create(params: HostParams) -> Result<BrowserHost, HostError> {
        let HostParams {
            window_info,
            settings,
            client,
            url,
            opener,
            is_popup,
            request_context,
            bridge,
            mut platform,
        } = params;

        let initial_url = url
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(fixup_url)
            .transpose()?;

        if !window_info.windowless && !platform.create_window(&window_info) {
            warn!("native window creation failed");
            return Err(HostError::CreateWindowFailed);
        }

        let info = registry::create_browser_info(is_popup, window_info.windowless);
        let handle = BrowserHandle::new(info);

        let mut host = BrowserHost {
            handle,
            client,
            zoom_level: settings.initial_zoom_level,
            window_info,
            settings,
            request_context,
            opener,
            outbox: Outbox::new(bridge),
            platform,
            frames: FrameRegistry::new(),
            responses: ResponseManager::new(),
            destruction: DestructionTracker::new(),
            title: String::new(),
            mouse_cursor_change_disabled: false,
            focus_on_editable_field: false,
            window_destroyed: false,
            dialog: PendingSlot::new(),
            file_chooser: PendingSlot::new(),
            context_menu_running: false,
            devtools: None,
        };

        registry::register(&host.handle);
        debug!(
            "browser {} created (popup {}, windowless {})",
            host.browser_id(),
            is_popup,
            host.window_info.windowless
        );

        if host.zoom_level != 0.0 {
            let level = host.zoom_level;
            host.outbox.bridge().set_zoom_level(level);
        }

        let client = host.client.clone();
        if let Some(handler) = client.as_deref().and_then(|c| c.life_span_handler()) {
            handler.on_after_created(&host.handle);
        }

        if let Some(url) = initial_url {
            host.navigate_main(url);
        }

        Ok(host)
    }

    // -----------------------------------------------------------------------
    // Identity and configuration
    // -----------------------------------------------------------------------

    pub fn handle(&self) -> &BrowserHandle {
        &self.handle
    }

    pub fn browser_id(&self) -> i32 {
        self.handle.browser_id()
    }

    pub fn is_popup(&self) -> bool {
        self.handle.is_popup()
    }

    pub fn client(&self) -> Option<&Arc<dyn Client>> {
        self.client.as_ref()
    }

    pub fn settings(&self) -> &BrowserSettings {
        &self.settings
    }

    pub fn window_info(&self) -> &WindowInfo {
        &self.window_info
    }

    pub fn request_context(&self) -> Option<&Arc<RequestContextProxy>> {
        self.request_context.as_ref()
    }

    pub fn is_windowless(&self) -> bool {
        self.window_info.windowless
    }

    pub fn is_transparent(&self) -> bool {
        self.window_info.transparent
    }

    pub fn has_document(&self) -> bool {
        self.handle.has_document()
    }

    pub fn is_loading(&self) -> bool {
        self.handle.is_loading()
    }

    pub fn can_go_back(&self) -> bool {
        self.handle.can_go_back()
    }

    pub fn can_go_forward(&self) -> bool {
        self.handle.can_go_forward()
    }

    /// Last title reported by the page.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Native window handle. Windowless browsers report their parent.
    pub fn window_handle(&self) -> Option<WindowHandle> {
        if self.window_info.windowless {
            return self.window_info.parent;
        }
        self.platform.window_handle()
    }

    pub fn opener_window_handle(&self) -> Option<WindowHandle> {
        self.opener
    }

    pub fn set_mouse_cursor_change_disabled(&mut self, disabled: bool) {
        self.mouse_cursor_change_disabled = disabled;
    }

    pub fn is_mouse_cursor_change_disabled(&self) -> bool {
        self.mouse_cursor_change_disabled
    }

    // -----------------------------------------------------------------------
    // Frames
    // -----------------------------------------------------------------------

    pub fn frames(&self) -> &FrameRegistry {
        &self.frames
    }

    pub fn main_frame(&self) -> &Frame {
        self.frames.main_frame()
    }

    pub fn focused_frame(&self) -> &Frame {
        self.frames.focused_frame()
    }

    /// Frame by id; unknown ids yield the placeholder frame.
    pub fn frame(&self, frame_id: FrameId) -> &Frame {
        self.frames.frame(frame_id)
    }

    pub fn frame_by_name(&self, name: &str) -> Option<&Frame> {
        self.frames.frame_by_name(name)
    }

    pub fn frame_handle(&self, frame_id: FrameId) -> Option<FrameHandle> {
        self.frames.handle(frame_id)
    }

    pub fn resolve_frame(&self, handle: FrameHandle) -> &Frame {
        self.frames.resolve(handle)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.frame_count()
    }

    pub fn frame_identifiers(&self) -> Vec<FrameId> {
        self.frames.frame_identifiers()
    }

    pub fn frame_names(&self) -> Vec<String> {
        self.frames.frame_names()
    }

    /// The frame a network request was issued for, created on first sight.
    pub fn frame_for_request(&mut self, request: &RequestInfo) -> FrameHandle {
        if !request.frame_id.is_valid() {
            return FrameHandle::PLACEHOLDER;
        }
        self.frames.get_or_create(
            request.frame_id,
            request.parent_frame_id,
            request.is_main_frame,
            "",
            "",
        )
    }

    // -----------------------------------------------------------------------
    // Process messages and frame commands
    // -----------------------------------------------------------------------

    /// Sends a message to the content process. Only the renderer can be
    /// targeted and the name must not be empty.
    pub fn send_process_message(&mut self, target: ProcessId, message: ProcessMessage) -> bool {
        if target != ProcessId::Renderer {
            warn!("process messages can only target the renderer");
            return false;
        }
        if message.name.is_empty() {
            warn!("process message without a name");
            return false;
        }
        if self.is_destroyed() {
            return false;
        }
        self.outbox
            .send(IpcMessage::Request(RequestParams::from_process_message(message)));
        true
    }

    /// Sends a command to a frame. With a handler the request is correlated
    /// and its id returned.
    pub fn send_command(
        &mut self,
        frame_id: FrameId,
        command: &str,
        handler: Option<ResponseHandler>,
    ) -> Result<Option<RequestId>, HostError> {
        let mut params = self.frame_request(frame_id, "execute-command")?;
        params.arguments.push(serde_json::Value::from(command));
        Ok(self.dispatch_request(params, handler))
    }

    /// Sends code for a frame to execute.
    pub fn send_code(
        &mut self,
        frame_id: FrameId,
        is_javascript: bool,
        code: &str,
        script_url: &str,
        start_line: i32,
        handler: Option<ResponseHandler>,
    ) -> Result<Option<RequestId>, HostError> {
        let mut params = self.frame_request(frame_id, "execute-code")?;
        params.arguments = vec![
            serde_json::Value::from(is_javascript),
            serde_json::Value::from(code),
            serde_json::Value::from(script_url),
            serde_json::Value::from(start_line),
        ];
        Ok(self.dispatch_request(params, handler))
    }

    pub fn execute_javascript(
        &mut self,
        frame_id: FrameId,
        code: &str,
        script_url: &str,
        start_line: i32,
    ) -> Result<(), HostError> {
        self.send_code(frame_id, true, code, script_url, start_line, None)
            .map(|_| ())
    }

    pub fn undo(&mut self, frame_id: FrameId) -> Result<(), HostError> {
        self.send_command(frame_id, "Undo", None).map(|_| ())
    }

    pub fn redo(&mut self, frame_id: FrameId) -> Result<(), HostError> {
        self.send_command(frame_id, "Redo", None).map(|_| ())
    }

    pub fn cut(&mut self, frame_id: FrameId) -> Result<(), HostError> {
        self.send_command(frame_id, "Cut", None).map(|_| ())
    }

    pub fn copy(&mut self, frame_id: FrameId) -> Result<(), HostError> {
        self.send_command(frame_id, "Copy", None).map(|_| ())
    }

    pub fn paste(&mut self, frame_id: FrameId) -> Result<(), HostError> {
        self.send_command(frame_id, "Paste", None).map(|_| ())
    }

    pub fn delete(&mut self, frame_id: FrameId) -> Result<(), HostError> {
        self.send_command(frame_id, "Delete", None).map(|_| ())
    }

    pub fn select_all(&mut self, frame_id: FrameId) -> Result<(), HostError> {
        self.send_command(frame_id, "SelectAll", None).map(|_| ())
    }

    /// Fetches the frame's HTML source. The visitor does not run if the
    /// request fails or is cancelled.
    pub fn get_source(
        &mut self,
        frame_id: FrameId,
        visitor: StringVisitor,
    ) -> Result<RequestId, HostError> {
        self.visit_string(frame_id, "GetSource", visitor)
    }

    /// Fetches the frame's display text.
    pub fn get_text(
        &mut self,
        frame_id: FrameId,
        visitor: StringVisitor,
    ) -> Result<RequestId, HostError> {
        self.visit_string(frame_id, "GetText", visitor)
    }

    fn visit_string(
        &mut self,
        frame_id: FrameId,
        command: &'static str,
        visitor: StringVisitor,
    ) -> Result<RequestId, HostError> {
        let handler: ResponseHandler = Box::new(move |outcome| match outcome {
            ResponseOutcome::Completed(response) if response.success => visitor(response.response),
            ResponseOutcome::Completed(_) => debug!("{command} failed"),
            ResponseOutcome::Cancelled => debug!("{command} cancelled"),
        });
        self.send_command(frame_id, command, Some(handler))?
            .ok_or(HostError::InvalidTarget)
    }

    fn frame_request(&self, frame_id: FrameId, name: &str) -> Result<RequestParams, HostError> {
        if self.is_destroyed() {
            return Err(HostError::Destroyed);
        }
        let target = self.frames.resolve_target(frame_id);
        if !target.is_valid() {
            debug!("no frame for target {frame_id}");
            return Err(HostError::InvalidTarget);
        }
        Ok(RequestParams::new(name, target))
    }

    fn dispatch_request(
        &mut self,
        params: RequestParams,
        handler: Option<ResponseHandler>,
    ) -> Option<RequestId> {
        match handler {
            Some(handler) => Some(
                self.responses
                    .send_request(&mut self.outbox, params, handler),
            ),
            None => {
                self.outbox.send(IpcMessage::Request(params));
                None
            }
        }
    }

    /// Number of correlated requests still waiting for a response.
    pub fn pending_request_count(&self) -> usize {
        self.responses.pending_count()
    }

    /// Number of queued outbound messages waiting for the content process.
    pub fn queued_message_count(&self) -> usize {
        self.outbox.queue().len()
    }

    // -----------------------------------------------------------------------
    // Inbound messages
    // -----------------------------------------------------------------------

    /// Routes a message from the content process. Returns false for
    /// messages the host does not handle.
    pub fn on_message_received(&mut self, message: IpcMessage) -> bool {
        if self.destruction_state() == DestructionState::Completed {
            debug!("dropping message for destroyed browser {}", self.browser_id());
            return false;
        }
        trace!("received {message:?}");
        match message {
            IpcMessage::Request(params) => self.on_request(params),
            IpcMessage::Response(params) => {
                self.responses.on_response(&mut self.outbox, params);
            }
            IpcMessage::ResponseAck { request_id } => {
                self.responses.on_response_ack(request_id);
            }
            IpcMessage::FrameIdentified {
                frame_id,
                parent_frame_id,
                is_main_frame,
                name,
            } => self.frame_identified(frame_id, parent_frame_id, is_main_frame, &name),
            IpcMessage::FrameDetached { frame_id } => self.frames.detach(frame_id),
            IpcMessage::FrameFocusChange { frame_id } => self.frames.set_focused(frame_id),
            IpcMessage::DidFinishLoad {
                frame_id,
                validated_url,
                is_main_frame,
                http_status_code,
            } => self.did_finish_load(frame_id, &validated_url, is_main_frame, http_status_code),
            IpcMessage::LoadingUrlChange { pending_url } => self.loading_url_change(&pending_url),
            IpcMessage::LoadRequest(_) => return false,
        }
        true
    }

    fn on_request(&mut self, params: RequestParams) {
        let success = if params.user_initiated {
            let message = params.to_process_message();
            self.client.clone().is_some_and(|client| {
                client.on_process_message_received(&self.handle, ProcessId::Renderer, &message)
            })
        } else {
            warn!("unhandled request {}", params.name);
            false
        };

        if !params.expect_response {
            return;
        }
        let Some(request_id) = params.request_id else {
            warn!("request {} expects a response but has no id", params.name);
            return;
        };
        let response = ResponseParams {
            request_id,
            name: params.name,
            success,
            response: String::new(),
            expect_response_ack: false,
        };
        self.responses
            .send_response(&mut self.outbox, response, None);
    }

    // -----------------------------------------------------------------------
    // Zoom and find
    // -----------------------------------------------------------------------

    pub fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    /// Changes the zoom level. Non-finite levels are rejected.
    pub fn set_zoom_level(&mut self, level: f64) -> bool {
        if !level.is_finite() {
            warn!("rejecting zoom level {level}");
            return false;
        }
        self.zoom_level = level;
        self.outbox.bridge().set_zoom_level(level);
        true
    }

    pub fn find(
        &mut self,
        identifier: i32,
        search_text: &str,
        forward: bool,
        match_case: bool,
        find_next: bool,
    ) {
        if search_text.is_empty() {
            return;
        }
        self.outbox.bridge().find(FindRequest {
            identifier,
            search_text: search_text.to_string(),
            forward,
            match_case,
            find_next,
        });
    }

    pub fn stop_finding(&mut self, clear_selection: bool) {
        self.outbox.bridge().stop_finding(clear_selection);
    }

    // -----------------------------------------------------------------------
    // View and platform
    // -----------------------------------------------------------------------

    pub fn was_resized(&mut self) {
        self.outbox.bridge().was_resized();
    }

    pub fn was_hidden(&mut self, hidden: bool) {
        if !self.window_info.windowless {
            debug!("was_hidden only applies to windowless browsers");
            return;
        }
        self.outbox.bridge().was_hidden(hidden);
    }

    pub fn notify_screen_info_changed(&mut self) {
        self.outbox.bridge().notify_screen_info_changed();
    }

    /// Resizes the native window.
    pub fn resize(&mut self, width: u32, height: u32) {
        let size = PhysicalSize::new(width, height);
        self.window_info.size = size;
        self.platform.resize(size);
        self.outbox.bridge().was_resized();
    }

    pub fn start_download(&mut self, url: &str) -> Result<(), HostError> {
        let url = Url::parse(url).map_err(|_| HostError::InvalidUrl(url.to_string()))?;
        self.outbox.bridge().start_download(&url);
        Ok(())
    }

    pub fn print(&mut self) {
        self.outbox.bridge().print();
    }

    /// Opens `text` in the platform's text viewer.
    pub fn view_text(&mut self, text: &str) -> bool {
        self.platform.view_text(text)
    }

    /// Hands an external-protocol URL to the platform if the request
    /// handler allows it.
    pub fn handle_external_protocol(&mut self, url: &str) -> Result<bool, HostError> {
        let url = Url::parse(url).map_err(|_| HostError::InvalidUrl(url.to_string()))?;
        let mut allow = false;
        let client = self.client.clone();
        if let Some(handler) = client.as_deref().and_then(|c| c.request_handler()) {
            handler.on_protocol_execution(&self.handle, url.as_str(), &mut allow);
        }
        if allow {
            self.platform.handle_external_protocol(&url);
        }
        Ok(allow)
    }

    fn is_destroyed(&self) -> bool {
        self.destruction.state() == DestructionState::Completed
    }
}

impl Drop for BrowserHost {
    fn drop(&mut self) {
        if !self.is_destroyed() {
            debug!("browser {} dropped before destruction completed", self.browser_id());
            self.destroy_browser();
        }
    }
}
