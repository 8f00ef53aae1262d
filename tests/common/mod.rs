/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Recording doubles for the bridge, the platform window and the client.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use browser_host::client::{
    DialogHandler, DisplayHandler, FocusHandler, JsDialogHandler, KeyboardHandler,
    LifeSpanHandler, LoadHandler, RequestHandler,
};
use browser_host::input::{InputEvent, KeyEvent};
use browser_host::ipc::NavigateParams;
use browser_host::pending::PendingPopupInfo;
use browser_host::{
    BrowserHandle, BrowserHost, Client, ConsoleMessage, ContentProcessBridge, ContextMenuParams,
    DevToolsFrontend, FileChooserParams, FocusSource, Frame, HostParams, IpcMessage,
    JsDialogParams, PlatformWindow, ProcessId, ProcessMessage, TerminationStatus, WindowHandle,
    WindowInfo,
};

pub type Log = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

// ---------------------------------------------------------------------------
// Content process bridge
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct BridgeState {
    pub sent: Vec<IpcMessage>,
    pub calls: Vec<String>,
    pub navigations: Vec<NavigateParams>,
    pub inputs: Vec<InputEvent>,
    pub files_selected: Vec<Vec<PathBuf>>,
    pub needs_before_unload: bool,
}

#[derive(Clone, Default)]
pub struct RecordingBridge {
    pub state: Arc<Mutex<BridgeState>>,
}

impl RecordingBridge {
    pub fn sent(&self) -> Vec<IpcMessage> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn navigations(&self) -> Vec<NavigateParams> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn set_needs_before_unload(&self, needs: bool) {
        self.state.lock().unwrap().needs_before_unload = needs;
    }

    fn call(&self, name: impl Into<String>) {
        self.state.lock().unwrap().calls.push(name.into());
    }
}

impl ContentProcessBridge for RecordingBridge {
    fn send(&mut self, message: IpcMessage) {
        self.state.lock().unwrap().sent.push(message);
    }

    fn routing_id(&self) -> i32 {
        7
    }

    fn render_process_id(&self) -> i32 {
        3
    }

    fn load_url(&mut self, params: NavigateParams) {
        self.state.lock().unwrap().navigations.push(params);
    }

    fn go_back(&mut self) {
        self.call("go_back");
    }

    fn go_forward(&mut self) {
        self.call("go_forward");
    }

    fn reload(&mut self, ignore_cache: bool) {
        self.call(format!("reload({ignore_cache})"));
    }

    fn set_zoom_level(&mut self, level: f64) {
        self.call(format!("zoom({level})"));
    }

    fn forward_input_event(&mut self, event: InputEvent) {
        self.state.lock().unwrap().inputs.push(event);
    }

    fn set_focus(&mut self, focused: bool) {
        self.call(format!("set_focus({focused})"));
    }

    fn needs_before_unload(&self) -> bool {
        self.state.lock().unwrap().needs_before_unload
    }

    fn dispatch_before_unload(&mut self) {
        self.call("dispatch_before_unload");
    }

    fn files_selected(&mut self, paths: &[PathBuf]) {
        self.state.lock().unwrap().files_selected.push(paths.to_vec());
    }
}

// ---------------------------------------------------------------------------
// Platform window
// ---------------------------------------------------------------------------

pub struct PlatformState {
    pub calls: Vec<String>,
    pub create_succeeds: bool,
    pub file_chooser_result: Vec<PathBuf>,
    pub js_dialog_result: Option<(bool, String)>,
    pub context_menu_shown: bool,
}

impl Default for PlatformState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            create_succeeds: true,
            file_chooser_result: Vec::new(),
            js_dialog_result: None,
            context_menu_shown: true,
        }
    }
}

#[derive(Clone, Default)]
pub struct RecordingPlatform {
    pub state: Arc<Mutex<PlatformState>>,
}

impl RecordingPlatform {
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn call(&self, name: impl Into<String>) {
        self.state.lock().unwrap().calls.push(name.into());
    }
}

struct RecordingDevTools {
    platform: RecordingPlatform,
}

impl DevToolsFrontend for RecordingDevTools {
    fn focus(&mut self) {
        self.platform.call("devtools_focus");
    }

    fn close(&mut self) {
        self.platform.call("devtools_close");
    }
}

impl PlatformWindow for RecordingPlatform {
    fn create_window(&mut self, _info: &WindowInfo) -> bool {
        self.call("create_window");
        self.state.lock().unwrap().create_succeeds
    }

    fn close_window(&mut self) {
        self.call("close_window");
    }

    fn window_handle(&self) -> Option<WindowHandle> {
        Some(WindowHandle(0x42))
    }

    fn set_focus(&mut self, focused: bool) {
        self.call(format!("set_focus({focused})"));
    }

    fn run_file_chooser(&mut self, _params: &FileChooserParams) -> Vec<PathBuf> {
        self.call("run_file_chooser");
        self.state.lock().unwrap().file_chooser_result.clone()
    }

    fn run_javascript_dialog(&mut self, _params: &JsDialogParams) -> Option<(bool, String)> {
        self.call("run_javascript_dialog");
        self.state.lock().unwrap().js_dialog_result.clone()
    }

    fn run_context_menu(&mut self, _params: &ContextMenuParams) -> bool {
        self.call("run_context_menu");
        self.state.lock().unwrap().context_menu_shown
    }

    fn cancel_context_menu(&mut self) {
        self.call("cancel_context_menu");
    }

    fn handle_keyboard_event(&mut self, _event: &KeyEvent) {
        self.call("handle_keyboard_event");
    }

    fn handle_external_protocol(&mut self, url: &url::Url) {
        self.call(format!("external({url})"));
    }

    fn show_devtools(
        &mut self,
        _info: &WindowInfo,
        _client: Option<Arc<dyn Client>>,
        _settings: &browser_host::BrowserSettings,
    ) -> Option<Box<dyn DevToolsFrontend>> {
        self.call("show_devtools");
        Some(Box::new(RecordingDevTools {
            platform: self.clone(),
        }))
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Records every callback as a string and answers according to its flags.
#[derive(Default)]
pub struct RecordingClient {
    pub log: Log,
    pub cancel_popup: AtomicBool,
    pub do_close: AtomicBool,
    pub cancel_focus: AtomicBool,
    pub handle_file_dialog: AtomicBool,
    pub handle_js_dialog: AtomicBool,
    pub suppress_js_dialog: AtomicBool,
    pub allow_external_protocol: AtomicBool,
    pub handle_process_messages: AtomicBool,
    pub consume_key_events: AtomicBool,
}

impl RecordingClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<String> {
        entries(&self.log)
    }

    pub fn set(&self, flag: &AtomicBool, value: bool) {
        flag.store(value, Ordering::SeqCst);
    }

    fn record(&self, event: impl Into<String>) {
        self.log.lock().unwrap().push(event.into());
    }

    fn flag(flag: &AtomicBool) -> bool {
        flag.load(Ordering::SeqCst)
    }
}

impl Client for RecordingClient {
    fn life_span_handler(&self) -> Option<&dyn LifeSpanHandler> {
        Some(self)
    }

    fn load_handler(&self) -> Option<&dyn LoadHandler> {
        Some(self)
    }

    fn display_handler(&self) -> Option<&dyn DisplayHandler> {
        Some(self)
    }

    fn focus_handler(&self) -> Option<&dyn FocusHandler> {
        Some(self)
    }

    fn keyboard_handler(&self) -> Option<&dyn KeyboardHandler> {
        Some(self)
    }

    fn dialog_handler(&self) -> Option<&dyn DialogHandler> {
        Some(self)
    }

    fn js_dialog_handler(&self) -> Option<&dyn JsDialogHandler> {
        Some(self)
    }

    fn request_handler(&self) -> Option<&dyn RequestHandler> {
        Some(self)
    }

    fn on_process_message_received(
        &self,
        _browser: &BrowserHandle,
        source: ProcessId,
        message: &ProcessMessage,
    ) -> bool {
        self.record(format!("process_message({source:?}, {})", message.name));
        Self::flag(&self.handle_process_messages)
    }
}

impl LifeSpanHandler for RecordingClient {
    fn on_before_popup(
        &self,
        _browser: &BrowserHandle,
        _frame: &Frame,
        target_url: &str,
        _target_frame_name: &str,
        popup: &mut PendingPopupInfo,
    ) -> bool {
        self.record(format!("before_popup({target_url})"));
        popup.settings.javascript = false;
        Self::flag(&self.cancel_popup)
    }

    fn on_after_created(&self, browser: &BrowserHandle) {
        self.record(format!("after_created({})", browser.is_popup()));
    }

    fn do_close(&self, _browser: &BrowserHandle) -> bool {
        self.record("do_close");
        Self::flag(&self.do_close)
    }

    fn on_before_close(&self, _browser: &BrowserHandle) {
        self.record("before_close");
    }
}

impl LoadHandler for RecordingClient {
    fn on_loading_state_change(
        &self,
        _browser: &BrowserHandle,
        is_loading: bool,
        can_go_back: bool,
        can_go_forward: bool,
    ) {
        self.record(format!(
            "loading_state({is_loading}, {can_go_back}, {can_go_forward})"
        ));
    }

    fn on_load_start(&self, _browser: &BrowserHandle, frame: &Frame) {
        self.record(format!("load_start({})", frame.id()));
    }

    fn on_load_end(&self, _browser: &BrowserHandle, frame: &Frame, http_status_code: i32) {
        self.record(format!("load_end({}, {http_status_code})", frame.id()));
    }

    fn on_load_error(
        &self,
        _browser: &BrowserHandle,
        frame: &Frame,
        error_code: i32,
        _error_text: &str,
        failed_url: &str,
    ) {
        self.record(format!("load_error({}, {error_code}, {failed_url})", frame.id()));
    }
}

impl DisplayHandler for RecordingClient {
    fn on_address_change(&self, _browser: &BrowserHandle, frame: &Frame, url: &str) {
        self.record(format!("address_change({}, {url})", frame.id()));
    }

    fn on_title_change(&self, _browser: &BrowserHandle, title: &str) {
        self.record(format!("title({title})"));
    }

    fn on_status_message(&self, _browser: &BrowserHandle, value: &str) {
        self.record(format!("status({value})"));
    }

    fn on_console_message(&self, _browser: &BrowserHandle, message: &ConsoleMessage) -> bool {
        self.record(format!("console({})", message.message));
        true
    }
}

impl FocusHandler for RecordingClient {
    fn on_take_focus(&self, _browser: &BrowserHandle, next: bool) {
        self.record(format!("take_focus({next})"));
    }

    fn on_set_focus(&self, _browser: &BrowserHandle, source: FocusSource) -> bool {
        self.record(format!("set_focus({source:?})"));
        Self::flag(&self.cancel_focus)
    }

    fn on_got_focus(&self, _browser: &BrowserHandle) {
        self.record("got_focus");
    }
}

impl KeyboardHandler for RecordingClient {
    fn on_pre_key_event(
        &self,
        _browser: &BrowserHandle,
        _event: &KeyEvent,
        is_keyboard_shortcut: &mut bool,
    ) -> bool {
        self.record("pre_key_event");
        *is_keyboard_shortcut = true;
        false
    }

    fn on_key_event(&self, _browser: &BrowserHandle, _event: &KeyEvent) -> bool {
        self.record("key_event");
        Self::flag(&self.consume_key_events)
    }
}

impl DialogHandler for RecordingClient {
    fn on_file_dialog(&self, _browser: &BrowserHandle, _params: &FileChooserParams) -> bool {
        self.record("file_dialog");
        Self::flag(&self.handle_file_dialog)
    }
}

impl JsDialogHandler for RecordingClient {
    fn on_js_dialog(
        &self,
        _browser: &BrowserHandle,
        params: &JsDialogParams,
        suppress_message: &mut bool,
    ) -> bool {
        self.record(format!("js_dialog({})", params.message_text));
        *suppress_message = Self::flag(&self.suppress_js_dialog);
        Self::flag(&self.handle_js_dialog)
    }

    fn on_before_unload_dialog(
        &self,
        _browser: &BrowserHandle,
        _message_text: &str,
        is_reload: bool,
    ) -> bool {
        self.record(format!("before_unload_dialog({is_reload})"));
        Self::flag(&self.handle_js_dialog)
    }

    fn on_reset_dialog_state(&self, _browser: &BrowserHandle) {
        self.record("reset_dialog_state");
    }
}

impl RequestHandler for RecordingClient {
    fn on_protocol_execution(
        &self,
        _browser: &BrowserHandle,
        url: &str,
        allow_os_execution: &mut bool,
    ) {
        self.record(format!("protocol_execution({url})"));
        *allow_os_execution = Self::flag(&self.allow_external_protocol);
    }

    fn on_render_process_terminated(&self, _browser: &BrowserHandle, status: TerminationStatus) {
        self.record(format!("render_process_terminated({status:?})"));
    }

    fn on_plugin_crashed(&self, _browser: &BrowserHandle, plugin_path: &str) {
        self.record(format!("plugin_crashed({plugin_path})"));
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub struct Fixture {
    pub host: BrowserHost,
    pub bridge: RecordingBridge,
    pub platform: RecordingPlatform,
    pub client: Arc<RecordingClient>,
}

pub fn params(
    bridge: &RecordingBridge,
    platform: &RecordingPlatform,
    client: &Arc<RecordingClient>,
) -> HostParams {
    let mut params = HostParams::new(Box::new(bridge.clone()), Box::new(platform.clone()));
    params.client = Some(client.clone());
    params
}

/// A windowed browser with a recording client and no initial URL.
pub fn fixture() -> Fixture {
    fixture_with(|_| {})
}

pub fn windowless_fixture() -> Fixture {
    fixture_with(|params| params.window_info.windowless = true)
}

pub fn fixture_with(customize: impl FnOnce(&mut HostParams)) -> Fixture {
    let bridge = RecordingBridge::default();
    let platform = RecordingPlatform::default();
    let client = RecordingClient::new();
    let mut host_params = params(&bridge, &platform, &client);
    customize(&mut host_params);
    let host = BrowserHost::create(host_params).expect("browser creation");
    Fixture {
        host,
        bridge,
        platform,
        client,
    }
}
