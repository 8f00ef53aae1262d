/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Shared public types used across all layers.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use dpi::PhysicalSize;
use serde::{Deserialize, Serialize};
use url::Url;

/// Locks `mutex`, recovering the data if a previous holder panicked.
///
/// Everything guarded in this crate is plain state that stays consistent
/// across a panic, so poisoning is not treated as fatal.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Identifier of one frame in the content process's frame tree.
///
/// Ids assigned by the content process are non-negative. The negative
/// constants are targets and sentinels understood by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(pub i64);

impl FrameId {
    /// Targets whichever frame is currently designated main.
    pub const MAIN: FrameId = FrameId(-1);
    /// Targets whichever frame currently has focus.
    pub const FOCUSED: FrameId = FrameId(-2);
    /// No frame is known.
    pub const UNSPECIFIED: FrameId = FrameId(-3);

    /// Returns true for ids assigned by the content process.
    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FrameId::MAIN => write!(f, "main"),
            FrameId::FOCUSED => write!(f, "focused"),
            FrameId::UNSPECIFIED => write!(f, "unspecified"),
            FrameId(id) => write!(f, "{id}"),
        }
    }
}

/// Identifier of a correlated request, unique per correlator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub i32);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Process a message is addressed to or originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessId {
    Browser,
    Renderer,
}

/// A named message with JSON arguments exchanged with the content process.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessMessage {
    pub name: String,
    pub arguments: Vec<serde_json::Value>,
}

impl ProcessMessage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    pub fn with_arguments(name: impl Into<String>, arguments: Vec<serde_json::Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Why the content process went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationStatus {
    NormalTermination,
    AbnormalTermination,
    ProcessWasKilled,
    ProcessCrashed,
}

/// What caused a focus request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusSource {
    /// Focus follows a navigation.
    Navigation,
    /// Focus was requested by the system or the embedder.
    System,
}

/// Opaque native window handle owned by the platform collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WindowHandle(pub usize);

/// Window placement for a browser view.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowInfo {
    /// Render off-screen without a native window (default: false).
    pub windowless: bool,
    /// Parent window to embed into (default: none).
    pub parent: Option<WindowHandle>,
    /// Initial view size in physical pixels (default: 800x600).
    pub size: PhysicalSize<u32>,
    /// Composite over a transparent background (default: false).
    pub transparent: bool,
}

impl Default for WindowInfo {
    fn default() -> Self {
        Self {
            windowless: false,
            parent: None,
            size: PhysicalSize::new(800, 600),
            transparent: false,
        }
    }
}

/// Per-browser settings.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserSettings {
    /// Encoding used when a document declares none (default: "ISO-8859-1").
    pub default_encoding: String,
    /// Run page script (default: true).
    pub javascript: bool,
    /// Allow page script to access the clipboard (default: false).
    pub javascript_access_clipboard: bool,
    /// Load plugins (default: true).
    pub plugins: bool,
    /// Load images (default: true).
    pub images: bool,
    /// Zoom level applied when the view is created (default: 0.0).
    pub initial_zoom_level: f64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            default_encoding: "ISO-8859-1".to_string(),
            javascript: true,
            javascript_access_clipboard: false,
            plugins: true,
            images: true,
            initial_zoom_level: 0.0,
        }
    }
}

/// Volatile navigation flags shared between roles.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NavigationState {
    pub is_loading: bool,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub has_document: bool,
    /// URL currently loading (or loaded) in the main frame.
    pub loading_url: Option<Url>,
}

#[derive(Debug, Default)]
struct RenderIds {
    views: HashSet<(i32, i32)>,
    frames: HashSet<(i32, i32)>,
}

/// Immutable browser identity plus the render routing ids that belong to it.
///
/// The routing id sets are written on the UI role and read by registry
/// lookups from any role, so they sit behind their own lock.
#[derive(Debug)]
pub struct BrowserInfo {
    browser_id: i32,
    is_popup: bool,
    is_windowless: bool,
    render_ids: Mutex<RenderIds>,
}

impl BrowserInfo {
    pub(crate) fn new(browser_id: i32, is_popup: bool, is_windowless: bool) -> Self {
        Self {
            browser_id,
            is_popup,
            is_windowless,
            render_ids: Mutex::new(RenderIds::default()),
        }
    }

    pub fn browser_id(&self) -> i32 {
        self.browser_id
    }

    pub fn is_popup(&self) -> bool {
        self.is_popup
    }

    pub fn is_windowless(&self) -> bool {
        self.is_windowless
    }

    pub fn add_render_view_id(&self, render_process_id: i32, render_routing_id: i32) {
        lock(&self.render_ids)
            .views
            .insert((render_process_id, render_routing_id));
    }

    pub fn remove_render_view_id(&self, render_process_id: i32, render_routing_id: i32) {
        lock(&self.render_ids)
            .views
            .remove(&(render_process_id, render_routing_id));
    }

    pub fn is_render_view_match(&self, render_process_id: i32, render_routing_id: i32) -> bool {
        lock(&self.render_ids)
            .views
            .contains(&(render_process_id, render_routing_id))
    }

    pub fn add_render_frame_id(&self, render_process_id: i32, render_routing_id: i32) {
        lock(&self.render_ids)
            .frames
            .insert((render_process_id, render_routing_id));
    }

    pub fn remove_render_frame_id(&self, render_process_id: i32, render_routing_id: i32) {
        lock(&self.render_ids)
            .frames
            .remove(&(render_process_id, render_routing_id));
    }

    pub fn is_render_frame_match(&self, render_process_id: i32, render_routing_id: i32) -> bool {
        lock(&self.render_ids)
            .frames
            .contains(&(render_process_id, render_routing_id))
    }
}

/// Identity of a network request, as seen by the IO role.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestInfo {
    pub render_process_id: i32,
    pub render_frame_id: i32,
    pub frame_id: FrameId,
    pub parent_frame_id: FrameId,
    pub is_main_frame: bool,
}

/// A console message emitted by the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsoleMessage {
    pub level: i32,
    pub message: String,
    pub source: String,
    pub line: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChooserMode {
    Open,
    OpenMultiple,
    Save,
}

/// Parameters of a file chooser dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct FileChooserParams {
    pub mode: FileChooserMode,
    pub title: String,
    pub default_file_name: PathBuf,
    /// MIME types or extensions the dialog should offer.
    pub accept_types: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsDialogType {
    Alert,
    Confirm,
    Prompt,
}

/// Parameters of a JavaScript alert/confirm/prompt dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct JsDialogParams {
    pub origin_url: String,
    pub dialog_type: JsDialogType,
    pub message_text: String,
    pub default_prompt_text: String,
}

/// Parameters of a context menu request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContextMenuParams {
    pub x: i32,
    pub y: i32,
    pub link_url: String,
    pub selection_text: String,
    pub is_editable: bool,
}

/// Errors that can occur during host operations.
#[derive(Debug)]
pub enum HostError {
    /// The platform collaborator could not create the native window.
    CreateWindowFailed,
    /// A URL could not be parsed, even after fix-up.
    InvalidUrl(String),
    /// The browser is closing or already destroyed.
    Destroyed,
    /// Internal channel was closed (UI thread wrapper).
    ChannelClosed,
    /// Failed to initialize the host on its UI thread.
    InitFailed(String),
    /// The operation does not apply to the requested target.
    InvalidTarget,
    /// An input event failed validation.
    InvalidInput(&'static str),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::CreateWindowFailed => write!(f, "failed to create the native window"),
            HostError::InvalidUrl(url) => write!(f, "invalid URL: {url}"),
            HostError::Destroyed => write!(f, "browser is being destroyed"),
            HostError::ChannelClosed => write!(f, "internal channel closed"),
            HostError::InitFailed(msg) => write!(f, "initialization failed: {msg}"),
            HostError::InvalidTarget => write!(f, "invalid target"),
            HostError::InvalidInput(reason) => write!(f, "invalid input event: {reason}"),
        }
    }
}

impl std::error::Error for HostError {}
