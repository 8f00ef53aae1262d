/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Browser-side host for an embedded, multi-process web browser.
//!
//! Provides two layers:
//!
//! - **[`BrowserHost`]**: single-threaded core that owns one content view,
//!   its frames, its outstanding requests and its teardown. Lives on the UI
//!   role and is driven by the content process through
//!   [`ContentProcessBridge`] and by the desktop through [`PlatformWindow`].
//! - **[`HostThread`]**: thread-safe wrapper (`Send + Sync`). Spawns a UI
//!   thread running `BrowserHost` and communicates via channels.
//!
//! Any role can look browsers up through the [`registry`] and read shared
//! state through a [`BrowserHandle`]. Network requests use a
//! [`RequestContextProxy`](cookie::RequestContextProxy), whose cookie store
//! may be overridden per context.
//!
//! # Example
//!
//! ```no_run
//! use browser_host::{BrowserHost, ContentProcessBridge, HostParams, IpcMessage, PlatformWindow};
//! use browser_host::{WindowHandle, WindowInfo};
//!
//! struct Bridge;
//!
//! impl ContentProcessBridge for Bridge {
//!     fn send(&mut self, _message: IpcMessage) {}
//!     fn routing_id(&self) -> i32 { 1 }
//!     fn render_process_id(&self) -> i32 { 1 }
//! }
//!
//! struct Window;
//!
//! impl PlatformWindow for Window {
//!     fn create_window(&mut self, _info: &WindowInfo) -> bool { true }
//!     fn close_window(&mut self) {}
//!     fn window_handle(&self) -> Option<WindowHandle> { Some(WindowHandle(1)) }
//! }
//!
//! let mut params = HostParams::new(Box::new(Bridge), Box::new(Window));
//! params.url = Some("example.com".into());
//! let mut host = BrowserHost::create(params).unwrap();
//! host.render_view_ready();
//! host.close_browser(false);
//! ```

pub mod bridge;
pub mod client;
pub mod cookie;
pub mod destruction;
pub mod frame;
pub mod handle;
pub mod host;
pub mod input;
pub mod ipc;
pub mod pending;
pub mod queue;
pub mod registry;
pub mod response;
mod thread;
mod types;

pub use bridge::{ContentProcessBridge, DevToolsFrontend, FindRequest, PlatformWindow};
pub use client::Client;
pub use destruction::DestructionState;
pub use frame::{Frame, FrameHandle};
pub use handle::BrowserHandle;
pub use host::{BrowserHost, HostParams};
pub use ipc::IpcMessage;
pub use response::{ResponseHandler, ResponseOutcome};
pub use thread::HostThread;
pub use types::{
    BrowserInfo, BrowserSettings, ConsoleMessage, ContextMenuParams, FileChooserMode,
    FileChooserParams, FocusSource, FrameId, HostError, JsDialogParams, JsDialogType,
    NavigationState, ProcessId, ProcessMessage, RequestId, RequestInfo, TerminationStatus,
    WindowHandle, WindowInfo,
};
