/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Messages exchanged with the content process.
//!
//! The encoding on the wire belongs to the bridge; these are the shapes the
//! host speaks. Every variant is routed to the view's routing id by the
//! bridge.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::{FrameId, ProcessMessage, RequestId};

/// A request travelling in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestParams {
    /// Command or message name, e.g. `execute-command`.
    pub name: String,
    pub arguments: Vec<serde_json::Value>,
    /// Frame the request targets.
    pub frame_id: FrameId,
    /// Set when a response is expected.
    pub request_id: Option<RequestId>,
    pub expect_response: bool,
    /// True for embedder-level process messages, false for internal commands.
    pub user_initiated: bool,
}

impl RequestParams {
    pub fn new(name: impl Into<String>, frame_id: FrameId) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            frame_id,
            request_id: None,
            expect_response: false,
            user_initiated: false,
        }
    }

    /// A user-initiated request carrying a process message.
    pub fn from_process_message(message: ProcessMessage) -> Self {
        Self {
            name: message.name,
            arguments: message.arguments,
            frame_id: FrameId::UNSPECIFIED,
            request_id: None,
            expect_response: false,
            user_initiated: true,
        }
    }

    pub fn to_process_message(&self) -> ProcessMessage {
        ProcessMessage::with_arguments(self.name.clone(), self.arguments.clone())
    }
}

/// The answer to a [`RequestParams`] with `expect_response` set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseParams {
    pub request_id: RequestId,
    pub name: String,
    pub success: bool,
    pub response: String,
    /// Asks the receiver to confirm delivery with a response ack.
    pub expect_response_ack: bool,
}

/// Navigation of a frame performed by the content process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigateParams {
    pub frame_id: FrameId,
    pub url: Url,
    pub method: String,
    pub referrer: Option<Url>,
    pub headers: String,
    pub upload_data: Option<Vec<u8>>,
}

impl NavigateParams {
    pub fn get(frame_id: FrameId, url: Url) -> Self {
        Self {
            frame_id,
            url,
            method: "GET".to_string(),
            referrer: None,
            headers: String::new(),
            upload_data: None,
        }
    }
}

/// Every message the host sends to or receives from the content process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum IpcMessage {
    Request(RequestParams),
    Response(ResponseParams),
    ResponseAck {
        request_id: RequestId,
    },
    /// Host to content: navigate a frame.
    LoadRequest(NavigateParams),
    /// Content to host: a frame announced its identity.
    FrameIdentified {
        frame_id: FrameId,
        parent_frame_id: FrameId,
        is_main_frame: bool,
        name: String,
    },
    /// Content to host: a frame went away.
    FrameDetached {
        frame_id: FrameId,
    },
    /// Content to host: focus moved to a frame.
    FrameFocusChange {
        frame_id: FrameId,
    },
    /// Content to host: a frame finished loading.
    DidFinishLoad {
        frame_id: FrameId,
        validated_url: String,
        is_main_frame: bool,
        http_status_code: i32,
    },
    /// Content to host: the main frame's pending URL changed.
    LoadingUrlChange {
        pending_url: String,
    },
}
