/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Correlates requests sent to the content process with their responses.
//!
//! There is no timeout: a request without a matching response stays
//! registered until [`ResponseManager::cancel_all`] runs on process loss or
//! teardown.

use std::collections::HashMap;
use std::fmt;

use log::{debug, trace, warn};

use crate::ipc::{IpcMessage, RequestParams, ResponseParams};
use crate::queue::MessageSink;
use crate::types::RequestId;

/// What a response handler receives.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome {
    Completed(ResponseParams),
    /// The peer went away before answering.
    Cancelled,
}

pub type ResponseHandler = Box<dyn FnOnce(ResponseOutcome)>;

/// Runs when the peer acknowledges a response we sent.
pub type AckHandler = Box<dyn FnOnce()>;

pub struct ResponseManager {
    next_request_id: i32,
    handlers: HashMap<RequestId, ResponseHandler>,
    awaiting_ack: HashMap<RequestId, Option<AckHandler>>,
}

impl fmt::Debug for ResponseManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseManager")
            .field("next_request_id", &self.next_request_id)
            .field("pending", &self.handlers.len())
            .field("awaiting_ack", &self.awaiting_ack.len())
            .finish()
    }
}

impl Default for ResponseManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseManager {
    pub fn new() -> Self {
        Self {
            next_request_id: 0,
            handlers: HashMap::new(),
            awaiting_ack: HashMap::new(),
        }
    }

    fn allocate_id(&mut self) -> RequestId {
        let id = RequestId(self.next_request_id);
        self.next_request_id = self.next_request_id.checked_add(1).unwrap_or(0);
        id
    }

    /// Registers `handler` under a fresh id and transmits the request.
    pub fn send_request(
        &mut self,
        sink: &mut dyn MessageSink,
        mut params: RequestParams,
        handler: ResponseHandler,
    ) -> RequestId {
        let id = self.allocate_id();
        params.request_id = Some(id);
        params.expect_response = true;
        self.handlers.insert(id, handler);
        trace!("request {id} ({}) registered", params.name);
        sink.send(IpcMessage::Request(params));
        id
    }

    /// Runs and removes the handler for a response, then acknowledges it.
    ///
    /// Returns false when no handler is registered (late, duplicate or
    /// cancelled); such responses are discarded.
    pub fn on_response(&mut self, sink: &mut dyn MessageSink, params: ResponseParams) -> bool {
        let request_id = params.request_id;
        let Some(handler) = self.handlers.remove(&request_id) else {
            debug!("discarding response for unknown request {request_id}");
            return false;
        };
        handler(ResponseOutcome::Completed(params));
        sink.send(IpcMessage::ResponseAck { request_id });
        true
    }

    /// Transmits a response to a peer request. With `expect_response_ack`
    /// set, the response is remembered until [`Self::on_response_ack`].
    pub fn send_response(
        &mut self,
        sink: &mut dyn MessageSink,
        params: ResponseParams,
        on_ack: Option<AckHandler>,
    ) {
        if params.expect_response_ack {
            self.awaiting_ack.insert(params.request_id, on_ack);
        }
        sink.send(IpcMessage::Response(params));
    }

    /// Clears the bookkeeping of a response the peer acknowledged.
    pub fn on_response_ack(&mut self, request_id: RequestId) -> bool {
        match self.awaiting_ack.remove(&request_id) {
            Some(on_ack) => {
                if let Some(on_ack) = on_ack {
                    on_ack();
                }
                true
            }
            None => {
                debug!("discarding ack for unknown response {request_id}");
                false
            }
        }
    }

    /// Cancels every outstanding request and forgets pending acks. Returns
    /// the number of handlers cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.handlers.len();
        if cancelled > 0 {
            warn!("cancelling {cancelled} outstanding requests");
        }
        for (_, handler) in self.handlers.drain() {
            handler(ResponseOutcome::Cancelled);
        }
        self.awaiting_ack.clear();
        cancelled
    }

    /// Number of requests still waiting for a response.
    pub fn pending_count(&self) -> usize {
        self.handlers.len()
    }

    /// Number of sent responses still waiting for an ack.
    pub fn awaiting_ack_count(&self) -> usize {
        self.awaiting_ack.len()
    }
}

impl Drop for ResponseManager {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
