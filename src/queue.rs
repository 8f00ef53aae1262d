/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Outbound message buffering until the content process is ready.
//!
//! Messages are held here rather than by the bridge so that they arrive
//! after the content-side observer for this view exists.

use std::collections::VecDeque;

use log::{debug, trace};

use crate::bridge::ContentProcessBridge;
use crate::ipc::IpcMessage;

/// Destination for outbound IPC messages.
pub trait MessageSink {
    fn send(&mut self, message: IpcMessage);
}

/// FIFO buffer that is active until the peer signals readiness.
#[derive(Debug)]
pub struct MessageQueue<T> {
    messages: VecDeque<T>,
    queueing: bool,
}

impl<T> Default for MessageQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MessageQueue<T> {
    /// A queue in queueing mode: the peer is not ready yet.
    pub fn new() -> Self {
        Self {
            messages: VecDeque::new(),
            queueing: true,
        }
    }

    pub fn is_queueing(&self) -> bool {
        self.queueing
    }

    /// Offers a message. Returns it back when the queue is not buffering and
    /// the caller should transmit it directly.
    pub fn offer(&mut self, message: T) -> Option<T> {
        if self.queueing {
            self.messages.push_back(message);
            None
        } else {
            Some(message)
        }
    }

    /// Turns queueing off and hands every buffered message to `deliver` in
    /// enqueue order.
    pub fn flush(&mut self, mut deliver: impl FnMut(T)) {
        self.queueing = false;
        while let Some(message) = self.messages.pop_front() {
            deliver(message);
        }
    }

    /// Turns queueing back on, e.g. while a replacement peer starts.
    pub fn rearm(&mut self) {
        self.queueing = true;
    }

    /// Drops every buffered message without delivering it.
    pub fn clear(&mut self) -> usize {
        let dropped = self.messages.len();
        self.messages.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// The bridge plus the pre-ready queue in front of it.
pub struct Outbox {
    bridge: Box<dyn ContentProcessBridge>,
    queue: MessageQueue<IpcMessage>,
}

impl Outbox {
    pub fn new(bridge: Box<dyn ContentProcessBridge>) -> Self {
        Self {
            bridge,
            queue: MessageQueue::new(),
        }
    }

    pub fn bridge(&mut self) -> &mut dyn ContentProcessBridge {
        self.bridge.as_mut()
    }

    pub fn queue(&self) -> &MessageQueue<IpcMessage> {
        &self.queue
    }

    /// Peer is ready: deliver everything buffered, then send directly.
    pub fn flush(&mut self) {
        let bridge = &mut self.bridge;
        let pending = self.queue.len();
        self.queue.flush(|message| bridge.send(message));
        debug!("content process ready, flushed {pending} queued messages");
    }

    pub fn rearm(&mut self) {
        self.queue.rearm();
    }

    pub fn clear(&mut self) -> usize {
        self.queue.clear()
    }
}

impl MessageSink for Outbox {
    fn send(&mut self, message: IpcMessage) {
        match self.queue.offer(message) {
            Some(message) => {
                trace!("sending {message:?}");
                self.bridge.send(message);
            }
            None => trace!("queued message until the content process is ready"),
        }
    }
}
