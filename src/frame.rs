/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Frame registry: maps content-process frame ids to frames.
//!
//! Frames live in an arena owned by the registry. They are never removed
//! while the browser is alive: a frame that goes away in the content process
//! is only marked detached, because the embedder may still hold its handle.

use std::collections::HashMap;

use log::{debug, error, trace};

use crate::types::FrameId;

/// One frame (main or sub) of the content process's frame tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    id: FrameId,
    parent_id: FrameId,
    name: String,
    url: String,
    is_main: bool,
    attached: bool,
}

impl Frame {
    fn new(id: FrameId, parent_id: FrameId, is_main: bool, name: String, url: String) -> Self {
        Self {
            id,
            parent_id,
            name,
            url,
            is_main,
            attached: true,
        }
    }

    pub fn id(&self) -> FrameId {
        self.id
    }

    /// Parent frame id, or [`FrameId::UNSPECIFIED`] for the main frame or
    /// when the parent is not known yet.
    pub fn parent_id(&self) -> FrameId {
        self.parent_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last URL known for this frame (may be empty).
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_main(&self) -> bool {
        self.is_main
    }

    /// False once the content-process frame has gone away.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// True for the identifier-less placeholder frame.
    pub fn is_placeholder(&self) -> bool {
        self.id == FrameId::UNSPECIFIED
    }
}

/// Stable reference to a frame in a [`FrameRegistry`].
///
/// Two handles compare equal exactly when they refer to the same frame
/// instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle {
    id: FrameId,
    slot: usize,
}

impl FrameHandle {
    /// The handle of the placeholder frame.
    pub const PLACEHOLDER: FrameHandle = FrameHandle {
        id: FrameId::UNSPECIFIED,
        slot: usize::MAX,
    };

    pub fn id(&self) -> FrameId {
        self.id
    }

    pub fn is_placeholder(&self) -> bool {
        self.slot == usize::MAX
    }
}

/// Frame registry owned by the browser host. UI role only.
#[derive(Debug)]
pub struct FrameRegistry {
    frames: Vec<Frame>,
    index: HashMap<FrameId, usize>,
    main_frame_id: FrameId,
    focused_frame_id: FrameId,
    placeholder: Frame,
}

impl Default for FrameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRegistry {
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            index: HashMap::new(),
            main_frame_id: FrameId::UNSPECIFIED,
            focused_frame_id: FrameId::UNSPECIFIED,
            placeholder: Frame::new(
                FrameId::UNSPECIFIED,
                FrameId::UNSPECIFIED,
                true,
                String::new(),
                String::new(),
            ),
        }
    }

    /// Returns the frame for `frame_id`, creating it on first reference.
    ///
    /// An existing frame has its name, url and parent refreshed from any
    /// non-empty/specified argument. When `is_main` is set the frame becomes
    /// the designated main frame. Invalid ids yield the placeholder.
    pub fn get_or_create(
        &mut self,
        frame_id: FrameId,
        parent_frame_id: FrameId,
        is_main: bool,
        name: &str,
        url: &str,
    ) -> FrameHandle {
        if !frame_id.is_valid() {
            error!("get_or_create called with invalid frame id {frame_id}");
            debug_assert!(frame_id.is_valid(), "invalid frame id {frame_id}");
            return FrameHandle::PLACEHOLDER;
        }

        let slot = match self.index.get(&frame_id) {
            Some(&slot) => {
                let frame = &mut self.frames[slot];
                if !name.is_empty() && frame.name != name {
                    frame.name = name.to_string();
                }
                if !url.is_empty() && frame.url != url {
                    frame.url = url.to_string();
                }
                if parent_frame_id != FrameId::UNSPECIFIED && frame.parent_id != parent_frame_id {
                    frame.parent_id = parent_frame_id;
                }
                slot
            }
            None => {
                let slot = self.frames.len();
                debug!("frame {frame_id} created (parent {parent_frame_id}, main {is_main})");
                self.frames.push(Frame::new(
                    frame_id,
                    parent_frame_id,
                    is_main,
                    name.to_string(),
                    url.to_string(),
                ));
                self.index.insert(frame_id, slot);
                slot
            }
        };

        if is_main && self.main_frame_id != frame_id {
            if let Some(&old) = self.index.get(&self.main_frame_id) {
                self.frames[old].is_main = false;
            }
            self.main_frame_id = frame_id;
        }
        if is_main {
            self.frames[slot].is_main = true;
        }

        FrameHandle { id: frame_id, slot }
    }

    /// Marks the frame detached in place. Unknown ids are ignored.
    pub fn detach(&mut self, frame_id: FrameId) {
        match self.index.get(&frame_id) {
            Some(&slot) => {
                debug!("frame {frame_id} detached");
                self.frames[slot].attached = false;
            }
            None => trace!("detach of unknown frame {frame_id} ignored"),
        }
    }

    /// Detaches every frame, including the placeholder.
    pub fn detach_all(&mut self) {
        for frame in &mut self.frames {
            frame.attached = false;
        }
        self.placeholder.attached = false;
    }

    /// Sets the focused frame. The id need not be known yet: a frame created
    /// later under this id becomes the focused frame.
    pub fn set_focused(&mut self, frame_id: FrameId) {
        self.focused_frame_id = frame_id;
    }

    pub fn main_frame_id(&self) -> FrameId {
        self.main_frame_id
    }

    pub fn focused_frame_id(&self) -> FrameId {
        self.focused_frame_id
    }

    /// Resolves a handle. Handles from another registry resolve to the
    /// placeholder.
    pub fn resolve(&self, handle: FrameHandle) -> &Frame {
        match self.frames.get(handle.slot) {
            Some(frame) if frame.id == handle.id => frame,
            _ => &self.placeholder,
        }
    }

    /// Returns the handle for a known id, resolving [`FrameId::MAIN`] and
    /// [`FrameId::FOCUSED`].
    pub fn handle(&self, frame_id: FrameId) -> Option<FrameHandle> {
        let frame_id = self.resolve_target(frame_id);
        self.index
            .get(&frame_id)
            .map(|&slot| FrameHandle { id: frame_id, slot })
    }

    /// Looks up a frame by id, falling back to the placeholder.
    pub fn frame(&self, frame_id: FrameId) -> &Frame {
        let frame_id = self.resolve_target(frame_id);
        self.index
            .get(&frame_id)
            .map_or(&self.placeholder, |&slot| &self.frames[slot])
    }

    pub fn main_frame(&self) -> &Frame {
        self.frame(FrameId::MAIN)
    }

    /// The focused frame. With no focus designation this is the main frame;
    /// a designation that names an unknown frame yields the placeholder.
    pub fn focused_frame(&self) -> &Frame {
        self.frame(FrameId::FOCUSED)
    }

    /// Looks up a frame by name, preferring attached frames.
    pub fn frame_by_name(&self, name: &str) -> Option<&Frame> {
        let mut detached = None;
        for frame in self.frames.iter().filter(|f| f.name == name) {
            if frame.attached {
                return Some(frame);
            }
            detached.get_or_insert(frame);
        }
        detached
    }

    /// Number of attached frames.
    pub fn frame_count(&self) -> usize {
        self.frames.iter().filter(|f| f.attached).count()
    }

    pub fn frame_identifiers(&self) -> Vec<FrameId> {
        self.frames
            .iter()
            .filter(|f| f.attached)
            .map(|f| f.id)
            .collect()
    }

    pub fn frame_names(&self) -> Vec<String> {
        self.frames
            .iter()
            .filter(|f| f.attached)
            .map(|f| f.name.clone())
            .collect()
    }

    /// Maps the [`FrameId::MAIN`]/[`FrameId::FOCUSED`] targets to concrete ids.
    pub fn resolve_target(&self, frame_id: FrameId) -> FrameId {
        match frame_id {
            FrameId::MAIN => self.main_frame_id,
            FrameId::FOCUSED if self.focused_frame_id == FrameId::UNSPECIFIED => {
                self.main_frame_id
            }
            FrameId::FOCUSED => self.focused_frame_id,
            other => other,
        }
    }
}
