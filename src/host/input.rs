/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Input delivery and focus.

use log::{trace, warn};

use super::BrowserHost;
use crate::input::{InputEvent, KeyEvent, MouseButton, MouseEvent};
use crate::types::{FocusSource, HostError};

impl BrowserHost {
    // -----------------------------------------------------------------------
    // Input events
    // -----------------------------------------------------------------------

    pub fn send_key_event(&mut self, event: KeyEvent) -> Result<(), HostError> {
        self.forward_input(InputEvent::Key(event))
    }

    pub fn send_mouse_click_event(
        &mut self,
        event: MouseEvent,
        button: MouseButton,
        mouse_up: bool,
        click_count: i32,
    ) -> Result<(), HostError> {
        self.forward_input(InputEvent::MouseClick {
            event,
            button,
            mouse_up,
            click_count,
        })
    }

    pub fn send_mouse_move_event(
        &mut self,
        event: MouseEvent,
        mouse_leave: bool,
    ) -> Result<(), HostError> {
        self.forward_input(InputEvent::MouseMove { event, mouse_leave })
    }

    pub fn send_mouse_wheel_event(
        &mut self,
        event: MouseEvent,
        delta_x: i32,
        delta_y: i32,
    ) -> Result<(), HostError> {
        self.forward_input(InputEvent::MouseWheel {
            event,
            delta_x,
            delta_y,
        })
    }

    fn forward_input(&mut self, event: InputEvent) -> Result<(), HostError> {
        if self.is_destroyed() {
            return Err(HostError::Destroyed);
        }
        event.validate().map_err(|reason| {
            warn!("dropping input event: {reason}");
            HostError::InvalidInput(reason)
        })?;
        let event = self.platform.translate_input_event(event);
        trace!("forwarding {event:?}");
        self.outbox.bridge().forward_input_event(event);
        Ok(())
    }

    /// Focus change for windowless browsers.
    pub fn send_focus_event(&mut self, set_focus: bool) {
        self.outbox.bridge().set_focus(set_focus);
    }

    pub fn send_capture_lost_event(&mut self) {
        self.outbox.bridge().capture_lost();
    }

    // -----------------------------------------------------------------------
    // Focus
    // -----------------------------------------------------------------------

    /// Gives the browser focus on behalf of the embedder.
    pub fn set_focus(&mut self, enable: bool) {
        if enable {
            self.on_set_focus(FocusSource::System);
        } else {
            self.platform.set_focus(false);
        }
    }

    /// Something asks for focus; the client may cancel.
    pub fn on_set_focus(&mut self, source: FocusSource) {
        let client = self.client.clone();
        let cancelled = client
            .as_deref()
            .and_then(|c| c.focus_handler())
            .is_some_and(|handler| handler.on_set_focus(&self.handle, source));
        if cancelled {
            trace!("focus change cancelled by the client");
            return;
        }
        self.platform.set_focus(true);
        self.outbox.bridge().set_focus(true);
    }

    /// The content view received focus.
    pub fn web_contents_focused(&mut self) {
        let client = self.client.clone();
        if let Some(handler) = client.as_deref().and_then(|c| c.focus_handler()) {
            handler.on_got_focus(&self.handle);
        }
    }

    /// Focus is leaving the page by tabbing; `reverse` for shift-tab.
    pub fn take_focus(&mut self, reverse: bool) {
        let client = self.client.clone();
        if let Some(handler) = client.as_deref().and_then(|c| c.focus_handler()) {
            handler.on_take_focus(&self.handle, !reverse);
        }
    }

    /// Records whether the focused node accepts text.
    pub fn focused_node_changed(&mut self, is_editable: bool) {
        self.focus_on_editable_field = is_editable;
    }

    pub fn is_focus_on_editable_field(&self) -> bool {
        self.focus_on_editable_field
    }

    // -----------------------------------------------------------------------
    // Keyboard routing
    // -----------------------------------------------------------------------

    /// Lets the client see a key event before the page. Returns true if the
    /// client consumed it.
    pub fn pre_handle_keyboard_event(
        &mut self,
        event: &KeyEvent,
        is_keyboard_shortcut: &mut bool,
    ) -> bool {
        let client = self.client.clone();
        client
            .as_deref()
            .and_then(|c| c.keyboard_handler())
            .is_some_and(|handler| {
                handler.on_pre_key_event(&self.handle, event, is_keyboard_shortcut)
            })
    }

    /// A key event the page left unhandled: the client, then the platform.
    pub fn handle_keyboard_event(&mut self, event: &KeyEvent) {
        let client = self.client.clone();
        let handled = client
            .as_deref()
            .and_then(|c| c.keyboard_handler())
            .is_some_and(|handler| handler.on_key_event(&self.handle, event));
        if !handled {
            self.platform.handle_keyboard_event(event);
        }
    }
}
