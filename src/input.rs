/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Input events delivered by the embedder.

use dpi::LogicalPosition;

/// Keyboard and mouse modifier flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Modifiers(pub u32);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CAPS_LOCK_ON: Modifiers = Modifiers(1 << 0);
    pub const SHIFT_DOWN: Modifiers = Modifiers(1 << 1);
    pub const CONTROL_DOWN: Modifiers = Modifiers(1 << 2);
    pub const ALT_DOWN: Modifiers = Modifiers(1 << 3);
    pub const LEFT_MOUSE_BUTTON: Modifiers = Modifiers(1 << 4);
    pub const MIDDLE_MOUSE_BUTTON: Modifiers = Modifiers(1 << 5);
    pub const RIGHT_MOUSE_BUTTON: Modifiers = Modifiers(1 << 6);
    pub const COMMAND_DOWN: Modifiers = Modifiers(1 << 7);

    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    RawKeyDown,
    KeyDown,
    KeyUp,
    Char,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    pub kind: KeyEventKind,
    pub modifiers: Modifiers,
    pub windows_key_code: i32,
    pub native_key_code: i32,
    pub is_system_key: bool,
    /// Character produced by the key, required for [`KeyEventKind::Char`].
    pub character: Option<char>,
    pub unmodified_character: Option<char>,
}

impl KeyEvent {
    pub fn new(kind: KeyEventKind, windows_key_code: i32) -> Self {
        Self {
            kind,
            modifiers: Modifiers::NONE,
            windows_key_code,
            native_key_code: 0,
            is_system_key: false,
            character: None,
            unmodified_character: None,
        }
    }

    pub fn char(character: char) -> Self {
        Self {
            character: Some(character),
            unmodified_character: Some(character),
            ..Self::new(KeyEventKind::Char, character as i32)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    /// Position relative to the view, in logical pixels.
    pub position: LogicalPosition<i32>,
    pub modifiers: Modifiers,
}

impl MouseEvent {
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            position: LogicalPosition::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// An input event on its way to the content view.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key(KeyEvent),
    MouseClick {
        event: MouseEvent,
        button: MouseButton,
        mouse_up: bool,
        click_count: i32,
    },
    MouseMove {
        event: MouseEvent,
        mouse_leave: bool,
    },
    MouseWheel {
        event: MouseEvent,
        delta_x: i32,
        delta_y: i32,
    },
}

impl InputEvent {
    /// Checks that the event means something before it is translated and
    /// forwarded.
    pub fn validate(&self) -> Result<(), &'static str> {
        match self {
            InputEvent::Key(key) if key.kind == KeyEventKind::Char && key.character.is_none() => {
                Err("char event without a character")
            }
            InputEvent::MouseClick { click_count, .. } if *click_count < 1 => {
                Err("click count must be at least 1")
            }
            InputEvent::MouseWheel {
                delta_x: 0,
                delta_y: 0,
                ..
            } => Err("wheel event without movement"),
            _ => Ok(()),
        }
    }
}
