/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Single-slot handoff between the role that decides and the role that acts.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::client::Client;
use crate::types::{BrowserSettings, WindowInfo, lock};

/// Holds at most one value. Setting while occupied fails; the slot empties
/// only through [`PendingSlot::take`].
pub struct PendingSlot<T> {
    value: Mutex<Option<T>>,
}

impl<T> Default for PendingSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for PendingSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingSlot")
            .field("pending", &self.is_pending())
            .finish()
    }
}

impl<T> PendingSlot<T> {
    pub fn new() -> Self {
        Self {
            value: Mutex::new(None),
        }
    }

    /// Stores `value` if the slot is empty; otherwise hands it back.
    pub fn set(&self, value: T) -> Result<(), T> {
        let mut slot = lock(&self.value);
        if slot.is_some() {
            return Err(value);
        }
        *slot = Some(value);
        Ok(())
    }

    /// Takes the value and empties the slot.
    pub fn take(&self) -> Option<T> {
        lock(&self.value).take()
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.value).is_some()
    }
}

/// Window parameters for a popup between the "should create" decision and
/// the creation of its view.
#[derive(Clone)]
pub struct PendingPopupInfo {
    pub window_info: WindowInfo,
    pub settings: BrowserSettings,
    pub client: Option<Arc<dyn Client>>,
}

impl fmt::Debug for PendingPopupInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingPopupInfo")
            .field("window_info", &self.window_info)
            .field("settings", &self.settings)
            .field("has_client", &self.client.is_some())
            .finish()
    }
}
