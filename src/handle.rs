/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! `BrowserHandle`: the part of a browser that any role may touch.

use std::sync::{Arc, Mutex};

use url::Url;

use crate::pending::{PendingPopupInfo, PendingSlot};
use crate::types::{BrowserInfo, NavigationState, lock};

#[derive(Debug)]
struct SharedState {
    info: Arc<BrowserInfo>,
    navigation: Mutex<NavigationState>,
    pending_popup: PendingSlot<PendingPopupInfo>,
}

/// Cheap, cloneable reference to a browser. `Send + Sync`.
///
/// Everything reachable from here is either immutable or guarded by its own
/// lock. UI-only state stays on [`BrowserHost`](crate::BrowserHost).
#[derive(Debug, Clone)]
pub struct BrowserHandle {
    shared: Arc<SharedState>,
}

impl BrowserHandle {
    pub(crate) fn new(info: Arc<BrowserInfo>) -> Self {
        Self {
            shared: Arc::new(SharedState {
                info,
                navigation: Mutex::new(NavigationState::default()),
                pending_popup: PendingSlot::new(),
            }),
        }
    }

    pub fn browser_id(&self) -> i32 {
        self.shared.info.browser_id()
    }

    pub fn is_popup(&self) -> bool {
        self.shared.info.is_popup()
    }

    pub fn info(&self) -> &Arc<BrowserInfo> {
        &self.shared.info
    }

    /// True when both handles refer to the same browser.
    pub fn is_same(&self, other: &BrowserHandle) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    // -----------------------------------------------------------------------
    // Volatile navigation flags
    // -----------------------------------------------------------------------

    /// Consistent snapshot of all navigation flags.
    pub fn navigation_state(&self) -> NavigationState {
        lock(&self.shared.navigation).clone()
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.shared.navigation).is_loading
    }

    pub fn can_go_back(&self) -> bool {
        lock(&self.shared.navigation).can_go_back
    }

    pub fn can_go_forward(&self) -> bool {
        lock(&self.shared.navigation).can_go_forward
    }

    pub fn has_document(&self) -> bool {
        lock(&self.shared.navigation).has_document
    }

    pub fn loading_url(&self) -> Option<Url> {
        lock(&self.shared.navigation).loading_url.clone()
    }

    /// Applies `update` to the navigation flags under the lock.
    pub(crate) fn update_navigation<R>(&self, update: impl FnOnce(&mut NavigationState) -> R) -> R {
        update(&mut lock(&self.shared.navigation))
    }

    // -----------------------------------------------------------------------
    // Pending popup
    // -----------------------------------------------------------------------

    /// Stores the parameters for the next popup. Returns false if one is
    /// already pending; the caller may retry once it has been consumed.
    pub fn set_pending_popup_info(&self, info: PendingPopupInfo) -> bool {
        self.shared.pending_popup.set(info).is_ok()
    }

    /// Consumes the pending popup parameters.
    pub fn take_pending_popup_info(&self) -> Option<PendingPopupInfo> {
        self.shared.pending_popup.take()
    }

    pub fn has_pending_popup(&self) -> bool {
        self.shared.pending_popup.is_pending()
    }
}
