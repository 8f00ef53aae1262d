/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Browser teardown state machine. UI role only, so no lock.

use log::{debug, error};

/// Teardown progress, ordered: states only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum DestructionState {
    #[default]
    None,
    /// Close requested; the content process may still veto.
    Pending,
    /// Content agreed to unload; the native window is being torn down.
    Accepted,
    /// Everything owned by the browser has been released.
    Completed,
}

#[derive(Debug, Default)]
pub struct DestructionTracker {
    state: DestructionState,
}

impl DestructionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DestructionState {
        self.state
    }

    /// A close request. Forced requests skip straight to
    /// [`DestructionState::Accepted`].
    ///
    /// Returns false (and changes nothing) once teardown was accepted.
    pub fn request_close(&mut self, force: bool) -> bool {
        if self.state >= DestructionState::Accepted {
            return false;
        }
        let target = if force {
            DestructionState::Accepted
        } else {
            DestructionState::Pending
        };
        self.advance(target);
        true
    }

    /// The content process agreed to unload.
    pub fn accept(&mut self) -> bool {
        self.advance(DestructionState::Accepted)
    }

    /// Resources were released. Completing twice is a programming error.
    pub fn complete(&mut self) -> bool {
        if self.state == DestructionState::Completed {
            error!("browser destruction completed twice");
            debug_assert!(false, "browser destruction completed twice");
            return false;
        }
        self.advance(DestructionState::Completed)
    }

    fn advance(&mut self, target: DestructionState) -> bool {
        if target <= self.state {
            return false;
        }
        debug!("destruction state {:?} -> {:?}", self.state, target);
        self.state = target;
        true
    }
}
