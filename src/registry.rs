/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Process-wide browser registry.
//!
//! Browsers register when created and leave when their destruction
//! completes. Lookups come from either role, so one lock guards it all.

use std::sync::{Arc, LazyLock, Mutex};

use log::debug;

use crate::handle::BrowserHandle;
use crate::types::{BrowserInfo, RequestInfo, lock};

struct Registry {
    next_browser_id: i32,
    browsers: Vec<BrowserHandle>,
}

static REGISTRY: LazyLock<Mutex<Registry>> = LazyLock::new(|| {
    Mutex::new(Registry {
        next_browser_id: 1,
        browsers: Vec::new(),
    })
});

/// Allocates the identity of a new browser. Ids start at 1 and only grow.
pub fn create_browser_info(is_popup: bool, is_windowless: bool) -> Arc<BrowserInfo> {
    let mut registry = lock(&REGISTRY);
    let browser_id = registry.next_browser_id;
    registry.next_browser_id += 1;
    Arc::new(BrowserInfo::new(browser_id, is_popup, is_windowless))
}

pub(crate) fn register(browser: &BrowserHandle) {
    let mut registry = lock(&REGISTRY);
    if registry.browsers.iter().any(|b| b.is_same(browser)) {
        return;
    }
    debug!("browser {} registered", browser.browser_id());
    registry.browsers.push(browser.clone());
}

pub(crate) fn unregister(browser: &BrowserHandle) {
    let mut registry = lock(&REGISTRY);
    let before = registry.browsers.len();
    registry.browsers.retain(|b| !b.is_same(browser));
    if registry.browsers.len() != before {
        debug!("browser {} unregistered", browser.browser_id());
    }
}

fn find(predicate: impl Fn(&BrowserInfo) -> bool) -> Option<BrowserHandle> {
    lock(&REGISTRY)
        .browsers
        .iter()
        .find(|b| predicate(b.info()))
        .cloned()
}

pub fn browser_by_id(browser_id: i32) -> Option<BrowserHandle> {
    find(|info| info.browser_id() == browser_id)
}

/// The browser owning a render view.
pub fn browser_for_view(render_process_id: i32, render_routing_id: i32) -> Option<BrowserHandle> {
    find(|info| info.is_render_view_match(render_process_id, render_routing_id))
}

/// The browser owning a render frame.
pub fn browser_for_frame(render_process_id: i32, render_routing_id: i32) -> Option<BrowserHandle> {
    find(|info| info.is_render_frame_match(render_process_id, render_routing_id))
}

/// The browser a network request belongs to, if any.
pub fn browser_for_request(request: &RequestInfo) -> Option<BrowserHandle> {
    if request.render_process_id < 0 {
        return None;
    }
    browser_for_frame(request.render_process_id, request.render_frame_id)
}

/// Number of live browsers.
pub fn browser_count() -> usize {
    lock(&REGISTRY).browsers.len()
}
