/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Per-request-context network state, used from the IO role.
//!
//! A [`RequestContextProxy`] shares its parent context's network primitives
//! and swaps in a [`CookieStoreProxy`], which picks the cookie store on
//! every call: the context handler's cookie manager if it supplies one,
//! otherwise the parent's shared store.

use std::fmt;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use ::cookie::Cookie;
use log::{debug, trace};
use url::Url;

use crate::types::lock;

pub type SetCookieCallback = Box<dyn FnOnce(bool) + Send>;
/// Receives a `Cookie` header line (`a=1; b=2`).
pub type GetCookiesCallback = Box<dyn FnOnce(String) + Send>;
/// Receives the number of cookies deleted.
pub type DeleteCallback = Box<dyn FnOnce(usize) + Send>;
pub type DoneCallback = Box<dyn FnOnce() + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CookieOptions {
    /// Read and write `HttpOnly` cookies (default: false).
    pub include_httponly: bool,
}

/// Asynchronous cookie storage. Callbacks may run before the call returns.
pub trait CookieStore: Send + Sync {
    fn set_cookie_with_options(
        &self,
        url: &Url,
        cookie_line: &str,
        options: &CookieOptions,
        callback: Option<SetCookieCallback>,
    );

    fn get_cookies_with_options(
        &self,
        url: &Url,
        options: &CookieOptions,
        callback: GetCookiesCallback,
    );

    fn delete_cookie(&self, url: &Url, cookie_name: &str, callback: Option<DoneCallback>);

    /// Deletes cookies created in `[begin, end)`; no `end` means no upper
    /// bound.
    fn delete_all_created_between(
        &self,
        begin: SystemTime,
        end: Option<SystemTime>,
        callback: Option<DeleteCallback>,
    );

    /// Like [`Self::delete_all_created_between`], limited to cookies sent
    /// to `url`'s host.
    fn delete_all_created_between_for_host(
        &self,
        begin: SystemTime,
        end: Option<SystemTime>,
        url: &Url,
        callback: Option<DeleteCallback>,
    );

    fn delete_session_cookies(&self, callback: Option<DeleteCallback>);
}

/// A cookie manager supplied by the embedder for one request context.
pub trait CookieManager: Send + Sync {
    fn cookie_store(&self) -> Arc<dyn CookieStore>;
}

/// Embedder hooks for a request context.
pub trait RequestContextHandler: Send + Sync {
    /// Cookie manager for this context, or `None` for the shared store.
    fn cookie_manager(&self) -> Option<Arc<dyn CookieManager>> {
        None
    }
}

pub trait HostResolver: Send + Sync {
    fn resolve(&self, host: &str) -> Vec<IpAddr>;
}

pub trait CertVerifier: Send + Sync {
    fn verify(&self, host: &str, certificate_der: &[u8]) -> bool;
}

pub trait ProxyService: Send + Sync {
    /// Proxy to use for `url`, or `None` to connect directly.
    fn proxy_for(&self, url: &Url) -> Option<Url>;
}

// ---------------------------------------------------------------------------
// Request contexts
// ---------------------------------------------------------------------------

/// The shared, global request context.
#[derive(Clone)]
pub struct RequestContext {
    pub host_resolver: Option<Arc<dyn HostResolver>>,
    pub cert_verifier: Option<Arc<dyn CertVerifier>>,
    pub proxy_service: Option<Arc<dyn ProxyService>>,
    pub cookie_store: Arc<dyn CookieStore>,
}

impl RequestContext {
    pub fn new(cookie_store: Arc<dyn CookieStore>) -> Self {
        Self {
            host_resolver: None,
            cert_verifier: None,
            proxy_service: None,
            cookie_store,
        }
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("host_resolver", &self.host_resolver.is_some())
            .field("cert_verifier", &self.cert_verifier.is_some())
            .field("proxy_service", &self.proxy_service.is_some())
            .finish_non_exhaustive()
    }
}

/// A request context that borrows everything from its parent except the
/// cookie store.
pub struct RequestContextProxy {
    host_resolver: Option<Arc<dyn HostResolver>>,
    cert_verifier: Option<Arc<dyn CertVerifier>>,
    proxy_service: Option<Arc<dyn ProxyService>>,
    cookie_store: Arc<CookieStoreProxy>,
}

impl RequestContextProxy {
    pub fn initialize(
        parent: &RequestContext,
        handler: Option<Arc<dyn RequestContextHandler>>,
    ) -> Self {
        debug!(
            "request context proxy created (custom handler: {})",
            handler.is_some()
        );
        Self {
            host_resolver: parent.host_resolver.clone(),
            cert_verifier: parent.cert_verifier.clone(),
            proxy_service: parent.proxy_service.clone(),
            cookie_store: Arc::new(CookieStoreProxy::new(parent.cookie_store.clone(), handler)),
        }
    }

    /// The proxying cookie store of this context.
    pub fn cookie_store(&self) -> Arc<dyn CookieStore> {
        self.cookie_store.clone()
    }

    pub fn host_resolver(&self) -> Option<&Arc<dyn HostResolver>> {
        self.host_resolver.as_ref()
    }

    pub fn cert_verifier(&self) -> Option<&Arc<dyn CertVerifier>> {
        self.cert_verifier.as_ref()
    }

    pub fn proxy_service(&self) -> Option<&Arc<dyn ProxyService>> {
        self.proxy_service.as_ref()
    }
}

impl fmt::Debug for RequestContextProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContextProxy")
            .field("cookie_store", &self.cookie_store)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Cookie store proxy
// ---------------------------------------------------------------------------

/// Delegates every operation to the store chosen at call time.
pub struct CookieStoreProxy {
    parent: Arc<dyn CookieStore>,
    handler: Option<Arc<dyn RequestContextHandler>>,
}

impl CookieStoreProxy {
    pub fn new(
        parent: Arc<dyn CookieStore>,
        handler: Option<Arc<dyn RequestContextHandler>>,
    ) -> Self {
        Self { parent, handler }
    }

    /// The handler's cookie manager store, else the parent's.
    pub fn resolve(&self) -> Arc<dyn CookieStore> {
        match self.handler.as_ref().and_then(|h| h.cookie_manager()) {
            Some(manager) => {
                trace!("using the context's cookie manager");
                manager.cookie_store()
            }
            None => self.parent.clone(),
        }
    }
}

impl fmt::Debug for CookieStoreProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieStoreProxy")
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl CookieStore for CookieStoreProxy {
    fn set_cookie_with_options(
        &self,
        url: &Url,
        cookie_line: &str,
        options: &CookieOptions,
        callback: Option<SetCookieCallback>,
    ) {
        self.resolve()
            .set_cookie_with_options(url, cookie_line, options, callback);
    }

    fn get_cookies_with_options(
        &self,
        url: &Url,
        options: &CookieOptions,
        callback: GetCookiesCallback,
    ) {
        self.resolve()
            .get_cookies_with_options(url, options, callback);
    }

    fn delete_cookie(&self, url: &Url, cookie_name: &str, callback: Option<DoneCallback>) {
        self.resolve().delete_cookie(url, cookie_name, callback);
    }

    fn delete_all_created_between(
        &self,
        begin: SystemTime,
        end: Option<SystemTime>,
        callback: Option<DeleteCallback>,
    ) {
        self.resolve()
            .delete_all_created_between(begin, end, callback);
    }

    fn delete_all_created_between_for_host(
        &self,
        begin: SystemTime,
        end: Option<SystemTime>,
        url: &Url,
        callback: Option<DeleteCallback>,
    ) {
        self.resolve()
            .delete_all_created_between_for_host(begin, end, url, callback);
    }

    fn delete_session_cookies(&self, callback: Option<DeleteCallback>) {
        self.resolve().delete_session_cookies(callback);
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct StoredCookie {
    name: String,
    value: String,
    /// Host for host-only cookies, else the Domain attribute without a
    /// leading dot.
    domain: String,
    host_only: bool,
    path: String,
    creation: SystemTime,
    expires: Option<SystemTime>,
    persistent: bool,
    secure: bool,
    http_only: bool,
}

impl StoredCookie {
    fn matches_host(&self, host: &str) -> bool {
        if self.host_only {
            return host == self.domain;
        }
        host == self.domain
            || host
                .strip_suffix(self.domain.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    }

    fn matches_path(&self, path: &str) -> bool {
        path == self.path
            || (path.starts_with(self.path.as_str())
                && (self.path.ends_with('/') || path[self.path.len()..].starts_with('/')))
    }

    fn is_expired(&self, now: SystemTime) -> bool {
        self.expires.is_some_and(|expires| expires <= now)
    }

    fn created_between(&self, begin: SystemTime, end: Option<SystemTime>) -> bool {
        self.creation >= begin && end.is_none_or(|end| self.creation < end)
    }
}

/// Directory of the request path, used when a cookie has no Path.
fn default_path(url: &Url) -> String {
    let path = url.path();
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(index) => path[..index].to_string(),
    }
}

/// Parses a `Set-Cookie` line. `Max-Age` wins over `Expires`; an expiry
/// beyond what `SystemTime` can hold leaves the cookie without one.
fn parse_cookie_line(url: &Url, line: &str, now: SystemTime) -> Option<StoredCookie> {
    let host = url.host_str()?.to_ascii_lowercase();
    let parsed = match Cookie::parse(line) {
        Ok(parsed) => parsed,
        Err(err) => {
            debug!("rejecting cookie line for {host}: {err}");
            return None;
        }
    };

    let mut cookie = StoredCookie {
        name: parsed.name().to_string(),
        value: parsed.value().to_string(),
        domain: host.clone(),
        host_only: true,
        path: default_path(url),
        creation: now,
        expires: None,
        persistent: parsed.max_age().is_some() || parsed.expires().is_some(),
        secure: parsed.secure().unwrap_or(false),
        http_only: parsed.http_only().unwrap_or(false),
    };

    let domain = parsed
        .domain()
        .map(|domain| domain.trim_start_matches('.').to_ascii_lowercase())
        .filter(|domain| !domain.is_empty());
    if let Some(domain) = domain {
        cookie.domain = domain;
        cookie.host_only = false;
        if !cookie.matches_host(&host) {
            debug!(
                "rejecting cookie {}: domain {} does not match {host}",
                cookie.name, cookie.domain
            );
            return None;
        }
    }
    if let Some(path) = parsed.path().filter(|path| path.starts_with('/')) {
        cookie.path = path.to_string();
    }

    cookie.expires = match (parsed.max_age(), parsed.expires_datetime()) {
        (Some(max_age), _) => expiry_after(now, max_age.whole_seconds()),
        (None, Some(at)) => expiry_at(at.unix_timestamp()),
        (None, None) => None,
    };
    Some(cookie)
}

/// `seconds` from `now`. Zero or less means already expired.
fn expiry_after(now: SystemTime, seconds: i64) -> Option<SystemTime> {
    if seconds <= 0 {
        return Some(SystemTime::UNIX_EPOCH);
    }
    let expires = now.checked_add(Duration::from_secs(seconds.unsigned_abs()));
    if expires.is_none() {
        trace!("Max-Age {seconds} out of range, cookie does not expire");
    }
    expires
}

/// An absolute expiry in Unix seconds. Dates at or before the epoch are
/// already expired.
fn expiry_at(unix_seconds: i64) -> Option<SystemTime> {
    if unix_seconds <= 0 {
        return Some(SystemTime::UNIX_EPOCH);
    }
    SystemTime::UNIX_EPOCH.checked_add(Duration::from_secs(unix_seconds.unsigned_abs()))
}

/// The default cookie store: host and path matching, `Secure` and
/// `HttpOnly` handling, session and persistent cookies, all in memory.
#[derive(Debug, Default)]
pub struct MemoryCookieStore {
    cookies: Mutex<Vec<StoredCookie>>,
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored cookies, expired ones included.
    pub fn len(&self) -> usize {
        lock(&self.cookies).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.cookies).is_empty()
    }

    fn set(&self, url: &Url, cookie_line: &str, options: &CookieOptions) -> bool {
        let now = SystemTime::now();
        let Some(mut cookie) = parse_cookie_line(url, cookie_line, now) else {
            return false;
        };
        if cookie.http_only && !options.include_httponly {
            debug!("rejecting HttpOnly cookie {} without include_httponly", cookie.name);
            return false;
        }

        let mut cookies = lock(&self.cookies);
        if let Some(index) = cookies.iter().position(|c| {
            c.name == cookie.name && c.domain == cookie.domain && c.path == cookie.path
        }) {
            let old = cookies.remove(index);
            if old.http_only && !options.include_httponly {
                cookies.insert(index, old);
                return false;
            }
            cookie.creation = old.creation;
        }
        if cookie.is_expired(now) {
            trace!("cookie {} expired on arrival", cookie.name);
            return true;
        }
        cookies.push(cookie);
        true
    }

    fn get(&self, url: &Url, options: &CookieOptions) -> String {
        let Some(host) = url.host_str().map(str::to_ascii_lowercase) else {
            return String::new();
        };
        let now = SystemTime::now();
        let secure = url.scheme() == "https" || url.scheme() == "wss";

        let cookies = lock(&self.cookies);
        let mut matching: Vec<&StoredCookie> = cookies
            .iter()
            .filter(|c| !c.is_expired(now))
            .filter(|c| c.matches_host(&host) && c.matches_path(url.path()))
            .filter(|c| secure || !c.secure)
            .filter(|c| options.include_httponly || !c.http_only)
            .collect();
        // Longer paths first, then older cookies first.
        matching.sort_by(|a, b| {
            b.path
                .len()
                .cmp(&a.path.len())
                .then(a.creation.cmp(&b.creation))
        });
        matching
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn remove_where(&self, predicate: impl Fn(&StoredCookie) -> bool) -> usize {
        let mut cookies = lock(&self.cookies);
        let before = cookies.len();
        cookies.retain(|c| !predicate(c));
        before - cookies.len()
    }
}

impl CookieStore for MemoryCookieStore {
    fn set_cookie_with_options(
        &self,
        url: &Url,
        cookie_line: &str,
        options: &CookieOptions,
        callback: Option<SetCookieCallback>,
    ) {
        let success = self.set(url, cookie_line, options);
        if let Some(callback) = callback {
            callback(success);
        }
    }

    fn get_cookies_with_options(
        &self,
        url: &Url,
        options: &CookieOptions,
        callback: GetCookiesCallback,
    ) {
        callback(self.get(url, options));
    }

    fn delete_cookie(&self, url: &Url, cookie_name: &str, callback: Option<DoneCallback>) {
        if let Some(host) = url.host_str().map(str::to_ascii_lowercase) {
            self.remove_where(|c| {
                c.name == cookie_name && c.matches_host(&host) && c.matches_path(url.path())
            });
        }
        if let Some(callback) = callback {
            callback();
        }
    }

    fn delete_all_created_between(
        &self,
        begin: SystemTime,
        end: Option<SystemTime>,
        callback: Option<DeleteCallback>,
    ) {
        let deleted = self.remove_where(|c| c.created_between(begin, end));
        if let Some(callback) = callback {
            callback(deleted);
        }
    }

    fn delete_all_created_between_for_host(
        &self,
        begin: SystemTime,
        end: Option<SystemTime>,
        url: &Url,
        callback: Option<DeleteCallback>,
    ) {
        let deleted = match url.host_str().map(str::to_ascii_lowercase) {
            Some(host) => {
                self.remove_where(|c| c.created_between(begin, end) && c.matches_host(&host))
            }
            None => 0,
        };
        if let Some(callback) = callback {
            callback(deleted);
        }
    }

    fn delete_session_cookies(&self, callback: Option<DeleteCallback>) {
        let deleted = self.remove_where(|c| !c.persistent);
        if let Some(callback) = callback {
            callback(deleted);
        }
    }
}
