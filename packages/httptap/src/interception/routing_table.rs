// packages/httptap/src/interception/routing_table.rs
//! Registration table mapping (method, URL) pairs to response strategies
//!
//! Keys match exactly: no patterns, no query normalization, no case folding.
//! The one rewrite is the one the client applies too: a URL with an empty
//! path gets `/` (`http://example.com` is sent as `http://example.com/`).
//! Registering the same key twice replaces the earlier strategy.

use crate::interception::response::{CannedResponse, ResponseStrategy};
use crate::observability::REGISTRATIONS_TOTAL;
use crate::recording::request_log::LoggedRequest;
use hyper::{Request, StatusCode, Uri};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Expectation key: method and absolute URL in the form the client sends
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpectationKey {
    pub method: String,
    pub url: String,
}

impl ExpectationKey {
    /// Key for a registered URL; unparseable URLs are kept as written
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: canonical_url(url.into()),
        }
    }

    /// Key of an outgoing request, using the URL as the client serialized it
    pub fn for_request<B>(request: &Request<B>) -> Self {
        Self {
            method: request.method().as_str().to_string(),
            url: request.uri().to_string(),
        }
    }
}

/// Serialize `url` the way a request built from it would carry it
fn canonical_url(url: String) -> String {
    match url.parse::<Uri>() {
        Ok(uri) => uri.to_string(),
        Err(_) => url,
    }
}

impl fmt::Display for ExpectationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Registration table
#[derive(Default)]
pub struct RegistrationTable {
    /// Key to strategy mapping
    strategies: RwLock<HashMap<ExpectationKey, ResponseStrategy>>,
}

impl RegistrationTable {
    /// Create an empty registration table
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an expectation for `method` and `url`; never fails
    pub fn register(&self, method: impl Into<String>, url: impl Into<String>) -> Binder<'_> {
        Binder {
            table: self,
            key: ExpectationKey::new(method, url),
        }
    }

    /// Bind a strategy to a key, replacing whatever was there
    pub fn bind(&self, key: ExpectationKey, strategy: ResponseStrategy) {
        let kind = strategy.kind();
        let previous = self.strategies.write().insert(key.clone(), strategy);

        match previous {
            Some(old) => info!("Replaced expectation {} ({} -> {})", key, old.kind(), kind),
            None => info!("Registered expectation {} ({})", key, kind),
        }

        metrics::counter!(REGISTRATIONS_TOTAL, "strategy" => kind).increment(1);
    }

    /// Strategy bound to a key
    pub fn lookup(&self, key: &ExpectationKey) -> Option<ResponseStrategy> {
        let strategy = self.strategies.read().get(key).cloned();

        if strategy.is_none() {
            debug!("No expectation for {}", key);
        }

        strategy
    }

    pub fn contains(&self, method: &str, url: &str) -> bool {
        self.strategies
            .read()
            .contains_key(&ExpectationKey::new(method, url))
    }

    /// Remove an expectation; returns whether one was registered
    pub fn remove(&self, method: &str, url: &str) -> bool {
        let removed = self
            .strategies
            .write()
            .remove(&ExpectationKey::new(method, url))
            .is_some();

        if removed {
            info!("Removed expectation {} {}", method, url);
        }

        removed
    }

    /// Get all registered keys
    pub fn keys(&self) -> Vec<ExpectationKey> {
        self.strategies.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.read().is_empty()
    }

    /// Clear all expectations
    pub fn clear(&self) {
        self.strategies.write().clear();
        info!("Cleared all expectations");
    }

    /// Human-readable listing, sorted by key
    pub fn describe(&self) -> String {
        let strategies = self.strategies.read();
        let mut lines: Vec<String> = strategies
            .iter()
            .map(|(key, strategy)| format!("{} -> {}", key, strategy.kind()))
            .collect();
        lines.sort();

        let mut output = String::from("# httptap expectations\n");
        for line in lines {
            output.push_str(&line);
            output.push('\n');
        }

        output
    }
}

/// Binds one (method, URL) pair to a strategy
///
/// ```no_run
/// # use hyper::StatusCode;
/// # let interceptor = httptap::start();
/// interceptor
///     .when("GET", "http://example.com/")
///     .respond(StatusCode::OK, "body", "text/plain");
/// ```
#[must_use = "an expectation is only registered by a terminal call such as `respond`"]
pub struct Binder<'a> {
    table: &'a RegistrationTable,
    key: ExpectationKey,
}

impl<'a> Binder<'a> {
    pub fn key(&self) -> &ExpectationKey {
        &self.key
    }

    /// Answer with a fixed response carrying a single `Content-Type` header
    ///
    /// An invalid `content_type` is dropped with a warning and the response
    /// goes out without one; see [`CannedResponse::new`].
    pub fn respond(self, status: StatusCode, body: impl Into<bytes::Bytes>, content_type: &str) {
        self.respond_canned(CannedResponse::new(status, body, content_type));
    }

    /// Answer with a fixed, fully specified response
    pub fn respond_canned(self, response: CannedResponse) {
        self.table.bind(self.key, ResponseStrategy::Fixed(response));
    }

    /// Answer by calling `handler` once per matching request
    pub fn respond_with<F>(self, handler: F)
    where
        F: Fn(&LoggedRequest) -> CannedResponse + Send + Sync + 'static,
    {
        self.table
            .bind(self.key, ResponseStrategy::Handler(Arc::new(handler)));
    }

    /// Forward matching requests to the real transport without logging them
    pub fn pass_through(self) {
        self.table.bind(self.key, ResponseStrategy::PassThrough);
    }
}
