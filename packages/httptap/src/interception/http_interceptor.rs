// packages/httptap/src/interception/http_interceptor.rs
//! Recording HTTP interceptor
//!
//! Sits where the real transport would. Every request is resolved against
//! the registration table:
//!
//! - fixed response or handler: answered in memory and logged
//! - pass-through: forwarded to the real transport, not logged
//! - no expectation: `404 Not Found` or `UnregisteredRoute`, per
//!   [`UnmatchedPolicy`], and logged either way

use crate::body::TransportBody;
use crate::interception::response::{CannedResponse, OriginRequest, ResponseStrategy};
use crate::interception::routing_table::{Binder, ExpectationKey, RegistrationTable};
use crate::interception::transport::Transport;
use crate::observability::REQUESTS_TOTAL;
use crate::recording::exporter::{ExportFormat, Exporter};
use crate::recording::request_log::{LoggedRequest, RequestLog};
use crate::utils::config::{InterceptorConfig, UnmatchedPolicy};
use crate::utils::errors::{Result, TapError};
use futures::future::BoxFuture;
use hyper::{Request, Response};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::task::{Context, Poll};
use tracing::{debug, warn};

/// Recording transport that answers from registered expectations
///
/// Cloning is cheap; clones share the same table and log.
#[derive(Clone)]
pub struct Interceptor {
    inner: Arc<InterceptorInner>,
}

struct InterceptorInner {
    config: InterceptorConfig,
    table: RegistrationTable,
    log: RequestLog,
    /// Target of pass-through expectations
    real: Arc<dyn Transport>,
    /// Serializes handler invocation and log appends
    dispatch: Mutex<()>,
}

impl Interceptor {
    /// Create an interceptor with default configuration
    pub fn new(real: Arc<dyn Transport>) -> Self {
        Self::with_config(InterceptorConfig::default(), real)
    }

    /// Create an interceptor with custom config
    pub fn with_config(config: InterceptorConfig, real: Arc<dyn Transport>) -> Self {
        debug!("Creating interceptor ({:?} for unmatched routes)", config.unmatched_policy);

        Self {
            inner: Arc::new(InterceptorInner {
                config,
                table: RegistrationTable::new(),
                log: RequestLog::new(),
                real,
                dispatch: Mutex::new(()),
            }),
        }
    }

    pub fn config(&self) -> &InterceptorConfig {
        &self.inner.config
    }

    /// Start an expectation for `method` and `url`
    pub fn when(&self, method: impl Into<String>, url: impl Into<String>) -> Binder<'_> {
        self.inner.table.register(method, url)
    }

    /// The registration table behind [`when`](Self::when)
    pub fn expectations(&self) -> &RegistrationTable {
        &self.inner.table
    }

    pub fn is_registered(&self, method: &str, url: &str) -> bool {
        self.inner.table.contains(method, url)
    }

    /// Remove every expectation
    pub fn clear_expectations(&self) {
        self.inner.table.clear();
    }

    /// Intercepted requests, in interception order
    pub fn requests(&self) -> Vec<Arc<LoggedRequest>> {
        self.inner.log.snapshot()
    }

    /// The `index`th intercepted request
    pub fn request(&self, index: usize) -> Result<Arc<LoggedRequest>> {
        self.inner.log.get(index)
    }

    /// Body of the `index`th intercepted request as text; repeatable
    pub async fn request_body(&self, index: usize) -> Result<String> {
        self.inner.log.get(index)?.body_text().await
    }

    /// Number of intercepted requests
    pub fn len(&self) -> usize {
        self.inner.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.log.is_empty()
    }

    /// Forget all intercepted requests; expectations are kept
    pub fn reset(&self) {
        self.inner.log.clear();
        debug!("Request log cleared");
    }

    /// Render the request log for diagnostics
    pub async fn export(&self, format: ExportFormat) -> Result<String> {
        Exporter::new(format, self.inner.config.max_export_body_size)
            .export(&self.requests())
            .await
    }

    /// Resolve one outgoing request
    pub async fn intercept(&self, request: Request<TransportBody>) -> Result<Response<TransportBody>> {
        let key = ExpectationKey::for_request(&request);
        debug!("Intercepted request: {}", key);

        let strategy = self.inner.table.lookup(&key);
        if let Some(ResponseStrategy::PassThrough) = strategy {
            debug!("Passing {} through to the real transport", key);
            metrics::counter!(REQUESTS_TOTAL, "outcome" => "pass_through").increment(1);
            return self.inner.real.round_trip(request).await;
        }

        let (parts, body) = request.into_parts();
        let logged = Arc::new(LoggedRequest::new(parts, body));

        if self.inner.config.log_requests {
            log_request(&logged);
        }

        match strategy {
            Some(ResponseStrategy::Fixed(canned)) => self.respond(logged, "fixed", |_| Ok(canned)),
            Some(ResponseStrategy::Handler(handler)) => {
                // Handlers read the body synchronously through `captured_body`
                let captured = logged.body_bytes().await;
                self.respond(logged, "handler", |logged| {
                    captured?;
                    Ok(handler(logged))
                })
            }
            Some(ResponseStrategy::PassThrough) | None => match self.inner.config.unmatched_policy {
                UnmatchedPolicy::NotFound => self.respond(logged, "unmatched", |_| {
                    warn!("No expectation for {}, answering 404", key);
                    Ok(CannedResponse::not_found(&key.method, &key.url))
                }),
                UnmatchedPolicy::Reject => self.respond(logged, "rejected", |_| {
                    warn!("No expectation for {}, rejecting", key);
                    debug!("{}", self.inner.table.describe());
                    Err(TapError::UnregisteredRoute {
                        method: key.method.clone(),
                        url: key.url.clone(),
                    })
                }),
            },
        }
    }

    /// Log the request, resolve it, and synthesize the response
    fn respond<F>(
        &self,
        logged: Arc<LoggedRequest>,
        outcome: &'static str,
        resolve: F,
    ) -> Result<Response<TransportBody>>
    where
        F: FnOnce(&LoggedRequest) -> Result<CannedResponse>,
    {
        let (resolved, index) = {
            let _dispatch = self.inner.dispatch.lock();
            let resolved = resolve(&logged);
            let index = self.inner.log.append(Arc::clone(&logged));
            (resolved, index)
        };

        metrics::counter!(REQUESTS_TOTAL, "outcome" => outcome).increment(1);

        let canned = resolved?;
        debug!(
            "Answered request #{} {} {} with {} ({})",
            index,
            logged.method(),
            logged.uri(),
            canned.status,
            outcome
        );

        let mut response = canned.synthesize();
        response.extensions_mut().insert(OriginRequest(logged));
        Ok(response)
    }
}

/// Log HTTP request headers
fn log_request(request: &LoggedRequest) {
    debug!("Request {}: {} {}", request.id, request.method(), request.uri());
    for (name, value) in request.headers() {
        if let Ok(val_str) = value.to_str() {
            debug!("  {}: {}", name, val_str);
        }
    }
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor")
            .field("config", &self.inner.config)
            .field("expectations", &self.inner.table.len())
            .field("requests", &self.inner.log.len())
            .finish()
    }
}

impl Transport for Interceptor {
    fn round_trip(
        &self,
        request: Request<TransportBody>,
    ) -> BoxFuture<'static, Result<Response<TransportBody>>> {
        let interceptor = self.clone();
        Box::pin(async move { interceptor.intercept(request).await })
    }
}

impl tower::Service<Request<TransportBody>> for Interceptor {
    type Response = Response<TransportBody>;
    type Error = TapError;
    type Future = BoxFuture<'static, Result<Response<TransportBody>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<TransportBody>) -> Self::Future {
        self.round_trip(request)
    }
}
