// packages/httptap/src/interception/response.rs
//! Canned responses and the strategies that produce them

use crate::body::{self, TransportBody};
use crate::recording::request_log::LoggedRequest;
use bytes::Bytes;
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::{HeaderMap, Response, StatusCode, Version};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Content type of synthesized `404 Not Found` responses
pub const NOT_FOUND_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// A complete response held in memory: status, headers and body text
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl CannedResponse {
    /// Response with a single `Content-Type` header
    ///
    /// A `content_type` that is not a valid header value (control characters,
    /// for instance) is logged and left out, so the response carries no
    /// `Content-Type` at all. Use [`header`](Self::header) with a checked
    /// [`HeaderValue`] to rule that out at compile time.
    pub fn new(status: StatusCode, body: impl Into<Bytes>, content_type: &str) -> Self {
        let mut headers = HeaderMap::new();

        match HeaderValue::from_str(content_type) {
            Ok(value) => {
                headers.insert(CONTENT_TYPE, value);
            }
            Err(_) => {
                warn!("Ignoring invalid content type {:?}", content_type);
            }
        }

        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Response with a caller-supplied header set
    pub fn with_headers(status: StatusCode, body: impl Into<Bytes>, headers: HeaderMap) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Add or replace a header
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Default answer for a route nobody registered
    pub fn not_found(method: &str, url: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("no expectation registered for {} {}", method, url),
            NOT_FOUND_CONTENT_TYPE,
        )
    }

    /// Body as text (lossy UTF-8)
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Build a fresh HTTP/1.1 response; the body is a new stream on every call
    pub(crate) fn synthesize(&self) -> Response<TransportBody> {
        let mut response = Response::new(body::full(self.body.clone()));
        *response.status_mut() = self.status;
        *response.version_mut() = Version::HTTP_11;
        *response.headers_mut() = self.headers.clone();
        response
    }
}

/// Function evaluated on every matching request
pub type ResponseHandler = Arc<dyn Fn(&LoggedRequest) -> CannedResponse + Send + Sync>;

/// How a registered expectation is answered
#[derive(Clone)]
pub enum ResponseStrategy {
    /// Same response every time
    Fixed(CannedResponse),

    /// Response computed per call
    Handler(ResponseHandler),

    /// Forward to the real transport and leave no trace in the log
    PassThrough,
}

impl ResponseStrategy {
    /// Short label used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ResponseStrategy::Fixed(_) => "fixed",
            ResponseStrategy::Handler(_) => "handler",
            ResponseStrategy::PassThrough => "pass_through",
        }
    }
}

impl fmt::Debug for ResponseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseStrategy::Fixed(canned) => f.debug_tuple("Fixed").field(canned).finish(),
            ResponseStrategy::Handler(_) => f.write_str("Handler(..)"),
            ResponseStrategy::PassThrough => f.write_str("PassThrough"),
        }
    }
}

/// Back-reference from a synthesized response to the request that produced it
#[derive(Debug, Clone)]
pub struct OriginRequest(pub Arc<LoggedRequest>);
