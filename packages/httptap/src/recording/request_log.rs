// packages/httptap/src/recording/request_log.rs
//! Ordered log of intercepted requests
//!
//! A logged request keeps its body stream untouched until someone asks for
//! it. The first read drains the stream into an owned buffer; every read
//! after that (including the first) hands out the same bytes, and
//! [`LoggedRequest::body_stream`] gives a fresh stream over them. A stream
//! that fails while draining stays failed: later reads report the same error.

use crate::body::{self, TransportBody};
use crate::utils::errors::{Result, TapError};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use hyper::body::Body;
use hyper::http::request::Parts;
use hyper::{HeaderMap, Method, Uri, Version};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use ulid::Ulid;

/// Request body as stored in the log
enum CapturedBody {
    /// Not read yet
    Pending(TransportBody),

    /// Drained into memory
    Captured(Bytes),

    /// Draining failed with this message
    Failed(String),
}

/// A request resolved by the interceptor
pub struct LoggedRequest {
    /// Unique request ID
    pub id: Ulid,

    /// When the interceptor received the request
    pub received_at: DateTime<Utc>,

    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    body: Mutex<CapturedBody>,
}

impl LoggedRequest {
    pub(crate) fn new(parts: Parts, body: TransportBody) -> Self {
        let body = if body.is_end_stream() {
            CapturedBody::Captured(Bytes::new())
        } else {
            CapturedBody::Pending(body)
        };

        Self {
            id: Ulid::new(),
            received_at: Utc::now(),
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            body: Mutex::new(body),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// URL exactly as the client serialized it
    pub fn url(&self) -> String {
        self.uri.to_string()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Request body, draining the original stream on first access
    pub async fn body_bytes(&self) -> Result<Bytes> {
        let mut slot = self.body.lock().await;

        let drained = match &mut *slot {
            CapturedBody::Captured(bytes) => return Ok(bytes.clone()),
            CapturedBody::Failed(message) => return Err(TapError::Body(message.clone().into())),
            CapturedBody::Pending(stream) => {
                let stream = std::mem::replace(stream, body::empty());
                body::collect_bytes(stream).await
            }
        };

        match drained {
            Ok(bytes) => {
                debug!("Captured {} byte body of request {}", bytes.len(), self.id);
                *slot = CapturedBody::Captured(bytes.clone());
                Ok(bytes)
            }
            Err(err) => {
                let message = match &err {
                    TapError::Body(source) => source.to_string(),
                    other => other.to_string(),
                };
                warn!("Failed to capture body of request {}: {}", self.id, message);
                *slot = CapturedBody::Failed(message);
                Err(err)
            }
        }
    }

    /// Body bytes if they are already captured, without waiting
    ///
    /// Always `Some` inside a response handler: the interceptor drains the
    /// body before calling it.
    pub fn captured_body(&self) -> Option<Bytes> {
        let slot = self.body.try_lock().ok()?;
        match &*slot {
            CapturedBody::Captured(bytes) => Some(bytes.clone()),
            _ => None,
        }
    }

    /// [`captured_body`](Self::captured_body) as text (lossy UTF-8)
    pub fn captured_text(&self) -> Option<String> {
        self.captured_body()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Request body as text (lossy UTF-8); empty when the request had no body
    pub async fn body_text(&self) -> Result<String> {
        let bytes = self.body_bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Fresh stream over the captured body, positioned at the start
    pub async fn body_stream(&self) -> Result<TransportBody> {
        Ok(body::full(self.body_bytes().await?))
    }
}

impl fmt::Debug for LoggedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggedRequest")
            .field("id", &self.id)
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("received_at", &self.received_at)
            .finish_non_exhaustive()
    }
}

/// Append-only, index-addressable request log
#[derive(Default)]
pub struct RequestLog {
    entries: RwLock<Vec<Arc<LoggedRequest>>>,
}

impl RequestLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request and return its index
    pub fn append(&self, request: Arc<LoggedRequest>) -> usize {
        let mut entries = self.entries.write();
        entries.push(request);
        entries.len() - 1
    }

    /// Request at `index`
    pub fn get(&self, index: usize) -> Result<Arc<LoggedRequest>> {
        let entries = self.entries.read();
        entries
            .get(index)
            .cloned()
            .ok_or(TapError::RequestOutOfRange {
                index,
                len: entries.len(),
            })
    }

    /// All requests, in interception order
    pub fn snapshot(&self) -> Vec<Arc<LoggedRequest>> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::BoxError;
    use http_body_util::{BodyExt, StreamBody};
    use hyper::body::Frame;
    use hyper::Request;

    fn logged(method: &str, url: &str, body: TransportBody) -> Arc<LoggedRequest> {
        let (parts, body) = Request::builder()
            .method(method)
            .uri(url)
            .body(body)
            .unwrap()
            .into_parts();
        Arc::new(LoggedRequest::new(parts, body))
    }

    #[tokio::test]
    async fn test_body_text_is_repeatable() {
        let request = logged("POST", "http://example.com/", body::full("reqbody"));

        assert_eq!(request.body_text().await.unwrap(), "reqbody");
        assert_eq!(request.body_text().await.unwrap(), "reqbody");
    }

    #[tokio::test]
    async fn test_failed_body_read_keeps_failing() {
        let frames: Vec<std::result::Result<Frame<Bytes>, BoxError>> = vec![
            Ok(Frame::data(Bytes::from("partial"))),
            Err("connection reset".into()),
        ];
        let failing = StreamBody::new(futures::stream::iter(frames)).boxed();
        let request = logged("POST", "http://example.com/", failing);

        let first = request.body_text().await.unwrap_err();
        let second = request.body_text().await.unwrap_err();

        assert!(matches!(first, TapError::Body(_)));
        assert!(matches!(second, TapError::Body(_)));
        assert_eq!(first.to_string(), second.to_string());
        assert!(second.to_string().contains("connection reset"));
        assert!(request.captured_body().is_none());
    }

    #[tokio::test]
    async fn test_captured_body_after_first_read() {
        let request = logged("POST", "http://example.com/", body::full("reqbody"));
        assert!(request.captured_body().is_none());

        request.body_bytes().await.unwrap();

        assert_eq!(request.captured_body(), Some(Bytes::from("reqbody")));
        assert_eq!(request.captured_text().as_deref(), Some("reqbody"));
    }

    #[tokio::test]
    async fn test_body_stream_is_rewound() {
        let request = logged("PUT", "http://example.com/item", body::full("payload"));

        let first = body::read_to_string(request.body_stream().await.unwrap())
            .await
            .unwrap();
        let second = body::read_to_string(request.body_stream().await.unwrap())
            .await
            .unwrap();

        assert_eq!(first, "payload");
        assert_eq!(second, "payload");
        assert_eq!(request.body_text().await.unwrap(), "payload");
    }

    #[tokio::test]
    async fn test_missing_body_reads_empty() {
        let request = logged("GET", "http://example.com/", body::empty());

        assert_eq!(request.body_text().await.unwrap(), "");
        assert_eq!(request.body_text().await.unwrap(), "");
    }

    #[test]
    fn test_accessors() {
        let request = logged("DELETE", "http://example.com/a?b=c", body::empty());

        assert_eq!(*request.method(), Method::DELETE);
        assert_eq!(request.url(), "http://example.com/a?b=c");
        assert_eq!(request.uri().query(), Some("b=c"));
        assert_eq!(request.version(), Version::HTTP_11);
        assert!(request.headers().is_empty());
    }

    #[test]
    fn test_log_preserves_order() {
        let log = RequestLog::new();
        assert!(log.is_empty());

        let first = log.append(logged("GET", "http://example.com/1", body::empty()));
        let second = log.append(logged("GET", "http://example.com/2", body::empty()));

        assert_eq!((first, second), (0, 1));
        assert_eq!(log.len(), 2);
        assert_eq!(log.get(1).unwrap().url(), "http://example.com/2");

        let urls: Vec<String> = log.snapshot().iter().map(|r| r.url()).collect();
        assert_eq!(urls, vec!["http://example.com/1", "http://example.com/2"]);
    }

    #[test]
    fn test_get_out_of_range() {
        let log = RequestLog::new();
        log.append(logged("GET", "http://example.com/", body::empty()));

        match log.get(3) {
            Err(TapError::RequestOutOfRange { index, len }) => {
                assert_eq!(index, 3);
                assert_eq!(len, 1);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_clear() {
        let log = RequestLog::new();
        log.append(logged("GET", "http://example.com/", body::empty()));
        log.clear();
        assert!(log.is_empty());
    }
}
