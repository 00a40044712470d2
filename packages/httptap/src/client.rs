// packages/httptap/src/client.rs
//! Minimal HTTP client over a [`Transport`]
//!
//! Builds requests and hands them to a transport; nothing more. No
//! redirects, cookies or TLS. Code under test that takes an
//! `Arc<dyn Transport>` can be given an [`Interceptor`](crate::Interceptor)
//! directly; code that uses [`HttpClient::new`] goes through the
//! process-wide default installed by [`start`](crate::start).

use crate::activation;
use crate::body::{self, TransportBody};
use crate::interception::transport::Transport;
use crate::utils::errors::Result;
use bytes::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::{Request, Response};
use std::sync::Arc;
use tracing::debug;

/// HTTP client sending through an explicit or the default transport
#[derive(Clone, Default)]
pub struct HttpClient {
    transport: Option<Arc<dyn Transport>>,
}

impl HttpClient {
    /// Client that resolves the process-wide default transport per request
    pub fn new() -> Self {
        Self { transport: None }
    }

    /// Client bound to one transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport: Some(transport),
        }
    }

    fn transport(&self) -> Arc<dyn Transport> {
        match &self.transport {
            Some(transport) => Arc::clone(transport),
            None => activation::default_transport(),
        }
    }

    /// Send a prepared request
    pub async fn send(&self, request: Request<TransportBody>) -> Result<Response<TransportBody>> {
        debug!("Sending {} {}", request.method(), request.uri());
        self.transport().round_trip(request).await
    }

    /// `GET url` without a body
    pub async fn get(&self, url: &str) -> Result<Response<TransportBody>> {
        let request = Request::get(url).body(body::empty())?;
        self.send(request).await
    }

    /// `POST url` with a body of the given content type
    pub async fn post(
        &self,
        url: &str,
        content_type: &str,
        data: impl Into<Bytes>,
    ) -> Result<Response<TransportBody>> {
        let request = Request::post(url)
            .header(CONTENT_TYPE, content_type)
            .body(body::full(data))?;
        self.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interception::http_interceptor::Interceptor;
    use crate::interception::transport::HyperTransport;
    use crate::utils::errors::TapError;
    use hyper::StatusCode;

    #[tokio::test]
    async fn test_client_with_explicit_interceptor() {
        let interceptor = Interceptor::new(Arc::new(HyperTransport::new()));
        interceptor
            .when("POST", "http://api.test/items")
            .respond(StatusCode::CREATED, "{\"id\":1}", "application/json");

        let client = HttpClient::with_transport(Arc::new(interceptor.clone()));
        let response = client
            .post("http://api.test/items", "application/json", "{\"name\":\"x\"}")
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body::read_to_string(response.into_body()).await.unwrap(),
            "{\"id\":1}"
        );

        let request = interceptor.request(0).unwrap();
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(request.body_text().await.unwrap(), "{\"name\":\"x\"}");
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected_before_sending() {
        let interceptor = Interceptor::new(Arc::new(HyperTransport::new()));
        let client = HttpClient::with_transport(Arc::new(interceptor.clone()));

        let err = client.get("not a url").await.unwrap_err();

        assert!(matches!(err, TapError::InvalidRequest(_)));
        assert!(interceptor.is_empty());
    }
}
