// packages/httptap/src/interception/transport.rs
//! Transport plug-in point
//!
//! A [`Transport`] turns one request into one response. Clients hold an
//! `Arc<dyn Transport>`; the real network implementation is
//! [`HyperTransport`], and the [`Interceptor`](crate::Interceptor) is a
//! drop-in replacement for it.

use crate::body::TransportBody;
use crate::utils::errors::{BoxError, Result, TapError};
use futures::future::BoxFuture;
use http_body_util::BodyExt;
use hyper::{Request, Response};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::fmt;
use tracing::debug;

/// Something that can carry a request to a server and bring back its response
pub trait Transport: Send + Sync + 'static {
    /// Execute a single request. Errors are returned, never retried.
    fn round_trip(
        &self,
        request: Request<TransportBody>,
    ) -> BoxFuture<'static, Result<Response<TransportBody>>>;
}

/// Real network transport over plain HTTP/1.1
///
/// Idle connections are not kept: a process-wide transport may be driven
/// from many short-lived runtimes (one per test), and a pooled connection
/// would outlive the runtime that spawned it.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, TransportBody>,
}

impl HyperTransport {
    /// Create a new real transport
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build_http();

        Self { client }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperTransport").finish_non_exhaustive()
    }
}

impl Transport for HyperTransport {
    fn round_trip(
        &self,
        request: Request<TransportBody>,
    ) -> BoxFuture<'static, Result<Response<TransportBody>>> {
        let client = self.client.clone();

        Box::pin(async move {
            debug!("Sending {} {} over the network", request.method(), request.uri());

            let response = client.request(request).await.map_err(TapError::transport)?;

            Ok(response.map(|body| body.map_err(BoxError::from).boxed()))
        })
    }
}
